use super::repository;
use crate::domain::a002_agent;
use crate::shared::errors::{NotFound, ValidationError};
use crate::system::auth::Actor;
use contracts::domain::a003_shop_order::aggregate::{
    AssignAgentRequest, ShopOrder, ShopifyOrderPayload,
};
use uuid::Uuid;

/// Импорт заказа из payload'а Shopify.
///
/// Повторный импорт того же заказа обновляет снимок, сохраняя назначенного агента.
pub async fn import_from_shopify(actor: &Actor, payload: serde_json::Value) -> anyhow::Result<Uuid> {
    actor.require_admin()?;
    let payload: ShopifyOrderPayload = serde_json::from_value(payload)
        .map_err(|e| ValidationError(format!("Некорректный заказ Shopify: {}", e)))?;
    let fresh = ShopOrder::from_shopify(payload).map_err(ValidationError)?;

    match repository::get_by_shopify_id(&fresh.header.shopify_order_id).await? {
        Some(mut existing) => {
            existing.refresh_from(fresh);
            existing.before_write();
            repository::update(&existing).await?;
            tracing::info!(
                "Order {} refreshed from Shopify ({} lines)",
                existing.header.order_name,
                existing.lines.len()
            );
            Ok(existing.base.id.value())
        }
        None => {
            let mut order = fresh;
            order.before_write();
            let id = repository::insert(&order).await?;
            tracing::info!(
                "Order {} imported from Shopify ({} lines)",
                order.header.order_name,
                order.lines.len()
            );
            Ok(id)
        }
    }
}

/// Назначить заказу агента или снять назначение
pub async fn assign_agent(
    actor: &Actor,
    order_id: Uuid,
    request: AssignAgentRequest,
) -> anyhow::Result<()> {
    actor.require_admin()?;
    let mut order = repository::get_by_id(order_id)
        .await?
        .ok_or_else(|| NotFound::new("order", order_id.to_string()))?;

    let agent_id = match request.agent_id.filter(|id| !id.trim().is_empty()) {
        Some(raw) => {
            let id = Uuid::parse_str(raw.trim())
                .map_err(|_| ValidationError(format!("Некорректный ID агента: '{}'", raw)))?;
            let agent = a002_agent::service::get_active(id).await?;
            Some(agent.to_string_id())
        }
        None => None,
    };

    if order.header.agent_id == agent_id {
        return Ok(());
    }
    order.header.agent_id = agent_id;
    order.before_write();
    repository::update(&order).await?;
    tracing::info!(
        "Order {} agent set to {:?} by {}",
        order.header.order_name,
        order.header.agent_id,
        actor.user_id
    );
    Ok(())
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ShopOrder>> {
    repository::get_by_id(id).await
}

pub async fn list(agent_id: Option<&str>) -> anyhow::Result<Vec<ShopOrder>> {
    repository::list(agent_id).await
}

/// Заказы с назначенным агентом (кандидаты на расчёт комиссии)
pub async fn list_with_agent() -> anyhow::Result<Vec<ShopOrder>> {
    repository::list_with_agent().await
}
