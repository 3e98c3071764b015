use super::repository;
use crate::shared::errors::{NotFound, ValidationError};
use crate::system::auth::Actor;
use contracts::domain::a002_agent::aggregate::{Agent, AgentDto};
use uuid::Uuid;

async fn ensure_customer_free(agent: &Agent) -> anyhow::Result<()> {
    if let Some(existing) = repository::get_by_customer_id(&agent.customer_id).await? {
        if existing.base.id.value() != agent.base.id.value() {
            return Err(ValidationError(format!(
                "Покупатель {} уже назначен агентом {}",
                agent.customer_id, existing.base.code
            ))
            .into());
        }
    }
    Ok(())
}

/// Создание нового агента
pub async fn create(actor: &Actor, dto: AgentDto) -> anyhow::Result<Uuid> {
    actor.require_admin()?;
    let mut aggregate = Agent::new_for_insert(
        dto.name,
        dto.customer_id.trim().to_string(),
        dto.email,
        dto.comment,
    );
    if let Some(code) = dto.code.filter(|c| !c.trim().is_empty()) {
        aggregate.base.code = code;
    }
    if let Some(is_active) = dto.is_active {
        aggregate.is_active = is_active;
    }

    // Валидация
    aggregate.validate().map_err(ValidationError)?;
    ensure_customer_free(&aggregate).await?;

    aggregate.before_write();
    let id = repository::insert(&aggregate).await?;
    tracing::info!("Agent {} created by {}", aggregate.base.code, actor.user_id);
    Ok(id)
}

/// Обновление существующего агента
pub async fn update(actor: &Actor, dto: AgentDto) -> anyhow::Result<()> {
    actor.require_admin()?;
    let raw_id = dto.id.clone().unwrap_or_default();
    let id = Uuid::parse_str(&raw_id)
        .map_err(|_| ValidationError(format!("Некорректный ID: '{}'", raw_id)))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| NotFound::new("agent", raw_id.clone()))?;

    aggregate.update(&dto);
    aggregate.customer_id = aggregate.customer_id.trim().to_string();

    aggregate.validate().map_err(ValidationError)?;
    ensure_customer_free(&aggregate).await?;

    aggregate.before_write();
    repository::update(&aggregate).await
}

/// Мягкое удаление агента
pub async fn delete(actor: &Actor, id: Uuid) -> anyhow::Result<bool> {
    actor.require_admin()?;
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Agent>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Agent>> {
    repository::list_all().await
}

/// Агент, которому можно назначать заказы
pub async fn get_active(id: Uuid) -> anyhow::Result<Agent> {
    let agent = repository::get_by_id(id)
        .await?
        .ok_or_else(|| NotFound::new("agent", id.to_string()))?;
    if !agent.is_active {
        return Err(ValidationError(format!("Агент {} не активен", agent.base.code)).into());
    }
    Ok(agent)
}
