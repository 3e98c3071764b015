use super::line_item::LineItem;
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::lenient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор снимка заказа
    ShopOrderId
);

/// Заголовок заказа Shopify
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopOrderHeader {
    /// ID заказа в Shopify (ключ идемпотентного импорта)
    pub shopify_order_id: String,
    /// Номер заказа ("#1001")
    pub order_name: String,
    pub currency: String,
    pub total_price: Decimal,
    pub subtotal_price: Decimal,
    pub customer_id: Option<String>,
    /// Ссылка на агента (a002_agent.id)
    pub agent_id: Option<String>,
    pub processed_at: Option<String>,
}

/// Снимок заказа Shopify со строками
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopOrder {
    #[serde(flatten)]
    pub base: BaseAggregate<ShopOrderId>,
    pub header: ShopOrderHeader,
    pub lines: Vec<LineItem>,
}

impl ShopOrder {
    /// Построить снимок из payload'а Shopify REST API
    pub fn from_shopify(payload: ShopifyOrderPayload) -> Result<Self, String> {
        if payload.id.trim().is_empty() {
            return Err("В заказе Shopify отсутствует id".into());
        }
        let order_name = if payload.name.trim().is_empty() {
            format!("#{}", payload.id)
        } else {
            payload.name.clone()
        };
        let base = BaseAggregate::new(
            ShopOrderId::new_v4(),
            order_name.clone(),
            format!("Заказ {}", order_name),
        );
        Ok(Self {
            base,
            header: ShopOrderHeader {
                shopify_order_id: payload.id,
                order_name,
                currency: payload.currency,
                total_price: payload.total_price,
                subtotal_price: payload.subtotal_price,
                customer_id: payload.customer.and_then(|c| c.id),
                agent_id: None,
                processed_at: payload.processed_at.or(payload.created_at),
            },
            lines: payload.line_items,
        })
    }

    /// Заменить данные снимка более свежими, сохранив id и назначенного агента
    pub fn refresh_from(&mut self, fresh: ShopOrder) {
        let agent_id = self.header.agent_id.take();
        self.base.code = fresh.base.code;
        self.base.description = fresh.base.description;
        self.header = fresh.header;
        self.header.agent_id = agent_id;
        self.lines = fresh.lines;
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Сумма net_total по строкам
    pub fn lines_net_total(&self) -> Decimal {
        self.lines.iter().map(LineItem::net_total).sum()
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for ShopOrder {
    type Id = ShopOrderId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "shop_order"
    }

    fn element_name() -> &'static str {
        "Заказ"
    }

    fn list_name() -> &'static str {
        "Заказы"
    }
}

// ============================================================================
// Shopify payload
// ============================================================================

/// Заказ в формате Shopify Admin REST API (только используемые поля)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ShopifyOrderPayload {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_price: Decimal,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub subtotal_price: Decimal,
    #[serde(default)]
    pub customer: Option<ShopifyCustomerRef>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub processed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ShopifyCustomerRef {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
}

/// Запрос на назначение агента заказу (None: снять назначение)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignAgentRequest {
    pub agent_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> ShopifyOrderPayload {
        serde_json::from_value(json!({
            "id": 450789469,
            "name": "#1001",
            "currency": "USD",
            "total_price": "409.94",
            "subtotal_price": "398.00",
            "customer": { "id": 207119551 },
            "created_at": "2024-03-13T16:09:54-04:00",
            "line_items": [
                { "title": "IPod Nano - 8gb", "price": "199.00", "quantity": 1, "product_id": 632910392 },
                { "title": "Window Tint", "price": "199.00", "quantity": 1, "total_discount": "0.00" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_from_shopify() {
        let order = ShopOrder::from_shopify(payload()).unwrap();
        assert_eq!(order.header.shopify_order_id, "450789469");
        assert_eq!(order.base.code, "#1001");
        assert_eq!(order.header.customer_id.as_deref(), Some("207119551"));
        assert_eq!(
            order.header.processed_at.as_deref(),
            Some("2024-03-13T16:09:54-04:00")
        );
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines_net_total(), Decimal::new(39800, 2));
    }

    #[test]
    fn test_from_shopify_requires_id() {
        let empty = ShopifyOrderPayload::default();
        assert!(ShopOrder::from_shopify(empty).is_err());
    }

    #[test]
    fn test_refresh_keeps_agent_and_id() {
        let mut order = ShopOrder::from_shopify(payload()).unwrap();
        order.header.agent_id = Some("agent-1".into());
        let id = order.base.id;

        let mut newer = payload();
        newer.line_items.pop();
        order.refresh_from(ShopOrder::from_shopify(newer).unwrap());

        assert_eq!(order.base.id, id);
        assert_eq!(order.header.agent_id.as_deref(), Some("agent-1"));
        assert_eq!(order.lines.len(), 1);
    }
}
