use serde::{Deserialize, Serialize};

/// Запрос на расчёт комиссий
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalculateRequest {
    /// ID заказов (a003_shop_order.id); пустой список: все заказы с агентом
    #[serde(default)]
    pub order_ids: Vec<String>,
}
