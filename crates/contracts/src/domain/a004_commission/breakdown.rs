//! Результат расчёта комиссии по заказу (данные для счёта агенту)

use crate::domain::a003_shop_order::line_item::LineItem;
use crate::enums::rule_type::RuleType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Уровень, на котором найдено правило
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchTier {
    #[serde(rename = "Product Type")]
    ProductType,
    #[serde(rename = "Product Tag")]
    ProductTag,
    #[serde(rename = "Default Rule")]
    Default,
    #[serde(rename = "Manual Adjustment")]
    ManualAdjustment,
}

impl MatchTier {
    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::ProductType => "Product Type",
            MatchTier::ProductTag => "Product Tag",
            MatchTier::Default => "Default Rule",
            MatchTier::ManualAdjustment => "Manual Adjustment",
        }
    }
}

impl From<RuleType> for MatchTier {
    fn from(rule_type: RuleType) -> Self {
        match rule_type {
            RuleType::ProductType => MatchTier::ProductType,
            RuleType::ProductTag => MatchTier::ProductTag,
            RuleType::Default => MatchTier::Default,
        }
    }
}

/// Найденная ставка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub rate: Decimal,
    #[serde(rename = "ruleType")]
    pub tier: MatchTier,
    #[serde(rename = "ruleValue")]
    pub rule_value: String,
    #[serde(rename = "ruleId")]
    pub rule_id: Option<String>,
}

impl RuleMatch {
    /// Нулевая ставка, когда не настроено ни одного подходящего правила
    pub fn zero_fallback() -> Self {
        Self {
            rate: Decimal::ZERO,
            tier: MatchTier::Default,
            rule_value: "Default Rate".to_string(),
            rule_id: None,
        }
    }
}

/// Комиссия по одной строке заказа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCommission {
    pub item: LineItem,
    /// Классификация товара, по которой искалось правило (пусто в режиме корректировки)
    #[serde(rename = "productType")]
    pub product_type: String,
    pub rate: Decimal,
    #[serde(rename = "ruleInfo")]
    pub rule: RuleMatch,
    #[serde(rename = "netTotal")]
    pub net_total: Decimal,
    #[serde(rename = "commissionAmount")]
    pub commission_amount: Decimal,
}

/// Итог расчёта по заказу
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    #[serde(rename = "perItem")]
    pub per_item: Vec<LineCommission>,
    #[serde(rename = "totalCommission")]
    pub total_commission: Decimal,
    #[serde(rename = "totalOrderAmount")]
    pub total_order_amount: Decimal,
    /// Расчёт построен от суммы, скорректированной вручную
    pub adjusted: bool,
    /// Эффективная ставка (только в режиме корректировки)
    #[serde(rename = "effectiveRate")]
    pub effective_rate: Option<Decimal>,
}

/// Данные для счёта: начисление + расшифровка по строкам
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub commission_id: String,
    pub order_id: String,
    pub order_name: String,
    pub currency: String,
    pub agent_id: String,
    pub status: crate::enums::commission_status::CommissionStatus,
    pub result: AggregationResult,
}
