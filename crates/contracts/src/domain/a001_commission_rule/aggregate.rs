use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::enums::rule_status::RuleStatus;
use crate::enums::rule_type::RuleType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор правила комиссии
    CommissionRuleId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Правило комиссии: процент по типу товара, тегу товара или по умолчанию
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRule {
    #[serde(flatten)]
    pub base: BaseAggregate<CommissionRuleId>,

    #[serde(rename = "ruleType")]
    pub rule_type: RuleType,

    /// Значение для сопоставления (тип или тег товара); для default пустое
    #[serde(rename = "ruleValue")]
    pub rule_value: String,

    /// Процент комиссии, 0..=100
    #[serde(rename = "commissionPercentage")]
    pub commission_percentage: Decimal,

    pub status: RuleStatus,
}

impl CommissionRule {
    /// Создать новое правило для вставки в БД
    pub fn new_for_insert(
        description: String,
        rule_type: RuleType,
        rule_value: String,
        commission_percentage: Decimal,
        status: RuleStatus,
        comment: Option<String>,
    ) -> Self {
        let mut base =
            BaseAggregate::with_generated_code(CommissionRuleId::new_v4(), "RULE", description);
        base.comment = comment;
        let mut rule = Self {
            base,
            rule_type,
            rule_value,
            commission_percentage,
            status,
        };
        rule.normalize();
        rule
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active && !self.base.metadata.is_deleted
    }

    /// Значение для сравнения: без пробелов по краям, в нижнем регистре (Unicode)
    pub fn normalize_value(value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// Совпадает ли значение правила с переданным (без учёта регистра)
    pub fn matches_value(&self, value: &str) -> bool {
        Self::normalize_value(&self.rule_value) == Self::normalize_value(value)
    }

    /// Ключ уникальности: одно активное правило на (тип, значение)
    pub fn uniqueness_key(&self) -> (RuleType, String) {
        (self.rule_type, Self::normalize_value(&self.rule_value))
    }

    /// Обновить данные из DTO (тип правила уже разобран вызывающей стороной)
    pub fn update(&mut self, dto: &CommissionRuleDto, rule_type: RuleType) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.rule_type = rule_type;
        self.rule_value = dto.rule_value.clone();
        self.commission_percentage = dto.commission_percentage;
        self.status = dto.status.unwrap_or(self.status);
        self.normalize();
    }

    /// Для default значение игнорируется и хранится пустым
    fn normalize(&mut self) {
        if self.rule_type.requires_value() {
            self.rule_value = self.rule_value.trim().to_string();
        } else {
            self.rule_value.clear();
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if self.rule_type.requires_value() && self.rule_value.trim().is_empty() {
            return Err(format!(
                "Для правила типа {} требуется значение",
                self.rule_type.code()
            ));
        }
        if self.commission_percentage < Decimal::ZERO
            || self.commission_percentage > Decimal::ONE_HUNDRED
        {
            return Err("Процент комиссии должен быть в диапазоне 0..100".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for CommissionRule {
    type Id = CommissionRuleId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "commission_rule"
    }

    fn element_name() -> &'static str {
        "Правило комиссии"
    }

    fn list_name() -> &'static str {
        "Правила комиссий"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления правила комиссии
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommissionRuleDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    /// "product_type" | "product_tag" | "default" (или устаревшее "all")
    #[serde(rename = "ruleType")]
    pub rule_type: String,
    #[serde(rename = "ruleValue", default)]
    pub rule_value: String,
    #[serde(rename = "commissionPercentage")]
    pub commission_percentage: Decimal,
    #[serde(default)]
    pub status: Option<RuleStatus>,
    pub comment: Option<String>,
}

/// Запрос на смену статуса правила
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleStatusRequest {
    pub status: RuleStatus,
}

/// Проверка подбора ставки без заказа
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolveRateRequest {
    #[serde(rename = "productType", default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(rule_type: RuleType, value: &str, pct: i64) -> CommissionRule {
        CommissionRule::new_for_insert(
            "Тестовое правило".into(),
            rule_type,
            value.into(),
            Decimal::from(pct),
            RuleStatus::Active,
            None,
        )
    }

    #[test]
    fn test_default_rule_value_is_cleared() {
        let r = rule(RuleType::Default, "anything", 5);
        assert_eq!(r.rule_value, "");
        assert!(r.validate().is_ok());
        assert!(r.base.code.starts_with("RULE-"));
    }

    #[test]
    fn test_validation() {
        assert!(rule(RuleType::ProductType, "  ", 10).validate().is_err());
        assert!(rule(RuleType::ProductTag, "vip", 101).validate().is_err());
        assert!(rule(RuleType::ProductTag, "vip", -1).validate().is_err());
        assert!(rule(RuleType::ProductTag, "vip", 100).validate().is_ok());
    }

    #[test]
    fn test_matches_value_case_insensitive() {
        let r = rule(RuleType::ProductType, " Trapo Classic ", 10);
        assert!(r.matches_value("TRAPO CLASSIC"));
        assert!(!r.matches_value("TRAPO"));
        assert_eq!(
            r.uniqueness_key(),
            (RuleType::ProductType, "trapo classic".to_string())
        );
    }

    #[test]
    fn test_matches_value_non_ascii() {
        let r = rule(RuleType::ProductType, "Шины", 10);
        assert!(r.matches_value("ШИНЫ"));
        assert!(r.matches_value(" шины "));
        assert!(!r.matches_value("ШИНА"));
        assert_eq!(r.uniqueness_key().1, "шины");

        let tag = rule(RuleType::ProductTag, "Ёлка", 5);
        assert!(tag.matches_value("ЁЛКА"));
        assert!(!tag.matches_value("ЕЛКА"));
    }
}
