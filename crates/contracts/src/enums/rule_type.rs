use serde::{Deserialize, Serialize};

/// Тип правила комиссии (уровень классификации товара)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    ProductType,
    ProductTag,
    /// Правило по умолчанию; "all": устаревший синоним
    #[serde(alias = "all")]
    Default,
}

impl RuleType {
    pub fn code(&self) -> &'static str {
        match self {
            RuleType::ProductType => "product_type",
            RuleType::ProductTag => "product_tag",
            RuleType::Default => "default",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RuleType::ProductType => "Product Type",
            RuleType::ProductTag => "Product Tag",
            RuleType::Default => "Default Rule",
        }
    }

    /// Требуется ли значение правила (для default значение игнорируется)
    pub fn requires_value(&self) -> bool {
        !matches!(self, RuleType::Default)
    }

    pub fn all() -> Vec<RuleType> {
        vec![RuleType::ProductType, RuleType::ProductTag, RuleType::Default]
    }

    /// Парсинг из строки без учёта регистра
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "product_type" => Some(RuleType::ProductType),
            "product_tag" => Some(RuleType::ProductTag),
            "default" | "all" => Some(RuleType::Default),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
