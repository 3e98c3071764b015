//! Движок расчёта комиссий агентов
//!
//! Ставка по строке заказа ищется по правилам в порядке:
//! тип товара → тег товара → правило по умолчанию → нулевая ставка.
//! Для начислений, скорректированных вручную, ставка выводится обратным
//! расчётом из сохранённой суммы. Движок не пишет в БД и не возвращает ошибок.

pub mod aggregator;
pub mod classifier;
pub mod resolver;

use async_trait::async_trait;
use contracts::domain::a003_shop_order::aggregate::ShopOrder;
use contracts::domain::a004_commission::aggregate::CommissionRecord;
use contracts::domain::a004_commission::breakdown::{AggregationResult, RuleMatch};

pub use resolver::RuleSet;

/// Тип и теги товара из внешнего источника
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductMetadata {
    pub product_type: Option<String>,
    pub tags: Vec<String>,
}

/// Внешний источник метаданных товара (по ID товара)
///
/// Реализация обязана сама ограничивать время ответа и при любой ошибке
/// возвращать `None`.
#[async_trait]
pub trait ProductMetadataSource: Send + Sync {
    async fn lookup(&self, product_id: &str) -> Option<ProductMetadata>;
}

/// Источник без внешних запросов
pub struct NoProductMetadata;

#[async_trait]
impl ProductMetadataSource for NoProductMetadata {
    async fn lookup(&self, _product_id: &str) -> Option<ProductMetadata> {
        None
    }
}

/// Снимок активных правил + источник метаданных
pub struct CommissionEngine<'a> {
    rules: &'a RuleSet,
    source: &'a dyn ProductMetadataSource,
}

impl<'a> CommissionEngine<'a> {
    pub fn new(rules: &'a RuleSet, source: &'a dyn ProductMetadataSource) -> Self {
        Self { rules, source }
    }

    pub fn resolve_rate(&self, product_type: Option<&str>, tags: &[String]) -> RuleMatch {
        self.rules.resolve_rate(product_type, tags)
    }

    /// Расчёт по заказу; `existing` со скорректированной суммой включает режим корректировки
    pub async fn aggregate(
        &self,
        order: &ShopOrder,
        existing: Option<&CommissionRecord>,
    ) -> AggregationResult {
        match existing.filter(|record| record.is_adjusted()) {
            Some(record) => aggregator::aggregate_adjusted(&order.lines, record.amount),
            None => aggregator::aggregate_standard(&order.lines, self.rules, self.source).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, Utc};
    use contracts::domain::a001_commission_rule::aggregate::CommissionRule;
    use contracts::enums::rule_status::RuleStatus;
    use contracts::enums::rule_type::RuleType;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Правило с заданным смещением времени создания (для порядка снимка)
    pub fn rule(rule_type: RuleType, value: &str, pct: i64, age_minutes: i64) -> CommissionRule {
        let mut rule = CommissionRule::new_for_insert(
            format!("{} {}", rule_type.code(), value),
            rule_type,
            value.to_string(),
            Decimal::from(pct),
            RuleStatus::Active,
            None,
        );
        rule.base.metadata.created_at = Utc::now() - Duration::minutes(age_minutes);
        rule
    }

    /// Источник из памяти; считает обращения
    #[derive(Default)]
    pub struct StubSource {
        pub products: HashMap<String, ProductMetadata>,
        pub calls: AtomicUsize,
    }

    impl StubSource {
        pub fn with(product_id: &str, product_type: Option<&str>, tags: &[&str]) -> Self {
            let mut products = HashMap::new();
            products.insert(
                product_id.to_string(),
                ProductMetadata {
                    product_type: product_type.map(str::to_string),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                },
            );
            Self {
                products,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProductMetadataSource for StubSource {
        async fn lookup(&self, product_id: &str) -> Option<ProductMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.products.get(product_id).cloned()
        }
    }
}
