use super::classifier::Classifier;
use super::resolver::RuleSet;
use super::ProductMetadataSource;
use crate::shared::format::format_rate;
use contracts::domain::a003_shop_order::line_item::LineItem;
use contracts::domain::a004_commission::breakdown::{
    AggregationResult, LineCommission, MatchTier, RuleMatch,
};
use rust_decimal::Decimal;

/// amount × rate / 100; `None` при переполнении
pub fn percent_of(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|scaled| scaled / Decimal::ONE_HUNDRED)
}

/// Эффективная ставка, которая при равномерном применении даёт `amount`.
/// При нулевой сумме заказа ставка равна нулю.
pub fn effective_rate(amount: Decimal, total_order_amount: Decimal) -> Decimal {
    if total_order_amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    amount
        .checked_div(total_order_amount)
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// (netTotal, комиссия) строки; строка, на которой арифметика переполняется,
/// считается нулевой
fn line_amounts(item: &LineItem, rate: Decimal) -> (Decimal, Decimal) {
    let amounts = item
        .checked_net_total()
        .and_then(|net| percent_of(net, rate).map(|commission| (net, commission)));
    match amounts {
        Some(amounts) => amounts,
        None => {
            tracing::warn!(
                "Line '{}' overflows commission arithmetic (price {}, quantity {}), counted as 0",
                item.title,
                item.unit_price,
                item.quantity
            );
            (Decimal::ZERO, Decimal::ZERO)
        }
    }
}

/// Расчёт по правилам: классификация и поиск ставки для каждой строки
pub async fn aggregate_standard(
    lines: &[LineItem],
    rules: &RuleSet,
    source: &dyn ProductMetadataSource,
) -> AggregationResult {
    let mut classifier = Classifier::new(source);
    let mut per_item = Vec::with_capacity(lines.len());
    let mut total_order_amount = Decimal::ZERO;
    let mut total_commission = Decimal::ZERO;

    for item in lines {
        let classification = classifier.classify(item).await;
        let rule = rules.resolve_rate(Some(&classification.product_type), &classification.tags);
        let (mut net_total, mut commission_amount) = line_amounts(item, rule.rate);

        match (
            total_order_amount.checked_add(net_total),
            total_commission.checked_add(commission_amount),
        ) {
            (Some(order_sum), Some(commission_sum)) => {
                total_order_amount = order_sum;
                total_commission = commission_sum;
            }
            _ => {
                tracing::warn!(
                    "Order totals overflow on line '{}', line counted as 0",
                    item.title
                );
                net_total = Decimal::ZERO;
                commission_amount = Decimal::ZERO;
            }
        }

        per_item.push(LineCommission {
            item: item.clone(),
            product_type: classification.product_type,
            rate: rule.rate,
            rule,
            net_total,
            commission_amount,
        });
    }

    AggregationResult {
        per_item,
        total_commission,
        total_order_amount,
        adjusted: false,
        effective_rate: None,
    }
}

/// Расчёт от суммы, установленной вручную: итог равен `amount` без пересчёта
pub fn aggregate_adjusted(lines: &[LineItem], amount: Decimal) -> AggregationResult {
    let mut total_order_amount = Decimal::ZERO;
    let mut net_totals = Vec::with_capacity(lines.len());
    for item in lines {
        let net_total = item
            .checked_net_total()
            .and_then(|net| total_order_amount.checked_add(net).map(|sum| (net, sum)));
        match net_total {
            Some((net, sum)) => {
                total_order_amount = sum;
                net_totals.push(net);
            }
            None => {
                tracing::warn!("Line '{}' overflows order total, counted as 0", item.title);
                net_totals.push(Decimal::ZERO);
            }
        }
    }
    let rate = effective_rate(amount, total_order_amount);
    let rule = RuleMatch {
        rate,
        tier: MatchTier::ManualAdjustment,
        rule_value: format!("{}% (Adjusted)", format_rate(rate)),
        rule_id: None,
    };

    let per_item = lines
        .iter()
        .zip(net_totals)
        .map(|(item, net_total)| LineCommission {
            item: item.clone(),
            product_type: String::new(),
            rate,
            rule: rule.clone(),
            net_total,
            commission_amount: percent_of(net_total, rate).unwrap_or(Decimal::ZERO),
        })
        .collect();

    AggregationResult {
        per_item,
        total_commission: amount,
        total_order_amount,
        adjusted: true,
        effective_rate: Some(rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::commission::test_support::{rule, StubSource};
    use crate::shared::commission::{CommissionEngine, NoProductMetadata};
    use contracts::domain::a003_shop_order::aggregate::{ShopOrder, ShopifyOrderPayload};
    use contracts::domain::a004_commission::aggregate::CommissionRecord;
    use contracts::enums::rule_type::RuleType;
    use serde_json::json;

    fn order(line_items: serde_json::Value) -> ShopOrder {
        let payload: ShopifyOrderPayload = serde_json::from_value(json!({
            "id": 1001,
            "name": "#1001",
            "currency": "USD",
            "total_price": "200.00",
            "subtotal_price": "200.00",
            "line_items": line_items,
        }))
        .unwrap();
        ShopOrder::from_shopify(payload).unwrap()
    }

    fn single_item_order() -> ShopOrder {
        order(json!([{ "title": "Floor mat", "price": "100.00", "quantity": 2, "total_discount": "0" }]))
    }

    fn trapo_rules() -> RuleSet {
        RuleSet::new(vec![rule(RuleType::ProductType, "TRAPO CLASSIC", 10, 5)])
    }

    fn adjusted_record(amount: Decimal) -> CommissionRecord {
        let mut record =
            CommissionRecord::new_pending("o".into(), "#1001", "a".into(), Decimal::from(20));
        record.adjust("admin", amount, "dispute").unwrap();
        record
    }

    #[tokio::test]
    async fn test_standard_end_to_end() {
        let rules = trapo_rules();
        let engine = CommissionEngine::new(&rules, &NoProductMetadata);

        let result = engine.aggregate(&single_item_order(), None).await;

        assert!(!result.adjusted);
        assert_eq!(result.per_item.len(), 1);
        assert_eq!(result.per_item[0].product_type, "TRAPO CLASSIC");
        assert_eq!(result.per_item[0].net_total, Decimal::new(20000, 2));
        assert_eq!(result.per_item[0].commission_amount, Decimal::from(20));
        assert_eq!(result.per_item[0].rule.tier, MatchTier::ProductType);
        assert_eq!(result.total_commission, Decimal::from(20));
        assert_eq!(result.total_order_amount, Decimal::from(200));
    }

    #[tokio::test]
    async fn test_adjusted_end_to_end() {
        let rules = trapo_rules();
        let engine = CommissionEngine::new(&rules, &NoProductMetadata);
        let record = adjusted_record(Decimal::from(15));

        let result = engine.aggregate(&single_item_order(), Some(&record)).await;

        assert!(result.adjusted);
        assert_eq!(result.effective_rate, Some(Decimal::new(75, 1)));
        assert_eq!(result.per_item[0].commission_amount, Decimal::from(15));
        assert_eq!(result.per_item[0].rule.tier, MatchTier::ManualAdjustment);
        assert_eq!(result.per_item[0].rule.rule_value, "7.50% (Adjusted)");
        assert_eq!(result.total_commission, Decimal::from(15));
    }

    #[tokio::test]
    async fn test_unadjusted_record_uses_rules() {
        let rules = trapo_rules();
        let engine = CommissionEngine::new(&rules, &NoProductMetadata);
        let record =
            CommissionRecord::new_pending("o".into(), "#1001", "a".into(), Decimal::from(99));

        let result = engine.aggregate(&single_item_order(), Some(&record)).await;
        assert!(!result.adjusted);
        assert_eq!(result.total_commission, Decimal::from(20));
    }

    #[test]
    fn test_adjusted_total_is_authoritative() {
        let lines = order(json!([
            { "title": "A", "price": "33.33", "quantity": 1 },
            { "title": "B", "price": "33.33", "quantity": 1 },
            { "title": "C", "price": "33.34", "quantity": 1 },
        ]))
        .lines;
        let amount = Decimal::new(1000, 2);

        let result = aggregate_adjusted(&lines, amount);

        assert_eq!(result.total_commission, amount);
        let sum: Decimal = result.per_item.iter().map(|l| l.commission_amount).sum();
        assert!((sum - amount).abs() < Decimal::new(1, 2));
    }

    #[test]
    fn test_adjusted_zero_order_total() {
        let lines = order(json!([
            { "title": "Gift", "price": "0", "quantity": 3 },
            { "title": "Free", "price": "10", "quantity": 1, "total_discount": "10" },
        ]))
        .lines;

        let result = aggregate_adjusted(&lines, Decimal::from(15));

        assert_eq!(result.effective_rate, Some(Decimal::ZERO));
        assert_eq!(result.total_commission, Decimal::from(15));
        assert!(result
            .per_item
            .iter()
            .all(|l| l.commission_amount == Decimal::ZERO));
        assert_eq!(result.per_item[0].rule.rule_value, "0.00% (Adjusted)");
    }

    #[tokio::test]
    async fn test_standard_is_idempotent() {
        let rules = RuleSet::new(vec![
            rule(RuleType::ProductType, "TRAPO CLASSIC", 10, 30),
            rule(RuleType::ProductTag, "vip", 12, 20),
            rule(RuleType::ProductTag, "gold", 12, 10),
            rule(RuleType::Default, "", 5, 5),
        ]);
        let source = StubSource::with("7", Some("Accessories"), &["vip", "gold"]);
        let engine = CommissionEngine::new(&rules, &source);
        let order = order(json!([
            { "title": "Mat", "price": "50", "quantity": 1 },
            { "title": "Charger", "product_id": 7, "price": "80.50", "quantity": 3, "total_discount": "5.25" },
            { "title": "Window Tint", "price": "120", "quantity": 1 },
        ]));

        let first = engine.aggregate(&order, None).await;
        let second = engine.aggregate(&order, None).await;

        assert_eq!(first, second);
        assert_eq!(first.per_item[1].product_type, "ACCESSORIES");
        assert_eq!(first.per_item[1].rule.tier, MatchTier::ProductTag);
        assert_eq!(first.per_item[1].rule.rule_value, "vip");
        assert_eq!(first.per_item[2].product_type, "OFFLINE SERVICE");
        assert_eq!(first.per_item[2].rule.tier, MatchTier::Default);
    }

    #[tokio::test]
    async fn test_malformed_items_count_as_zero() {
        let rules = RuleSet::new(vec![rule(RuleType::Default, "", 10, 1)]);
        let engine = CommissionEngine::new(&rules, &NoProductMetadata);
        let order = order(json!([
            { "title": "No price" },
            { "title": "Bad numbers", "price": "abc", "quantity": null },
            { "title": "Ok", "price": 10, "quantity": "2" },
        ]));

        let result = engine.aggregate(&order, None).await;

        assert_eq!(result.per_item.len(), 3);
        assert_eq!(result.total_order_amount, Decimal::from(20));
        assert_eq!(result.total_commission, Decimal::from(2));
    }

    #[tokio::test]
    async fn test_no_rules_yields_zero_commission() {
        let rules = RuleSet::default();
        let engine = CommissionEngine::new(&rules, &NoProductMetadata);

        let result = engine.aggregate(&single_item_order(), None).await;

        assert_eq!(result.total_commission, Decimal::ZERO);
        assert_eq!(result.per_item[0].rule, RuleMatch::zero_fallback());
    }

    #[tokio::test]
    async fn test_overflowing_line_counts_as_zero() {
        let rules = RuleSet::new(vec![rule(RuleType::Default, "", 100, 1)]);
        let engine = CommissionEngine::new(&rules, &NoProductMetadata);
        let order = order(json!([
            { "title": "Broken", "price": "79228162514264337593543950335", "quantity": 2 },
            { "title": "Ok", "price": "10", "quantity": 1 },
        ]));

        let result = engine.aggregate(&order, None).await;

        assert_eq!(result.per_item.len(), 2);
        assert_eq!(result.per_item[0].net_total, Decimal::ZERO);
        assert_eq!(result.per_item[0].commission_amount, Decimal::ZERO);
        assert_eq!(result.total_order_amount, Decimal::from(10));
        assert_eq!(result.total_commission, Decimal::from(10));
    }

    #[tokio::test]
    async fn test_overflowing_order_total_drops_line() {
        let rules = RuleSet::new(vec![rule(RuleType::Default, "", 1, 1)]);
        let engine = CommissionEngine::new(&rules, &NoProductMetadata);
        let order = order(json!([
            { "title": "Huge A", "price": "79228162514264337593543950335", "quantity": 1 },
            { "title": "Huge B", "price": "79228162514264337593543950335", "quantity": 1 },
        ]));

        let result = engine.aggregate(&order, None).await;

        assert_eq!(result.total_order_amount, Decimal::MAX);
        assert_eq!(result.per_item[1].net_total, Decimal::ZERO);
        assert_eq!(result.per_item[1].commission_amount, Decimal::ZERO);
        assert_eq!(result.total_commission, result.per_item[0].commission_amount);

        let adjusted = aggregate_adjusted(&order.lines, Decimal::from(5));
        assert_eq!(adjusted.total_order_amount, Decimal::MAX);
        assert_eq!(adjusted.per_item[1].net_total, Decimal::ZERO);
        assert_eq!(adjusted.total_commission, Decimal::from(5));
    }

    #[tokio::test]
    async fn test_non_ascii_metadata_type_matches_rule() {
        let rules = RuleSet::new(vec![
            rule(RuleType::ProductType, "Шины", 10, 5),
            rule(RuleType::Default, "", 3, 1),
        ]);
        let source = StubSource::with("7", Some("Шины"), &[]);
        let engine = CommissionEngine::new(&rules, &source);
        let order = order(json!([
            { "title": "Зимний комплект", "product_id": 7, "price": "100", "quantity": 1 },
        ]));

        let result = engine.aggregate(&order, None).await;

        assert_eq!(result.per_item[0].product_type, "ШИНЫ");
        assert_eq!(result.per_item[0].rule.tier, MatchTier::ProductType);
        assert_eq!(result.per_item[0].rate, Decimal::from(10));
        assert_eq!(result.total_commission, Decimal::from(10));
    }

    #[test]
    fn test_percent_of_overflow() {
        assert_eq!(
            percent_of(Decimal::from(200), Decimal::new(75, 1)),
            Some(Decimal::from(15))
        );
        assert_eq!(percent_of(Decimal::MAX, Decimal::from(2)), None);
    }

    #[test]
    fn test_effective_rate() {
        assert_eq!(
            effective_rate(Decimal::from(15), Decimal::from(200)),
            Decimal::new(75, 1)
        );
        assert_eq!(effective_rate(Decimal::from(15), Decimal::ZERO), Decimal::ZERO);
    }
}
