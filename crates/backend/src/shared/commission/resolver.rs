use contracts::domain::a001_commission_rule::aggregate::CommissionRule;
use contracts::domain::a004_commission::breakdown::{MatchTier, RuleMatch};
use contracts::enums::rule_type::RuleType;

/// Снимок активных правил, упорядоченный по (created_at, id).
///
/// При равенстве кандидатов побеждает более раннее правило, поэтому результат
/// не зависит от порядка строк в БД.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CommissionRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<CommissionRule>) -> Self {
        let mut rules: Vec<CommissionRule> = rules.into_iter().filter(|r| r.is_active()).collect();
        rules.sort_by(|a, b| {
            a.base
                .metadata
                .created_at
                .cmp(&b.base.metadata.created_at)
                .then_with(|| a.base.id.value().cmp(&b.base.id.value()))
        });
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[CommissionRule] {
        &self.rules
    }

    fn of_type(&self, rule_type: RuleType) -> impl Iterator<Item = &CommissionRule> {
        self.rules.iter().filter(move |r| r.rule_type == rule_type)
    }

    /// Ставка для строки заказа; всегда возвращает результат (в худшем случае 0%)
    pub fn resolve_rate(&self, product_type: Option<&str>, tags: &[String]) -> RuleMatch {
        if let Some(rule) = self.match_product_type(product_type) {
            return rule_match(rule);
        }
        if let Some(rule) = self.match_product_tag(tags) {
            return rule_match(rule);
        }
        if let Some(rule) = self.of_type(RuleType::Default).next() {
            return rule_match(rule);
        }
        RuleMatch::zero_fallback()
    }

    fn match_product_type(&self, product_type: Option<&str>) -> Option<&CommissionRule> {
        let product_type = product_type.map(str::trim).filter(|t| !t.is_empty())?;
        self.of_type(RuleType::ProductType)
            .find(|r| r.matches_value(product_type))
    }

    /// Из подходящих по тегам выбирается правило с наибольшим процентом
    fn match_product_tag(&self, tags: &[String]) -> Option<&CommissionRule> {
        let tags: Vec<&str> = tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            return None;
        }
        let mut best: Option<&CommissionRule> = None;
        for rule in self
            .of_type(RuleType::ProductTag)
            .filter(|r| tags.iter().any(|t| r.matches_value(t)))
        {
            match best {
                Some(current) if current.commission_percentage >= rule.commission_percentage => {}
                _ => best = Some(rule),
            }
        }
        best
    }
}

fn rule_match(rule: &CommissionRule) -> RuleMatch {
    let rule_value = if rule.rule_value.trim().is_empty() {
        "Default Rate".to_string()
    } else {
        rule.rule_value.clone()
    };
    RuleMatch {
        rate: rule.commission_percentage,
        tier: MatchTier::from(rule.rule_type),
        rule_value,
        rule_id: Some(rule.to_string_id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::commission::test_support::rule;
    use contracts::enums::rule_status::RuleStatus;
    use rust_decimal::Decimal;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_product_type_beats_tag() {
        let set = RuleSet::new(vec![
            rule(RuleType::ProductTag, "vip", 30, 10),
            rule(RuleType::ProductType, "TRAPO CLASSIC", 10, 5),
            rule(RuleType::Default, "", 5, 1),
        ]);

        let m = set.resolve_rate(Some("trapo classic"), &tags(&["VIP"]));
        assert_eq!(m.tier, MatchTier::ProductType);
        assert_eq!(m.rate, Decimal::from(10));
        assert_eq!(m.rule_value, "TRAPO CLASSIC");
        assert!(m.rule_id.is_some());
    }

    #[test]
    fn test_unmatched_type_falls_to_tags() {
        let set = RuleSet::new(vec![
            rule(RuleType::ProductType, "OFFLINE SERVICE", 12, 10),
            rule(RuleType::ProductTag, "vip", 30, 5),
        ]);

        let m = set.resolve_rate(Some("TRAPO CLASSIC"), &tags(&["vip"]));
        assert_eq!(m.tier, MatchTier::ProductTag);
        assert_eq!(m.rate, Decimal::from(30));
    }

    #[test]
    fn test_highest_tag_percentage_wins() {
        let set = RuleSet::new(vec![
            rule(RuleType::ProductTag, "summer", 8, 10),
            rule(RuleType::ProductTag, "VIP", 15, 5),
            rule(RuleType::ProductTag, "unrelated", 50, 1),
        ]);

        let m = set.resolve_rate(None, &tags(&["vip", "Summer"]));
        assert_eq!(m.rate, Decimal::from(15));
        assert_eq!(m.rule_value, "VIP");
    }

    #[test]
    fn test_equal_tag_percentage_earliest_wins() {
        let older = rule(RuleType::ProductTag, "a", 10, 60);
        let newer = rule(RuleType::ProductTag, "b", 10, 1);
        let older_id = older.to_string_id();

        let set = RuleSet::new(vec![newer, older]);
        let m = set.resolve_rate(None, &tags(&["b", "a"]));
        assert_eq!(m.rule_id, Some(older_id));
    }

    #[test]
    fn test_non_ascii_values_match_case_insensitively() {
        let set = RuleSet::new(vec![
            rule(RuleType::ProductType, "Шины", 10, 10),
            rule(RuleType::ProductTag, "Ёлка", 20, 5),
            rule(RuleType::Default, "", 1, 1),
        ]);

        let by_type = set.resolve_rate(Some("ШИНЫ"), &[]);
        assert_eq!(by_type.tier, MatchTier::ProductType);
        assert_eq!(by_type.rate, Decimal::from(10));

        let by_tag = set.resolve_rate(Some("ДИСКИ"), &tags(&["ЁЛКА"]));
        assert_eq!(by_tag.tier, MatchTier::ProductTag);
        assert_eq!(by_tag.rate, Decimal::from(20));
    }

    #[test]
    fn test_default_rule() {
        let set = RuleSet::new(vec![rule(RuleType::Default, "", 5, 1)]);
        let m = set.resolve_rate(Some("ANYTHING"), &[]);
        assert_eq!(m.tier, MatchTier::Default);
        assert_eq!(m.rule_value, "Default Rate");
        assert_eq!(m.rate, Decimal::from(5));
    }

    #[test]
    fn test_zero_fallback_without_rules() {
        let set = RuleSet::default();
        let m = set.resolve_rate(Some("TRAPO CLASSIC"), &tags(&["vip"]));
        assert_eq!(m, RuleMatch::zero_fallback());
        assert_eq!(m.rate, Decimal::ZERO);
        assert_eq!(m.rule_id, None);
    }

    #[test]
    fn test_inactive_rules_are_ignored() {
        let mut inactive = rule(RuleType::ProductType, "TRAPO CLASSIC", 40, 5);
        inactive.status = RuleStatus::Inactive;
        let mut deleted = rule(RuleType::Default, "", 3, 5);
        deleted.base.metadata.is_deleted = true;

        let set = RuleSet::new(vec![inactive, deleted]);
        assert!(set.is_empty());
        assert_eq!(
            set.resolve_rate(Some("TRAPO CLASSIC"), &[]).rate,
            Decimal::ZERO
        );
    }
}
