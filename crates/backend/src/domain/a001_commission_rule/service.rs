use super::repository;
use crate::shared::commission::RuleSet;
use crate::shared::errors::{NotFound, ValidationError};
use crate::system::auth::Actor;
use contracts::domain::a001_commission_rule::aggregate::{
    CommissionRule, CommissionRuleDto, ResolveRateRequest,
};
use contracts::domain::a004_commission::breakdown::RuleMatch;
use contracts::enums::rule_status::RuleStatus;
use contracts::enums::rule_type::RuleType;
use uuid::Uuid;

fn parse_rule_type(raw: &str) -> Result<RuleType, ValidationError> {
    RuleType::from_code(raw)
        .ok_or_else(|| ValidationError(format!("Неизвестный тип правила: '{}'", raw)))
}

/// Активное правило с тем же (тип, значение), кроме самого кандидата
pub fn find_conflict<'a>(
    candidate: &CommissionRule,
    existing: &'a [CommissionRule],
) -> Option<&'a CommissionRule> {
    if !candidate.is_active() {
        return None;
    }
    let key = candidate.uniqueness_key();
    existing.iter().find(|r| {
        r.is_active()
            && r.base.id.value() != candidate.base.id.value()
            && r.uniqueness_key() == key
    })
}

async fn ensure_unique(rule: &CommissionRule) -> anyhow::Result<()> {
    if !rule.is_active() {
        return Ok(());
    }
    let existing = repository::list_active_by_type(rule.rule_type).await?;
    if let Some(conflict) = find_conflict(rule, &existing) {
        return Err(ValidationError(format!(
            "Активное правило {} '{}' уже существует ({})",
            rule.rule_type, rule.rule_value, conflict.base.code
        ))
        .into());
    }
    Ok(())
}

fn validate(rule: &CommissionRule) -> anyhow::Result<()> {
    rule.validate().map_err(|e| ValidationError(e).into())
}

/// Создание нового правила
pub async fn create(actor: &Actor, dto: CommissionRuleDto) -> anyhow::Result<Uuid> {
    actor.require_admin()?;
    let rule_type = parse_rule_type(&dto.rule_type)?;
    let mut aggregate = CommissionRule::new_for_insert(
        dto.description,
        rule_type,
        dto.rule_value,
        dto.commission_percentage,
        dto.status.unwrap_or_default(),
        dto.comment,
    );
    if let Some(code) = dto.code.filter(|c| !c.trim().is_empty()) {
        aggregate.base.code = code;
    }

    validate(&aggregate)?;
    ensure_unique(&aggregate).await?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!(
        "Commission rule {} created by {}: {} '{}' = {}%",
        aggregate.base.code,
        actor.user_id,
        aggregate.rule_type,
        aggregate.rule_value,
        aggregate.commission_percentage
    );
    Ok(id)
}

/// Обновление существующего правила
pub async fn update(actor: &Actor, dto: CommissionRuleDto) -> anyhow::Result<()> {
    actor.require_admin()?;
    let raw_id = dto.id.clone().unwrap_or_default();
    let id = Uuid::parse_str(&raw_id)
        .map_err(|_| ValidationError(format!("Некорректный ID: '{}'", raw_id)))?;
    let rule_type = parse_rule_type(&dto.rule_type)?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| NotFound::new("commission rule", raw_id.clone()))?;

    aggregate.update(&dto, rule_type);

    validate(&aggregate)?;
    ensure_unique(&aggregate).await?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    tracing::info!("Commission rule {} updated by {}", aggregate.base.code, actor.user_id);
    Ok(())
}

/// Включение/выключение правила
pub async fn set_status(actor: &Actor, id: Uuid, status: RuleStatus) -> anyhow::Result<()> {
    actor.require_admin()?;
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| NotFound::new("commission rule", id.to_string()))?;
    if aggregate.status == status {
        return Ok(());
    }
    aggregate.status = status;
    ensure_unique(&aggregate).await?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    tracing::info!(
        "Commission rule {} set to {} by {}",
        aggregate.base.code,
        status.code(),
        actor.user_id
    );
    Ok(())
}

/// Мягкое удаление правила
pub async fn delete(actor: &Actor, id: Uuid) -> anyhow::Result<bool> {
    actor.require_admin()?;
    let deleted = repository::soft_delete(id).await?;
    if deleted {
        tracing::info!("Commission rule {} deleted by {}", id, actor.user_id);
    }
    Ok(deleted)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<CommissionRule>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<CommissionRule>> {
    repository::list_all().await
}

/// Снимок активных правил для движка расчёта
pub async fn load_rule_set() -> anyhow::Result<RuleSet> {
    let rules = repository::list_active().await?;
    let set = RuleSet::new(rules);
    if set.is_empty() {
        tracing::warn!("No active commission rules configured, all rates resolve to 0%");
    }
    Ok(set)
}

/// Подбор ставки по типу/тегам на текущих правилах
pub async fn resolve_rate(request: ResolveRateRequest) -> anyhow::Result<RuleMatch> {
    let rules = load_rule_set().await?;
    Ok(rules.resolve_rate(request.product_type.as_deref(), &request.tags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn rule(rule_type: RuleType, value: &str) -> CommissionRule {
        CommissionRule::new_for_insert(
            "rule".into(),
            rule_type,
            value.into(),
            Decimal::from(10),
            RuleStatus::Active,
            None,
        )
    }

    #[test]
    fn test_conflict_is_case_insensitive() {
        let existing = vec![rule(RuleType::ProductType, "Trapo Classic")];
        let candidate = rule(RuleType::ProductType, " TRAPO CLASSIC ");
        assert!(find_conflict(&candidate, &existing).is_some());

        let other_type = rule(RuleType::ProductTag, "Trapo Classic");
        assert!(find_conflict(&other_type, &existing).is_none());
    }

    #[test]
    fn test_single_active_default() {
        let existing = vec![rule(RuleType::Default, "")];
        let candidate = rule(RuleType::Default, "ignored");
        assert!(find_conflict(&candidate, &existing).is_some());
    }

    #[test]
    fn test_no_conflict_with_itself_or_when_inactive() {
        let existing = vec![rule(RuleType::ProductTag, "vip")];
        assert!(find_conflict(&existing[0], &existing).is_none());

        let mut inactive = rule(RuleType::ProductTag, "vip");
        inactive.status = RuleStatus::Inactive;
        assert!(find_conflict(&inactive, &existing).is_none());
    }

    #[test]
    fn test_parse_rule_type_accepts_legacy_all() {
        assert_eq!(parse_rule_type("ALL").unwrap(), RuleType::Default);
        assert!(parse_rule_type("category").is_err());
    }
}
