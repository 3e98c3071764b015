use chrono::Utc;
use contracts::domain::a001_commission_rule::aggregate::{CommissionRule, CommissionRuleId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::rule_status::RuleStatus;
use contracts::enums::rule_type::RuleType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_commission_rule")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub rule_type: String,
    pub rule_value: String,
    /// Значение в нижнем регистре (Unicode) для уникального индекса
    pub rule_key: String,
    pub commission_percentage: String,
    pub status: String,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CommissionRule {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        // Неизвестный статус или тип не должен включать правило
        let mut status = RuleStatus::from_code(&m.status).unwrap_or(RuleStatus::Inactive);
        let rule_type = match RuleType::from_code(&m.rule_type) {
            Some(rule_type) => rule_type,
            None => {
                tracing::warn!(
                    "Unknown rule type '{}' in rule {}, rule excluded from resolution",
                    m.rule_type,
                    m.id
                );
                status = RuleStatus::Inactive;
                RuleType::Default
            }
        };

        CommissionRule {
            base: BaseAggregate::with_metadata(
                CommissionRuleId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            rule_type,
            rule_value: m.rule_value,
            commission_percentage: Decimal::from_str(m.commission_percentage.trim())
                .unwrap_or(Decimal::ZERO),
            status,
        }
    }
}

fn to_active_model(aggregate: &CommissionRule) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        rule_type: Set(aggregate.rule_type.code().to_string()),
        rule_value: Set(aggregate.rule_value.clone()),
        rule_key: Set(aggregate.uniqueness_key().1),
        commission_percentage: Set(aggregate.commission_percentage.normalize().to_string()),
        status: Set(aggregate.status.code().to_string()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list_all() -> anyhow::Result<Vec<CommissionRule>> {
    let items: Vec<CommissionRule> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::RuleType)
        .order_by_asc(Column::RuleValue)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Активные правила в порядке создания
pub async fn list_active() -> anyhow::Result<Vec<CommissionRule>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::Status.eq(RuleStatus::Active.code()))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn list_active_by_type(rule_type: RuleType) -> anyhow::Result<Vec<CommissionRule>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::Status.eq(RuleStatus::Active.code()))
        .filter(Column::RuleType.eq(rule_type.code()))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<CommissionRule>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &CommissionRule) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active_model(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &CommissionRule) -> anyhow::Result<()> {
    let mut active = to_active_model(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::commission::RuleSet;

    fn model(rule_type: &str, status: &str) -> Model {
        Model {
            id: Uuid::new_v4().to_string(),
            code: "RULE-1".into(),
            description: "rule".into(),
            comment: None,
            rule_type: rule_type.into(),
            rule_value: "Шины".into(),
            rule_key: "шины".into(),
            commission_percentage: "12.5".into(),
            status: status.into(),
            is_deleted: false,
            is_posted: false,
            created_at: Some(Utc::now()),
            updated_at: None,
            version: 0,
        }
    }

    #[test]
    fn test_unknown_rule_type_is_inactive() {
        let rule: CommissionRule = model("collection", "active").into();
        assert_eq!(rule.status, RuleStatus::Inactive);
        assert!(!rule.is_active());

        let set = RuleSet::new(vec![rule]);
        assert!(set.is_empty());
        assert_eq!(set.resolve_rate(Some("ШИНЫ"), &[]).rule_id, None);
    }

    #[test]
    fn test_known_row_maps_to_active_rule() {
        let rule: CommissionRule = model("ALL", "active").into();
        assert_eq!(rule.rule_type, RuleType::Default);
        assert_eq!(rule.status, RuleStatus::Active);
        assert_eq!(rule.commission_percentage, Decimal::new(125, 1));

        let unknown_status: CommissionRule = model("product_type", "archived").into();
        assert_eq!(unknown_status.status, RuleStatus::Inactive);
    }

    #[test]
    fn test_rule_key_is_unicode_lowercase() {
        let rule: CommissionRule = model("product_type", "active").into();
        let active = to_active_model(&rule);
        match active.rule_key {
            sea_orm::ActiveValue::Set(key) => assert_eq!(key, "шины"),
            other => panic!("rule_key not set: {:?}", other),
        }
    }
}
