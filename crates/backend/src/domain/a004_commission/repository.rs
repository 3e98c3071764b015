use chrono::Utc;
use contracts::domain::a004_commission::aggregate::{CommissionId, CommissionRecord};
use contracts::domain::a004_commission::requests::CommissionListQuery;
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::commission_status::CommissionStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;
use crate::shared::errors::ConcurrentModification;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_commission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub order_id: String,
    pub agent_id: String,
    pub amount: String,
    pub status: String,
    pub adjusted_by: Option<String>,
    pub adjustment_reason: Option<String>,
    pub adjusted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub approved_by: Option<String>,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub paid_by: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_note: Option<String>,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CommissionRecord {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let status = CommissionStatus::from_code(&m.status).unwrap_or_else(|| {
            tracing::warn!("Unknown commission status '{}' in {}", m.status, m.id);
            CommissionStatus::Pending
        });

        CommissionRecord {
            base: BaseAggregate::with_metadata(
                CommissionId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            order_id: m.order_id,
            agent_id: m.agent_id,
            amount: Decimal::from_str(m.amount.trim()).unwrap_or(Decimal::ZERO),
            status,
            adjusted_by: m.adjusted_by,
            adjustment_reason: m.adjustment_reason,
            adjusted_at: m.adjusted_at,
            approved_by: m.approved_by,
            approved_at: m.approved_at,
            paid_by: m.paid_by,
            payment_reference: m.payment_reference,
            payment_note: m.payment_note,
            paid_at: m.paid_at,
            cancelled_by: m.cancelled_by,
            cancellation_reason: m.cancellation_reason,
            cancelled_at: m.cancelled_at,
        }
    }
}

fn to_active_model(r: &CommissionRecord) -> ActiveModel {
    ActiveModel {
        id: Set(r.base.id.value().to_string()),
        code: Set(r.base.code.clone()),
        description: Set(r.base.description.clone()),
        comment: Set(r.base.comment.clone()),
        order_id: Set(r.order_id.clone()),
        agent_id: Set(r.agent_id.clone()),
        amount: Set(r.amount.normalize().to_string()),
        status: Set(r.status.code().to_string()),
        adjusted_by: Set(r.adjusted_by.clone()),
        adjustment_reason: Set(r.adjustment_reason.clone()),
        adjusted_at: Set(r.adjusted_at),
        approved_by: Set(r.approved_by.clone()),
        approved_at: Set(r.approved_at),
        paid_by: Set(r.paid_by.clone()),
        payment_reference: Set(r.payment_reference.clone()),
        payment_note: Set(r.payment_note.clone()),
        paid_at: Set(r.paid_at),
        cancelled_by: Set(r.cancelled_by.clone()),
        cancellation_reason: Set(r.cancellation_reason.clone()),
        cancelled_at: Set(r.cancelled_at),
        is_deleted: Set(r.base.metadata.is_deleted),
        is_posted: Set(r.base.metadata.is_posted),
        created_at: Set(Some(r.base.metadata.created_at)),
        updated_at: Set(Some(r.base.metadata.updated_at)),
        version: Set(r.base.metadata.version),
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list(query: &CommissionListQuery) -> anyhow::Result<Vec<CommissionRecord>> {
    let mut select = Entity::find().filter(Column::IsDeleted.eq(false));
    if let Some(status) = query.status {
        select = select.filter(Column::Status.eq(status.code()));
    }
    if let Some(agent_id) = query.agent_id.as_deref().filter(|a| !a.is_empty()) {
        select = select.filter(Column::AgentId.eq(agent_id));
    }
    let items = select
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<CommissionRecord>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

/// Все начисления по заказу (любые агенты)
pub async fn list_for_order(order_id: &str) -> anyhow::Result<Vec<CommissionRecord>> {
    let items = Entity::find()
        .filter(Column::OrderId.eq(order_id))
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn insert(record: &CommissionRecord) -> anyhow::Result<Uuid> {
    let uuid = record.base.id.value();
    to_active_model(record).insert(conn()).await?;
    Ok(uuid)
}

/// Запись с проверкой версии: строка обновляется, только если в БД всё ещё
/// `expected_version`
pub async fn update(record: &CommissionRecord, expected_version: i32) -> anyhow::Result<()> {
    let id = record.base.id.value().to_string();
    let mut active = to_active_model(record);
    active.id = sea_orm::ActiveValue::NotSet;
    active.created_at = sea_orm::ActiveValue::NotSet;

    let result = Entity::update_many()
        .set(active)
        .filter(Column::Id.eq(id.clone()))
        .filter(Column::Version.eq(expected_version))
        .exec(conn())
        .await?;

    if result.rows_affected == 0 {
        return Err(ConcurrentModification {
            entity: "commission",
            id,
            expected_version,
        }
        .into());
    }
    Ok(())
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
