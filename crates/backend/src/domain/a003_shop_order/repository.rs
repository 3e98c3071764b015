use chrono::Utc;
use contracts::domain::a003_shop_order::aggregate::{ShopOrder, ShopOrderHeader, ShopOrderId};
use contracts::domain::a003_shop_order::line_item::LineItem;
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_shop_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub shopify_order_id: String,
    pub agent_id: Option<String>,
    pub header_json: String,
    pub lines_json: String,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ShopOrder {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        let mut header: ShopOrderHeader = serde_json::from_str(&m.header_json)
            .map_err(|e| anyhow::anyhow!("Invalid header_json in order {}: {}", m.id, e))?;
        // Колонка agent_id: источник истины для назначения
        header.agent_id = m.agent_id;
        let lines: Vec<LineItem> = serde_json::from_str(&m.lines_json)
            .map_err(|e| anyhow::anyhow!("Invalid lines_json in order {}: {}", m.id, e))?;

        Ok(ShopOrder {
            base: BaseAggregate::with_metadata(
                ShopOrderId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            header,
            lines,
        })
    }
}

fn to_active_model(aggregate: &ShopOrder) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        shopify_order_id: Set(aggregate.header.shopify_order_id.clone()),
        agent_id: Set(aggregate.header.agent_id.clone()),
        header_json: Set(serde_json::to_string(&aggregate.header)?),
        lines_json: Set(serde_json::to_string(&aggregate.lines)?),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        is_posted: Set(aggregate.base.metadata.is_posted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    })
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn into_orders(models: Vec<Model>) -> anyhow::Result<Vec<ShopOrder>> {
    models.into_iter().map(ShopOrder::try_from).collect()
}

pub async fn list(agent_id: Option<&str>) -> anyhow::Result<Vec<ShopOrder>> {
    let mut query = Entity::find().filter(Column::IsDeleted.eq(false));
    if let Some(agent_id) = agent_id {
        query = query.filter(Column::AgentId.eq(agent_id));
    }
    let models = query.order_by_desc(Column::CreatedAt).all(conn()).await?;
    into_orders(models)
}

/// Заказы с назначенным агентом
pub async fn list_with_agent() -> anyhow::Result<Vec<ShopOrder>> {
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::AgentId.is_not_null())
        .order_by_asc(Column::CreatedAt)
        .all(conn())
        .await?;
    into_orders(models)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ShopOrder>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    result.map(ShopOrder::try_from).transpose()
}

pub async fn get_by_shopify_id(shopify_order_id: &str) -> anyhow::Result<Option<ShopOrder>> {
    let result = Entity::find()
        .filter(Column::ShopifyOrderId.eq(shopify_order_id))
        .one(conn())
        .await?;
    result.map(ShopOrder::try_from).transpose()
}

pub async fn insert(aggregate: &ShopOrder) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active_model(aggregate)?.insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &ShopOrder) -> anyhow::Result<()> {
    let mut active = to_active_model(aggregate)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}
