use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_shop_order::aggregate::{AssignAgentRequest, ShopOrder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::a003_shop_order;
use crate::shared::errors::log_and_map;
use crate::system::auth::Actor;

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub agent_id: Option<String>,
}

/// GET /api/a003/orders?agent_id=
pub async fn list(Query(params): Query<OrderListParams>) -> Result<Json<Vec<ShopOrder>>, StatusCode> {
    let agent_id = params.agent_id.as_deref().filter(|a| !a.is_empty());
    a003_shop_order::service::list(agent_id)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to list orders", e))
}

/// GET /api/a003/orders/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<ShopOrder>, StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a003_shop_order::service::get_by_id(uuid)
        .await
        .map_err(|e| log_and_map("Failed to get order", e))?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// POST /api/a003/orders (payload заказа Shopify)
pub async fn import(
    actor: Actor,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    a003_shop_order::service::import_from_shopify(&actor, payload)
        .await
        .map(|id| Json(json!({ "id": id.to_string() })))
        .map_err(|e| log_and_map("Failed to import Shopify order", e))
}

/// POST /api/a003/orders/:id/agent
pub async fn assign_agent(
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<AssignAgentRequest>,
) -> Result<(), StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a003_shop_order::service::assign_agent(&actor, uuid, request)
        .await
        .map_err(|e| log_and_map("Failed to assign agent", e))
}
