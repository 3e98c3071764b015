use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a002_agent::aggregate::{Agent, AgentDto};
use serde_json::json;
use uuid::Uuid;

use crate::domain::a002_agent;
use crate::shared::errors::log_and_map;
use crate::system::auth::Actor;

/// GET /api/a002/agents
pub async fn list_all() -> Result<Json<Vec<Agent>>, StatusCode> {
    a002_agent::service::list_all()
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to list agents", e))
}

/// GET /api/a002/agents/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Agent>, StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a002_agent::service::get_by_id(uuid)
        .await
        .map_err(|e| log_and_map("Failed to get agent", e))?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// POST /api/a002/agents
pub async fn upsert(
    actor: Actor,
    Json(dto): Json<AgentDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = if dto.id.is_some() {
        let id = dto.id.clone().unwrap_or_default();
        a002_agent::service::update(&actor, dto).await.map(|_| id)
    } else {
        a002_agent::service::create(&actor, dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(log_and_map("Failed to save agent", e)),
    }
}

/// DELETE /api/a002/agents/:id
pub async fn delete(actor: Actor, Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_agent::service::delete(&actor, uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_and_map("Failed to delete agent", e)),
    }
}
