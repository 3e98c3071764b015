use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_commission_rule::aggregate::{
    CommissionRule, CommissionRuleDto, ResolveRateRequest, RuleStatusRequest,
};
use contracts::domain::a004_commission::breakdown::RuleMatch;
use serde_json::json;
use uuid::Uuid;

use crate::domain::a001_commission_rule;
use crate::shared::errors::log_and_map;
use crate::system::auth::Actor;

/// GET /api/a001/commission-rules
pub async fn list_all() -> Result<Json<Vec<CommissionRule>>, StatusCode> {
    a001_commission_rule::service::list_all()
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to list commission rules", e))
}

/// GET /api/a001/commission-rules/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<CommissionRule>, StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a001_commission_rule::service::get_by_id(uuid)
        .await
        .map_err(|e| log_and_map("Failed to get commission rule", e))?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// POST /api/a001/commission-rules
pub async fn upsert(
    actor: Actor,
    Json(dto): Json<CommissionRuleDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = if dto.id.is_some() {
        let id = dto.id.clone().unwrap_or_default();
        a001_commission_rule::service::update(&actor, dto)
            .await
            .map(|_| id)
    } else {
        a001_commission_rule::service::create(&actor, dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(log_and_map("Failed to save commission rule", e)),
    }
}

/// DELETE /api/a001/commission-rules/:id
pub async fn delete(actor: Actor, Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a001_commission_rule::service::delete(&actor, uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_and_map("Failed to delete commission rule", e)),
    }
}

/// POST /api/a001/commission-rules/:id/status
pub async fn set_status(
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<RuleStatusRequest>,
) -> Result<(), StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a001_commission_rule::service::set_status(&actor, uuid, request.status)
        .await
        .map_err(|e| log_and_map("Failed to change commission rule status", e))
}

/// POST /api/a001/commission-rules/resolve
pub async fn resolve(Json(request): Json<ResolveRateRequest>) -> Result<Json<RuleMatch>, StatusCode> {
    a001_commission_rule::service::resolve_rate(request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to resolve commission rate", e))
}
