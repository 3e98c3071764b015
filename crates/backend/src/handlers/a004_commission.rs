use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a004_commission::aggregate::CommissionRecord;
use contracts::domain::a004_commission::breakdown::CommissionBreakdown;
use contracts::domain::a004_commission::requests::{
    AdjustRequest, AgentCommissionSummary, BulkActionRequest, BulkActionResult, BulkPayRequest,
    CancelRequest, CommissionListQuery, PayRequest,
};
use contracts::enums::commission_status::CommissionStatus;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::a004_commission;
use crate::shared::errors::log_and_map;
use crate::system::auth::Actor;

#[derive(Debug, Deserialize)]
pub struct CommissionListParams {
    pub status: Option<String>,
    pub agent_id: Option<String>,
}

fn parse_uuid(id: &str) -> Result<Uuid, StatusCode> {
    Uuid::parse_str(id).map_err(|_| StatusCode::BAD_REQUEST)
}

/// GET /api/a004/commissions?status=&agent_id=
pub async fn list(
    Query(params): Query<CommissionListParams>,
) -> Result<Json<Vec<CommissionRecord>>, StatusCode> {
    let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(code) => Some(CommissionStatus::from_code(code).ok_or(StatusCode::BAD_REQUEST)?),
        None => None,
    };
    let query = CommissionListQuery {
        status,
        agent_id: params.agent_id,
    };
    a004_commission::service::list(&query)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to list commissions", e))
}

/// GET /api/a004/commissions/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<CommissionRecord>, StatusCode> {
    let uuid = parse_uuid(&id)?;
    a004_commission::service::get_by_id(uuid)
        .await
        .map_err(|e| log_and_map("Failed to get commission", e))?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// GET /api/a004/commissions/:id/breakdown
pub async fn breakdown(Path(id): Path<String>) -> Result<Json<CommissionBreakdown>, StatusCode> {
    let uuid = parse_uuid(&id)?;
    a004_commission::service::breakdown(uuid)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to build commission breakdown", e))
}

/// POST /api/a004/commissions/:id/approve
pub async fn approve(
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<CommissionRecord>, StatusCode> {
    let uuid = parse_uuid(&id)?;
    a004_commission::service::approve(&actor, uuid)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to approve commission", e))
}

/// POST /api/a004/commissions/:id/adjust
pub async fn adjust(
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<CommissionRecord>, StatusCode> {
    let uuid = parse_uuid(&id)?;
    a004_commission::service::adjust(&actor, uuid, request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to adjust commission", e))
}

/// POST /api/a004/commissions/:id/pay
pub async fn pay(
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<PayRequest>,
) -> Result<Json<CommissionRecord>, StatusCode> {
    let uuid = parse_uuid(&id)?;
    a004_commission::service::pay(&actor, uuid, request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to pay commission", e))
}

/// POST /api/a004/commissions/:id/cancel
pub async fn cancel(
    actor: Actor,
    Path(id): Path<String>,
    request: Option<Json<CancelRequest>>,
) -> Result<Json<CommissionRecord>, StatusCode> {
    let uuid = parse_uuid(&id)?;
    let request = request.map(|Json(r)| r).unwrap_or_default();
    a004_commission::service::cancel(&actor, uuid, request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to cancel commission", e))
}

/// DELETE /api/a004/commissions/:id
pub async fn delete(actor: Actor, Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = parse_uuid(&id)?;
    match a004_commission::service::delete(&actor, uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_and_map("Failed to delete commission", e)),
    }
}

/// POST /api/a004/commissions/bulk/approve
pub async fn bulk_approve(
    actor: Actor,
    Json(request): Json<BulkActionRequest>,
) -> Result<Json<BulkActionResult>, StatusCode> {
    a004_commission::service::bulk_approve(&actor, request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Bulk approve failed", e))
}

/// POST /api/a004/commissions/bulk/pay
pub async fn bulk_pay(
    actor: Actor,
    Json(request): Json<BulkPayRequest>,
) -> Result<Json<BulkActionResult>, StatusCode> {
    a004_commission::service::bulk_pay(&actor, request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Bulk pay failed", e))
}

/// POST /api/a004/commissions/bulk/cancel
pub async fn bulk_cancel(
    actor: Actor,
    Json(request): Json<BulkActionRequest>,
) -> Result<Json<BulkActionResult>, StatusCode> {
    a004_commission::service::bulk_cancel(&actor, request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Bulk cancel failed", e))
}

/// GET /api/a004/agents/:agent_id/summary
pub async fn agent_summary(
    Path(agent_id): Path<String>,
) -> Result<Json<AgentCommissionSummary>, StatusCode> {
    a004_commission::service::agent_summary(&agent_id)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Failed to build agent summary", e))
}
