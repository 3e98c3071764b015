use axum::{http::StatusCode, Json};
use contracts::usecases::u501_calculate_commissions::{CalculateRequest, CalculateResponse};

use crate::shared::errors::log_and_map;
use crate::system::auth::Actor;
use crate::usecases::u501_calculate_commissions::CalculateExecutor;

/// POST /api/u501/calculate
pub async fn u501_calculate(
    actor: Actor,
    request: Option<Json<CalculateRequest>>,
) -> Result<Json<CalculateResponse>, StatusCode> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    CalculateExecutor::new()
        .execute(&actor, request)
        .await
        .map(Json)
        .map_err(|e| log_and_map("Commission calculation failed", e))
}
