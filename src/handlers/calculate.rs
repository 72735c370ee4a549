// handlers/calculate.rs - POST /calculate

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::ApiError;
use crate::server::AppState;
use crate::services::{CalculationOutcome, CalculationRequest};

/// POST /calculate - compute, record, optionally notify, return full history
pub async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<Json<CalculationOutcome>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.history.calculate(request).await?;
    Ok(Json(outcome))
}
