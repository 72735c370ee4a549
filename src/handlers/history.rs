// handlers/history.rs - /history collection and record routes

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};

use crate::database::OperationRecord;
use crate::error::ApiError;
use crate::server::AppState;
use crate::services::{HistoryChange, OperationInput};

/// GET /history - every recorded operation in insertion order
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<OperationRecord>>, ApiError> {
    Ok(Json(state.history.list().await?))
}

/// PUT /history/:id - recompute a record from new inputs
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OperationInput>, JsonRejection>,
) -> Result<Json<HistoryChange>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    Ok(Json(state.history.update(id, input).await?))
}

/// DELETE /history/:id
pub async fn delete_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<HistoryChange>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.history.delete(id).await?))
}

/// DELETE /history
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<HistoryChange>, ApiError> {
    Ok(Json(state.history.clear().await?))
}
