use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ProceedStatus {
    pub status: u8,
}

/// POST /checkProceed
pub async fn check_proceed(State(state): State<AppState>) -> Json<ProceedStatus> {
    Json(ProceedStatus {
        status: state.history.check_proceed(),
    })
}
