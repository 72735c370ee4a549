use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;

const LANDING_PAGE: &str = include_str!("../../static/index.html");

/// GET / - static landing page
pub async fn root() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let now = chrono::Utc::now();

    match state.history.repository().health_check().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        )),
        Err(e) => Err(ApiError::service_unavailable("Store unavailable", e.to_string())),
    }
}
