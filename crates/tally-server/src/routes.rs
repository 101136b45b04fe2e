//! HTTP endpoints.
//!
//! - `/`       : health text, no side effects
//! - `/visits` : increment the counter and report the new total

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::app_state::AppState;

pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Visitor counter service is running")
}

pub async fn visits(State(state): State<AppState>) -> Response {
    match state.store().increment_and_persist() {
        Ok(visits) => (StatusCode::OK, Json(json!({ "visits": visits }))).into_response(),
        // Only reachable with strict durability; relaxed stores swallow
        // save failures and always return a value.
        Err(e) => {
            tracing::error!(error = %e, "visit increment failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.client_code().as_str() })),
            )
                .into_response()
        }
    }
}
