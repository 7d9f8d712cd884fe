//! Serves the synthesized OpenAPI document.

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;

async fn document(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.document.to_value()?))
}

/// GET `path` returns the document as JSON.
pub fn docs_routes(state: AppState, path: &str) -> Router {
    Router::new().route(path, get(document)).with_state(state)
}
