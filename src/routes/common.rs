//! Common routes: health, version.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Paths registered by [`common_routes`].
pub const COMMON_PATHS: [&str; 2] = ["/health", "/version"];

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    components: usize,
    routes: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        components: state.model.components.len(),
        routes: state.model.routes().count(),
    })
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .with_state(state)
}
