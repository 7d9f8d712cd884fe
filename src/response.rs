//! Response helpers for dispatched routes.

use crate::error::Failure;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// The handler's return value, serialized as-is.
pub fn success(status: StatusCode, value: Value) -> Response {
    (status, Json(value)).into_response()
}

/// `{"error": <message>, "kind": <kind>}` with the mapped status.
pub fn failure(status: StatusCode, failure: &Failure) -> Response {
    (status, Json(failure)).into_response()
}
