//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Defects in a schema declaration, found while loading, validating or materializing it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate component: {0}")]
    DuplicateComponent(String),
    #[error("duplicate route: {0}")]
    DuplicateRoute(String),
    #[error("duplicate binding: {method} {path}")]
    DuplicateBinding { method: String, path: String },
    #[error("{route}: path '{path}' must start with '/'")]
    RelativePath { route: String, path: String },
    #[error("{route}: path segment '{segment}' must be a literal or a whole {{name}} placeholder")]
    InvalidPathSegment { route: String, segment: String },
    #[error("{route}: path '{path}' is served by the application itself")]
    ReservedPath { route: String, path: String },
    #[error("conflicting paths: {first} and {second}")]
    ConflictingPaths { first: String, second: String },
    #[error("{route}: placeholder '{name}' has no path parameter")]
    MissingPathParameter { route: String, name: String },
    #[error("{route}: path parameter '{name}' is declared more than once")]
    DuplicatePathParameter { route: String, name: String },
    #[error("{route}: path parameter '{name}' has no placeholder")]
    UnboundPathParameter { route: String, name: String },
    #[error("{route}: {location} parameter at position {index} requires a name")]
    UnnamedParameter {
        route: String,
        location: &'static str,
        index: usize,
    },
    #[error("{0}: at most one unnamed body parameter is allowed")]
    MultipleUnnamedBodies(String),
    #[error("{route}: failure kind '{kind}' is mapped more than once")]
    DuplicateFailureKind { route: String, kind: String },
    #[error("{route}: unsupported method {method}")]
    UnsupportedMethod { route: String, method: String },
    #[error("{route}: invalid status code {status}")]
    InvalidStatus { route: String, status: u16 },
    #[error("missing handler: {0}")]
    MissingHandler(String),
    #[error("{0}: session parameters require a session resolver")]
    SessionUnavailable(String),
    #[error("config load: {0}")]
    Load(String),
}

/// Request-level errors raised before a route handler runs.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            AppError::Rejected { status, .. } => (*status, "BadRequest"),
            AppError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SerializationError"),
        };
        tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        let body = Failure::new(kind, self.to_string());
        (status, Json(body)).into_response()
    }
}

/// A failure raised by a route handler.
///
/// `kind` identifies the failure variant and is matched exactly against a route's
/// declared exception mappings. Any `std::error::Error` converts into a `Failure`
/// whose kind is the error's short type name, so handlers can use `?` directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    #[serde(rename = "error")]
    message: String,
    kind: String,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Failure {
            message: message.into(),
            kind: kind.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: E) -> Self {
        Failure::new(kind_name::<E>(), e.to_string())
    }
}

/// Short type name used as a failure kind: `my_crate::errors::NotFound` -> `NotFound`.
pub fn kind_name<E: ?Sized>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("study {0} not found")]
    struct StudyNotFound(String);

    #[test]
    fn errors_convert_with_short_type_name() {
        fn lookup() -> Result<(), Failure> {
            let found: Result<(), StudyNotFound> = Err(StudyNotFound("42".into()));
            found?;
            Ok(())
        }
        let failure = lookup().unwrap_err();
        assert_eq!(failure.kind(), "StudyNotFound");
        assert_eq!(failure.message(), "study 42 not found");
    }

    #[test]
    fn request_errors_map_to_statuses() {
        assert_eq!(AppError::BadRequest("bad".into()).into_response().status(), StatusCode::BAD_REQUEST);
        let rejected = AppError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "too big".into(),
        };
        assert_eq!(rejected.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
        let serialization = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(
            AppError::from(serialization).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn failure_serializes_error_shape() {
        let body = serde_json::to_value(Failure::new("NotFound", "missing")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "missing", "kind": "NotFound" }));
    }
}
