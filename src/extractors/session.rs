//! Session lookup for `Location::Session` parameters.

use crate::extractors::RequestContext;
use async_trait::async_trait;
use serde_json::Value;

/// Resolves session-scoped values. Routes that declare session parameters can only be
/// materialized when a resolver is installed.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `None` when the request carries no session or the session has no such value.
    async fn resolve(&self, name: Option<&str>, request: &RequestContext) -> Option<Value>;
}
