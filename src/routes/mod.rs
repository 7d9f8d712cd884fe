//! HTTP routes: materialized API routes plus common and docs endpoints.

pub mod common;
pub mod docs;
pub mod materialize;

pub use common::{common_routes, COMMON_PATHS};
pub use docs::docs_routes;
pub use materialize::{materialize, Binding, Materializer, ScopePlan};
