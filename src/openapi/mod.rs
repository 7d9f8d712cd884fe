//! OpenAPI projection of the schema model.

pub mod builtins;
pub mod synthesize;

pub use builtins::{described, schema_for};
pub use synthesize::{synthesize, ApiDocument, OPENAPI_VERSION};
pub use utoipa::openapi::{Info, OpenApi};
