//! Shared state for the common and docs routes. The model and its document are built once.

use crate::model::SchemaModel;
use crate::openapi::{synthesize, ApiDocument};
use std::sync::Arc;
use utoipa::openapi::Info;

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<SchemaModel>,
    /// Synthesized at startup; never regenerated per request.
    pub document: Arc<ApiDocument>,
}

impl AppState {
    pub fn new(model: Arc<SchemaModel>, info: Info) -> Self {
        let document = Arc::new(synthesize(&model, info));
        AppState { model, document }
    }
}
