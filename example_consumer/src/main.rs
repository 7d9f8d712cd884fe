//! Example consumer: a study service whose routes and document come from `schema/study.json`.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

mod store;

use async_trait::async_trait;
use blueprint_sdk::{
    build_app, init_tracing, load_from_path, openapi::Info, resolve, serve, Materializer, RequestContext,
    ServerSettings, SessionResolver,
};
use serde_json::Value;
use std::sync::Arc;
use store::{handlers, StudyStore};

const RESEARCHER_HEADER: &str = "x-researcher-id";

/// Session values come from a trusted upstream header.
struct HeaderSession;

#[async_trait]
impl SessionResolver for HeaderSession {
    async fn resolve(&self, name: Option<&str>, request: &RequestContext) -> Option<Value> {
        match name {
            Some("researcher") => request
                .headers()
                .get(RESEARCHER_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| Value::String(v.to_string())),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("blueprint_sdk=info,example_consumer=info,tower_http=info");

    let settings = ServerSettings::from_env()?;
    let schema = std::env::var("STUDY_SCHEMA")
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/schema/study.json").to_string());
    let config = load_from_path(&schema).await?;
    let model = resolve(&config, &handlers(Arc::new(StudyStore::default())))?;
    let info = config
        .info
        .clone()
        .unwrap_or_else(|| Info::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));

    let materializer = Materializer::new(Arc::new(model)).session_resolver(Arc::new(HeaderSession));
    let app = build_app(&materializer, info, &settings)?;
    tracing::info!(docs = %settings.docs_path, "example consumer ready");
    serve(app, &settings).await?;
    Ok(())
}
