//! Server settings from the environment and app assembly.

use crate::error::ConfigError;
use crate::routes::{common_routes, docs_routes, Materializer, COMMON_PATHS};
use crate::state::AppState;
use axum::Router;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::openapi::Info;

pub const ADDR_VAR: &str = "BLUEPRINT_ADDR";
pub const BODY_LIMIT_VAR: &str = "BLUEPRINT_BODY_LIMIT";
pub const DOCS_PATH_VAR: &str = "BLUEPRINT_DOCS_PATH";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    /// Maximum request body, in bytes.
    pub body_limit: usize,
    pub docs_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            body_limit: 1024 * 1024,
            docs_path: "/openapi.json".to_string(),
        }
    }
}

impl ServerSettings {
    /// Read settings from the process environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = ServerSettings::default();
        if let Some(addr) = lookup(ADDR_VAR) {
            settings.addr = addr
                .parse()
                .map_err(|e| ConfigError::Load(format!("{ADDR_VAR}={addr}: {e}")))?;
        }
        if let Some(limit) = lookup(BODY_LIMIT_VAR) {
            settings.body_limit = limit
                .parse()
                .map_err(|e| ConfigError::Load(format!("{BODY_LIMIT_VAR}={limit}: {e}")))?;
        }
        if let Some(path) = lookup(DOCS_PATH_VAR) {
            if !path.starts_with('/') {
                return Err(ConfigError::Load(format!("{DOCS_PATH_VAR} must start with '/': {path}")));
            }
            settings.docs_path = path;
        }
        Ok(settings)
    }
}

/// Common routes, the served document and every materialized route, behind body limit and
/// request tracing. Declared routes may not reuse a path the application serves itself.
pub fn build_app(materializer: &Materializer, info: Info, settings: &ServerSettings) -> Result<Router, ConfigError> {
    if COMMON_PATHS.contains(&settings.docs_path.as_str()) {
        return Err(ConfigError::ReservedPath {
            route: DOCS_PATH_VAR.to_string(),
            path: settings.docs_path.clone(),
        });
    }
    let reserved = |path: &str| COMMON_PATHS.contains(&path) || path == settings.docs_path;
    for binding in materializer.plan()?.iter().flat_map(|scope| &scope.bindings) {
        if reserved(&binding.router_path) {
            return Err(ConfigError::ReservedPath {
                route: binding.operation_id.clone(),
                path: binding.route.path.clone(),
            });
        }
    }

    let state = AppState::new(materializer.model(), info);
    let api = materializer.build()?;
    Ok(Router::new()
        .merge(common_routes(state.clone()))
        .merge(docs_routes(state, &settings.docs_path))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(settings.body_limit)),
        ))
}

/// Install the fmt subscriber; `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn serve(app: Router, settings: &ServerSettings) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    tracing::info!("listening on {}", settings.addr);
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(ServerSettings::from_lookup(lookup(&[])).unwrap(), ServerSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let settings = ServerSettings::from_lookup(lookup(&[
            (ADDR_VAR, "127.0.0.1:8080"),
            (BODY_LIMIT_VAR, "2048"),
            (DOCS_PATH_VAR, "/docs/api.json"),
        ]))
        .unwrap();
        assert_eq!(settings.addr, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(settings.body_limit, 2048);
        assert_eq!(settings.docs_path, "/docs/api.json");
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            ServerSettings::from_lookup(lookup(&[(BODY_LIMIT_VAR, "lots")])),
            Err(ConfigError::Load(_))
        ));
        assert!(matches!(
            ServerSettings::from_lookup(lookup(&[(DOCS_PATH_VAR, "openapi.json")])),
            Err(ConfigError::Load(_))
        ));
    }
}
