//! Load declarations from JSON and bind them to handlers.

use crate::config::types::*;
use crate::error::ConfigError;
use crate::handler::HandlerRegistry;
use crate::model::{operation_id, Component, ExceptionMapping, Route, SchemaModel};
use axum::http::{Method, StatusCode};
use std::path::Path;
use std::sync::Arc;

pub fn from_json_str(json: &str) -> Result<ApiConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<ApiConfig, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "schema declarations read");
    from_json_str(&text)
}

/// Build a validated model from declarations, binding each route to the handler
/// registered under `<Component>::<Route>`.
pub fn resolve(config: &ApiConfig, handlers: &HandlerRegistry) -> Result<SchemaModel, ConfigError> {
    let mut components = Vec::with_capacity(config.components.len());
    for c in &config.components {
        let mut routes = Vec::with_capacity(c.routes.len());
        for r in &c.routes {
            routes.push(Arc::new(resolve_route(&c.name, r, handlers)?));
        }
        components.push(Component {
            name: c.name.clone(),
            description: c.description.clone(),
            properties: c.properties.clone(),
            routes,
        });
    }
    let model = SchemaModel::new(components)?;
    tracing::debug!(components = model.components.len(), "schema model resolved");
    Ok(model)
}

fn resolve_route(component: &str, r: &RouteConfig, handlers: &HandlerRegistry) -> Result<Route, ConfigError> {
    let id = operation_id(component, &r.name);
    let method = Method::from_bytes(r.method.to_uppercase().as_bytes()).map_err(|_| ConfigError::UnsupportedMethod {
        route: id.clone(),
        method: r.method.clone(),
    })?;
    let status = parse_status(&id, r.status)?;
    let handler = handlers.get(&id).ok_or_else(|| ConfigError::MissingHandler(id.clone()))?;

    let mut throws = Vec::with_capacity(r.throws.len());
    for t in &r.throws {
        throws.push(ExceptionMapping {
            kind: t.kind.clone(),
            status: parse_status(&id, t.status)?,
            description: t.description.clone(),
        });
    }

    let mut route = Route::with_handler(r.name.clone(), method, r.path.clone(), handler)
        .output(r.output.clone())
        .status(status);
    route.description = r.description.clone();
    route.input = r.input.clone();
    route.throws = throws;
    route.authorization = r.authorization.clone();
    Ok(route)
}

fn parse_status(route: &str, status: u16) -> Result<StatusCode, ConfigError> {
    StatusCode::from_u16(status).map_err(|_| ConfigError::InvalidStatus {
        route: route.to_string(),
        status,
    })
}
