//! Route materialization: one axum handler per declared route.
//!
//! Registration walks the model once. Each handler owns an `Arc` of its route, extracts
//! arguments by location, awaits the bound implementation and maps the outcome to a response.
//! Components without routes get no scope.

use crate::error::ConfigError;
use crate::extractors::{RequestContext, SessionResolver};
use crate::handler::Arguments;
use crate::model::{router_path, Location, Route, SchemaModel};
use crate::response;
use axum::{
    http::StatusCode,
    response::Response,
    routing::{on, MethodFilter},
    Router,
};
use serde_json::Value;
use std::sync::Arc;

/// One route ready to register.
#[derive(Clone, Debug)]
pub struct Binding {
    pub operation_id: String,
    pub filter: MethodFilter,
    /// Path in router syntax (`/study/:study_id`).
    pub router_path: String,
    pub route: Arc<Route>,
}

/// The bindings of one component, registered on their own router.
#[derive(Clone, Debug)]
pub struct ScopePlan {
    pub component: String,
    pub bindings: Vec<Binding>,
}

#[derive(Clone)]
pub struct Materializer {
    model: Arc<SchemaModel>,
    session: Option<Arc<dyn SessionResolver>>,
}

impl Materializer {
    pub fn new(model: Arc<SchemaModel>) -> Self {
        Materializer { model, session: None }
    }

    /// Install the resolver used for `Location::Session` parameters.
    pub fn session_resolver(mut self, resolver: Arc<dyn SessionResolver>) -> Self {
        self.session = Some(resolver);
        self
    }

    pub fn model(&self) -> Arc<SchemaModel> {
        Arc::clone(&self.model)
    }

    pub fn plan(&self) -> Result<Vec<ScopePlan>, ConfigError> {
        let mut scopes = Vec::new();
        for component in &self.model.components {
            if component.routes.is_empty() {
                continue;
            }
            let mut bindings = Vec::with_capacity(component.routes.len());
            for route in &component.routes {
                let operation_id = component.operation_id(route);
                let filter = MethodFilter::try_from(route.method.clone()).map_err(|_| ConfigError::UnsupportedMethod {
                    route: operation_id.clone(),
                    method: route.method.to_string(),
                })?;
                if self.session.is_none() && route.input.iter().any(|p| p.location == Location::Session) {
                    return Err(ConfigError::SessionUnavailable(operation_id));
                }
                bindings.push(Binding {
                    operation_id,
                    filter,
                    router_path: router_path(&route.path),
                    route: Arc::clone(route),
                });
            }
            scopes.push(ScopePlan {
                component: component.name.clone(),
                bindings,
            });
        }
        Ok(scopes)
    }

    pub fn build(&self) -> Result<Router, ConfigError> {
        let mut app = Router::new();
        for scope in self.plan()? {
            let mut router = Router::new();
            for binding in scope.bindings {
                tracing::info!(
                    "[{} => {} {}]",
                    binding.operation_id,
                    binding.route.method,
                    binding.router_path
                );
                let Binding {
                    operation_id,
                    filter,
                    router_path,
                    route,
                } = binding;
                let session = self.session.clone();
                let handler = move |ctx: RequestContext| {
                    let route = Arc::clone(&route);
                    let session = session.clone();
                    let operation_id = operation_id.clone();
                    async move { dispatch(&operation_id, &route, ctx, session.as_deref()).await }
                };
                router = router.route(&router_path, on(filter, handler));
            }
            app = app.merge(router);
        }
        Ok(app)
    }
}

/// Materialize every route of `model` without a session resolver.
pub fn materialize(model: Arc<SchemaModel>) -> Result<Router, ConfigError> {
    Materializer::new(model).build()
}

async fn dispatch(
    operation_id: &str,
    route: &Route,
    ctx: RequestContext,
    session: Option<&dyn SessionResolver>,
) -> Response {
    let mut values = Vec::with_capacity(route.input.len());
    for p in &route.input {
        let value = match (p.location, session) {
            (Location::Session, Some(resolver)) => resolver
                .resolve(p.name.as_deref(), &ctx)
                .await
                .unwrap_or(Value::Null),
            (location, _) => location.extract(p.name.as_deref(), &ctx),
        };
        values.push(value);
    }
    tracing::debug!(route = %operation_id, args = values.len(), "dispatch");

    match route.handler.call(Arguments::new(values)).await {
        Ok(value) => response::success(route.status, value),
        Err(failure) => {
            let status = match route.mapping_for(failure.kind()) {
                Some(mapping) => {
                    tracing::warn!(
                        route = %operation_id,
                        kind = %failure.kind(),
                        status = mapping.status.as_u16(),
                        error = %failure.message(),
                        "declared failure"
                    );
                    mapping.status
                }
                None => {
                    tracing::error!(
                        route = %operation_id,
                        kind = %failure.kind(),
                        error = %failure.message(),
                        "undeclared failure"
                    );
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            response::failure(status, &failure)
        }
    }
}
