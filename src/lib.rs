//! Blueprint SDK: one declarative schema model, served as axum routes and as an OpenAPI document.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handler;
pub mod model;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{from_json_str, load_from_path, resolve, validate, ApiConfig};
pub use error::{kind_name, AppError, ConfigError, Failure};
pub use extractors::{RequestContext, RequestSource, SessionResolver};
pub use handler::{Arguments, BoxedHandler, HandlerRegistry, RouteHandler};
pub use model::{
    AuthLocation, AuthRequirement, Builtin, Component, ExceptionMapping, Location, Parameter, Property, Route,
    SchemaModel, TypeRef,
};
pub use openapi::{synthesize, ApiDocument};
pub use routes::{common_routes, docs_routes, materialize, Materializer};
pub use server::{build_app, init_tracing, serve, ServerSettings};
pub use state::AppState;
