//! Components, routes and their parameters: the in-memory API surface.

use crate::error::kind_name;
use crate::handler::{BoxedHandler, RouteHandler};
use crate::model::TypeRef;
use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Request source a parameter is extracted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Body,
    Header,
    Cookie,
    Session,
    None,
}

impl Location {
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Body => "body",
            Location::Header => "header",
            Location::Cookie => "cookie",
            Location::Session => "session",
            Location::None => "none",
        }
    }

    /// Whether a parameter at this location may omit its name.
    pub fn allows_unnamed(self) -> bool {
        matches!(self, Location::Body | Location::None)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: Option<String>,
    pub location: Location,
    #[serde(rename = "type", default)]
    pub type_: TypeRef,
    #[serde(default)]
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: Option<String>, location: Location, type_: impl Into<TypeRef>) -> Self {
        Parameter {
            name,
            location,
            type_: type_.into(),
            description: None,
        }
    }

    pub fn path(name: impl Into<String>, type_: impl Into<TypeRef>) -> Self {
        Self::new(Some(name.into()), Location::Path, type_)
    }

    pub fn query(name: impl Into<String>, type_: impl Into<TypeRef>) -> Self {
        Self::new(Some(name.into()), Location::Query, type_)
    }

    pub fn header(name: impl Into<String>, type_: impl Into<TypeRef>) -> Self {
        Self::new(Some(name.into()), Location::Header, type_)
    }

    pub fn cookie(name: impl Into<String>, type_: impl Into<TypeRef>) -> Self {
        Self::new(Some(name.into()), Location::Cookie, type_)
    }

    pub fn session(name: impl Into<String>, type_: impl Into<TypeRef>) -> Self {
        Self::new(Some(name.into()), Location::Session, type_)
    }

    /// A named field of the JSON body.
    pub fn body_field(name: impl Into<String>, type_: impl Into<TypeRef>) -> Self {
        Self::new(Some(name.into()), Location::Body, type_)
    }

    /// The whole JSON body as one value.
    pub fn body(type_: impl Into<TypeRef>) -> Self {
        Self::new(None, Location::Body, type_)
    }

    /// Placeholder argument; always `null`.
    pub fn none() -> Self {
        Self::new(None, Location::None, TypeRef::default())
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Maps one failure kind to a response status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionMapping {
    pub kind: String,
    pub status: StatusCode,
    pub description: Option<String>,
}

impl ExceptionMapping {
    pub fn new(kind: impl Into<String>, status: StatusCode) -> Self {
        ExceptionMapping {
            kind: kind.into(),
            status,
            description: None,
        }
    }

    /// Mapping keyed by an error type; matches failures converted from `E`.
    pub fn of<E: ?Sized>(status: StatusCode) -> Self {
        Self::new(kind_name::<E>(), status)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLocation {
    Header,
    Query,
    Cookie,
}

/// Named credential gating a route. Descriptive only; enforcement happens elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthRequirement {
    pub name: String,
    pub location: AuthLocation,
}

impl AuthRequirement {
    pub fn header(name: impl Into<String>) -> Self {
        AuthRequirement {
            name: name.into(),
            location: AuthLocation::Header,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_: TypeRef,
}

impl Property {
    pub fn new(name: impl Into<String>, type_: impl Into<TypeRef>) -> Self {
        Property {
            name: name.into(),
            description: None,
            type_: type_.into(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One method + path binding with its inputs, output, failure mappings and handler.
#[derive(Clone)]
pub struct Route {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub description: Option<String>,
    pub input: Vec<Parameter>,
    pub output: TypeRef,
    pub throws: Vec<ExceptionMapping>,
    pub authorization: Option<AuthRequirement>,
    /// Status of a successful response.
    pub status: StatusCode,
    pub handler: BoxedHandler,
}

impl Route {
    pub fn new<H>(name: impl Into<String>, method: Method, path: impl Into<String>, handler: H) -> Self
    where
        H: RouteHandler + 'static,
    {
        Self::with_handler(name, method, path, Arc::new(handler))
    }

    pub fn with_handler(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        handler: BoxedHandler,
    ) -> Self {
        Route {
            name: name.into(),
            method,
            path: path.into(),
            description: None,
            input: Vec::new(),
            output: TypeRef::default(),
            throws: Vec::new(),
            authorization: None,
            status: StatusCode::OK,
            handler,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input(mut self, parameter: Parameter) -> Self {
        self.input.push(parameter);
        self
    }

    pub fn output(mut self, output: impl Into<TypeRef>) -> Self {
        self.output = output.into();
        self
    }

    pub fn throws(mut self, mapping: ExceptionMapping) -> Self {
        self.throws.push(mapping);
        self
    }

    pub fn authorization(mut self, auth: AuthRequirement) -> Self {
        self.authorization = Some(auth);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Declared mapping for a failure kind, if any.
    pub fn mapping_for(&self, kind: &str) -> Option<&ExceptionMapping> {
        self.throws.iter().find(|m| m.kind == kind)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("throws", &self.throws)
            .field("authorization", &self.authorization)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// One logical resource: its document schema and its routes.
#[derive(Clone, Debug)]
pub struct Component {
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    pub routes: Vec<Arc<Route>>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Component {
            name: name.into(),
            description: None,
            properties: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(Arc::new(route));
        self
    }

    /// `<Component>::<Route>`, the operation id and handler registry key.
    pub fn operation_id(&self, route: &Route) -> String {
        operation_id(&self.name, &route.name)
    }
}

pub fn operation_id(component: &str, route: &str) -> String {
    format!("{}::{}", component, route)
}

/// The full API surface. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct SchemaModel {
    pub components: Vec<Component>,
}

impl SchemaModel {
    /// Build and validate a model.
    pub fn new(components: Vec<Component>) -> Result<Self, crate::error::ConfigError> {
        let model = SchemaModel { components };
        crate::config::validate(&model)?;
        Ok(model)
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Every `(component, route)` in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Component, &Arc<Route>)> {
        self.components
            .iter()
            .flat_map(|c| c.routes.iter().map(move |r| (c, r)))
    }
}
