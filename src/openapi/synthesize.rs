//! OpenAPI document synthesis from the schema model.
//!
//! One pass over components in declaration order. Paths and object properties keep
//! declaration order; `components.schemas`, `securitySchemes` and each operation's
//! `responses` are keyed maps sorted by name. The same model always yields the same bytes.

use crate::config::RESERVED_SCHEMAS;
use crate::model::{AuthLocation, AuthRequirement, Builtin, Component, ExceptionMapping, Location, Parameter, Route, SchemaModel};
use crate::openapi::builtins::{described, schema_for};
use axum::http::Method;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use utoipa::openapi::content::ContentBuilder;
use utoipa::openapi::path::{HttpMethod, Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItem, PathsBuilder};
use utoipa::openapi::request_body::{RequestBody, RequestBodyBuilder};
use utoipa::openapi::response::{Response, ResponseBuilder};
use utoipa::openapi::schema::{ComponentsBuilder, ObjectBuilder, Ref, Schema, SchemaType, Type};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityRequirement, SecurityScheme};
use utoipa::openapi::{Info, OpenApi, OpenApiBuilder, RefOr, Required};

const JSON: &str = "application/json";

/// Version written to the document's `openapi` field.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// A synthesized document. Serializes as OpenAPI 3.0 with `components.securitySchemes`
/// always present.
#[derive(Clone, Debug)]
pub struct ApiDocument(OpenApi);

impl ApiDocument {
    pub fn openapi(&self) -> &OpenApi {
        &self.0
    }

    pub fn into_inner(self) -> OpenApi {
        self.0
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(&self.0)?;
        if let Some(document) = value.as_object_mut() {
            document.insert("openapi".to_string(), Value::String(OPENAPI_VERSION.to_string()));
            let components = document
                .entry("components")
                .or_insert_with(|| Value::Object(Default::default()));
            if let Some(components) = components.as_object_mut() {
                components
                    .entry("securitySchemes")
                    .or_insert_with(|| Value::Object(Default::default()));
            }
        }
        Ok(value)
    }
}

impl Serialize for ApiDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.to_value().map_err(<S::Error as serde::ser::Error>::custom)?;
        value.serialize(serializer)
    }
}

/// Build the document for the whole model.
pub fn synthesize(model: &SchemaModel, info: Info) -> ApiDocument {
    let mut components = ComponentsBuilder::new()
        .schema("Error", error_schema())
        .schema("Timestamp", schema_for(&Builtin::Int64.into()))
        .schema("Identifier", schema_for(&Builtin::String.into()));
    let mut paths = PathsBuilder::new();
    let mut schemes: IndexMap<&str, &AuthRequirement> = IndexMap::new();

    for component in &model.components {
        if RESERVED_SCHEMAS.contains(&component.name.as_str()) {
            tracing::warn!(component = %component.name, "reserved schema name; component schema omitted");
        } else {
            components = components.schema(component.name.clone(), component_schema(component));
        }

        for route in &component.routes {
            let Some(method) = http_method(&route.method) else {
                tracing::warn!(route = %component.operation_id(route), method = %route.method, "method has no OpenAPI operation; skipped");
                continue;
            };
            paths = paths.path(route.path.clone(), PathItem::new(method, operation(component, route)));

            if let Some(auth) = &route.authorization {
                let first = *schemes.entry(auth.name.as_str()).or_insert(auth);
                if first.location != auth.location {
                    tracing::warn!(scheme = %auth.name, "security scheme declared with different locations; first one kept");
                }
            }
        }
    }

    for (name, auth) in schemes {
        components = components.security_scheme(name, api_key(auth));
    }

    ApiDocument(
        OpenApiBuilder::new()
            .info(info)
            .paths(paths.build())
            .components(Some(components.build()))
            .build(),
    )
}

fn error_schema() -> RefOr<Schema> {
    ObjectBuilder::new()
        .schema_type(SchemaType::Type(Type::Object))
        .property("error", schema_for(&Builtin::String.into()))
        .build()
        .into()
}

fn component_schema(component: &Component) -> RefOr<Schema> {
    component
        .properties
        .iter()
        .fold(
            ObjectBuilder::new()
                .schema_type(SchemaType::Type(Type::Object))
                .description(component.description.clone()),
            |object, p| object.property(p.name.clone(), described(&p.type_, p.description.as_deref())),
        )
        .build()
        .into()
}

fn http_method(method: &Method) -> Option<HttpMethod> {
    Some(match method.as_str() {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        "PATCH" => HttpMethod::Patch,
        "HEAD" => HttpMethod::Head,
        "OPTIONS" => HttpMethod::Options,
        "TRACE" => HttpMethod::Trace,
        _ => return None,
    })
}

fn operation(component: &Component, route: &Route) -> Operation {
    let id = component.operation_id(route);
    let mut op = OperationBuilder::new()
        .operation_id(Some(id.clone()))
        .description(route.description.clone())
        .tag(component.name.clone());

    for parameter in route.input.iter().filter_map(parameter) {
        op = op.parameter(parameter);
    }
    op = op.request_body(request_body(&route.input));

    let mut statuses = HashSet::new();
    statuses.insert(route.status.as_u16());
    op = op.response(route.status.as_u16().to_string(), success_response(route));
    for mapping in &route.throws {
        let code = mapping.status.as_u16();
        if !statuses.insert(code) {
            tracing::warn!(route = %id, status = code, kind = %mapping.kind, "status already documented; later mapping overwrites it");
        }
        op = op.response(code.to_string(), failure_response(mapping));
    }

    if let Some(auth) = &route.authorization {
        op = op.security(SecurityRequirement::new(auth.name.clone(), Vec::<String>::new()));
    }
    op.build()
}

/// Transport-visible inputs only; Body, Session and None have no parameter object.
fn parameter(p: &Parameter) -> Option<utoipa::openapi::path::Parameter> {
    let location = match p.location {
        Location::Path => ParameterIn::Path,
        Location::Query => ParameterIn::Query,
        Location::Header => ParameterIn::Header,
        Location::Cookie => ParameterIn::Cookie,
        Location::Body | Location::Session | Location::None => return None,
    };
    let name = p.name.as_deref()?;
    Some(
        ParameterBuilder::new()
            .name(name)
            .parameter_in(location)
            .required(Required::True)
            .description(p.description.clone())
            .schema(Some(schema_for(&p.type_)))
            .build(),
    )
}

/// A single unnamed body is the payload itself; otherwise named body fields form an inline object.
fn request_body(input: &[Parameter]) -> Option<RequestBody> {
    let bodies: Vec<&Parameter> = input.iter().filter(|p| p.location == Location::Body).collect();
    if bodies.is_empty() {
        return None;
    }
    let unnamed: Vec<&&Parameter> = bodies.iter().filter(|p| p.name.is_none()).collect();
    let schema = match unnamed.as_slice() {
        [only] => schema_for(&only.type_),
        _ => bodies
            .iter()
            .filter_map(|p| p.name.as_deref().map(|n| (n, *p)))
            .fold(
                ObjectBuilder::new().schema_type(SchemaType::Type(Type::Object)),
                |object, (name, p)| object.property(name, described(&p.type_, p.description.as_deref())),
            )
            .build()
            .into(),
    };
    Some(
        RequestBodyBuilder::new()
            .content(JSON, ContentBuilder::new().schema(Some(schema)).build())
            .required(Some(Required::True))
            .build(),
    )
}

fn success_response(route: &Route) -> Response {
    ResponseBuilder::new()
        .description("Success")
        .content(JSON, ContentBuilder::new().schema(Some(schema_for(&route.output))).build())
        .build()
}

fn failure_response(mapping: &ExceptionMapping) -> Response {
    let description = mapping.description.clone().unwrap_or_else(|| mapping.kind.clone());
    ResponseBuilder::new()
        .description(description)
        .content(
            JSON,
            ContentBuilder::new()
                .schema(Some(RefOr::Ref(Ref::from_schema_name("Error"))))
                .build(),
        )
        .build()
}

fn api_key(auth: &AuthRequirement) -> SecurityScheme {
    let value = ApiKeyValue::new(auth.name.clone());
    SecurityScheme::ApiKey(match auth.location {
        AuthLocation::Header => ApiKey::Header(value),
        AuthLocation::Query => ApiKey::Query(value),
        AuthLocation::Cookie => ApiKey::Cookie(value),
    })
}
