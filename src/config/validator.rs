//! Model validation: name uniqueness, path/parameter consistency, failure mappings.

use crate::error::ConfigError;
use crate::model::{placeholders, router_path, segment_placeholder, Location, SchemaModel};
use axum::http::Method;
use std::collections::{HashMap, HashSet};

/// Schema names the document always defines itself.
pub const RESERVED_SCHEMAS: [&str; 3] = ["Error", "Timestamp", "Identifier"];

const SUPPORTED_METHODS: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

pub fn validate(model: &SchemaModel) -> Result<(), ConfigError> {
    let mut component_names = HashSet::new();
    let mut bindings = HashSet::new();
    // Path shape (placeholders erased) -> first path declared with that shape.
    let mut shapes: HashMap<String, &str> = HashMap::new();

    for component in &model.components {
        if !component_names.insert(component.name.as_str()) {
            return Err(ConfigError::DuplicateComponent(component.name.clone()));
        }
        if RESERVED_SCHEMAS.contains(&component.name.as_str()) {
            tracing::warn!(component = %component.name, "component name is reserved; its schema is replaced in the document");
        }

        let mut route_names = HashSet::new();
        for route in &component.routes {
            let id = component.operation_id(route);
            if !route_names.insert(route.name.as_str()) {
                return Err(ConfigError::DuplicateRoute(id));
            }
            if !SUPPORTED_METHODS.contains(&route.method) {
                return Err(ConfigError::UnsupportedMethod {
                    route: id,
                    method: route.method.to_string(),
                });
            }
            if !route.status.is_success() {
                return Err(ConfigError::InvalidStatus {
                    route: id,
                    status: route.status.as_u16(),
                });
            }

            validate_path_syntax(&id, &route.path)?;
            let native = router_path(&route.path);
            if !bindings.insert((route.method.clone(), native)) {
                return Err(ConfigError::DuplicateBinding {
                    method: route.method.to_string(),
                    path: route.path.clone(),
                });
            }
            let shape = path_shape(&route.path);
            match shapes.get(&shape) {
                Some(first) if *first != route.path => {
                    return Err(ConfigError::ConflictingPaths {
                        first: (*first).to_string(),
                        second: route.path.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    shapes.insert(shape, route.path.as_str());
                }
            }

            let mut unnamed_bodies = 0;
            for (index, p) in route.input.iter().enumerate() {
                match (&p.name, p.location) {
                    (None, Location::Body) => unnamed_bodies += 1,
                    (None, loc) if !loc.allows_unnamed() => {
                        return Err(ConfigError::UnnamedParameter {
                            route: id,
                            location: loc.as_str(),
                            index,
                        });
                    }
                    _ => {}
                }
            }
            if unnamed_bodies > 1 {
                return Err(ConfigError::MultipleUnnamedBodies(id));
            }

            validate_path_parameters(&id, route)?;

            let mut kinds = HashSet::new();
            for mapping in &route.throws {
                if !kinds.insert(mapping.kind.as_str()) {
                    return Err(ConfigError::DuplicateFailureKind {
                        route: id,
                        kind: mapping.kind.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Paths are absolute. Each segment is a literal or exactly one `{name}` placeholder;
/// literals may not carry router syntax (`:`, `*`, braces).
fn validate_path_syntax(id: &str, path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') {
        return Err(ConfigError::RelativePath {
            route: id.to_string(),
            path: path.to_string(),
        });
    }
    for segment in path.split('/').skip(1) {
        if segment_placeholder(segment).is_some() {
            continue;
        }
        if segment.contains(['{', '}']) || segment.starts_with([':', '*']) {
            return Err(ConfigError::InvalidPathSegment {
                route: id.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}

/// Every placeholder is bound by exactly one path parameter and every path parameter
/// names a placeholder.
fn validate_path_parameters(id: &str, route: &crate::model::Route) -> Result<(), ConfigError> {
    let declared: Vec<&str> = route
        .input
        .iter()
        .filter(|p| p.location == Location::Path)
        .filter_map(|p| p.name.as_deref())
        .collect();
    let in_path: HashSet<&str> = placeholders(&route.path).into_iter().collect();

    for name in &in_path {
        match declared.iter().filter(|d| *d == name).count() {
            0 => {
                return Err(ConfigError::MissingPathParameter {
                    route: id.to_string(),
                    name: (*name).to_string(),
                })
            }
            1 => {}
            _ => {
                return Err(ConfigError::DuplicatePathParameter {
                    route: id.to_string(),
                    name: (*name).to_string(),
                })
            }
        }
    }
    if let Some(unbound) = declared.iter().find(|d| !in_path.contains(*d)) {
        return Err(ConfigError::UnboundPathParameter {
            route: id.to_string(),
            name: (*unbound).to_string(),
        });
    }
    Ok(())
}

fn path_shape(path: &str) -> String {
    let mut shape = path.to_string();
    for name in placeholders(path) {
        shape = shape.replacen(&format!("{{{}}}", name), "{}", 1);
    }
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Failure;
    use crate::handler::Arguments;
    use crate::model::{Builtin, Component, ExceptionMapping, Parameter, Route};
    use axum::http::StatusCode;
    use serde_json::Value;

    async fn noop(_args: Arguments) -> Result<Value, Failure> {
        Ok(Value::Null)
    }

    fn route(name: &str, method: Method, path: &str) -> Route {
        Route::new(name, method, path, noop)
    }

    fn study(routes: Vec<Route>) -> Result<SchemaModel, ConfigError> {
        let component = routes.into_iter().fold(Component::new("Study"), |c, r| c.route(r));
        SchemaModel::new(vec![component])
    }

    #[test]
    fn accepts_consistent_routes() {
        let model = study(vec![
            route("view", Method::GET, "/study/{study_id}").input(Parameter::path("study_id", Builtin::String)),
            route("update", Method::PUT, "/study/{study_id}")
                .input(Parameter::path("study_id", Builtin::String))
                .input(Parameter::body("Study")),
            route("list", Method::GET, "/study").input(Parameter::none()),
        ]);
        assert!(model.is_ok());
    }

    #[test]
    fn rejects_duplicate_components() {
        let err = SchemaModel::new(vec![Component::new("Study"), Component::new("Study")]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateComponent(n) if n == "Study"));
    }

    #[test]
    fn placeholders_and_path_parameters_must_match() {
        let missing = study(vec![route("view", Method::GET, "/study/{study_id}")]).unwrap_err();
        assert!(matches!(missing, ConfigError::MissingPathParameter { name, .. } if name == "study_id"));

        let unbound = study(vec![
            route("list", Method::GET, "/study").input(Parameter::path("study_id", Builtin::String))
        ])
        .unwrap_err();
        assert!(matches!(unbound, ConfigError::UnboundPathParameter { name, .. } if name == "study_id"));

        let twice = study(vec![route("view", Method::GET, "/study/{id}")
            .input(Parameter::path("id", Builtin::String))
            .input(Parameter::path("id", Builtin::String))])
        .unwrap_err();
        assert!(matches!(twice, ConfigError::DuplicatePathParameter { .. }));
    }

    #[test]
    fn rejects_unnamed_non_body_parameters() {
        let err = study(vec![route("list", Method::GET, "/study")
            .input(Parameter::new(None, Location::Query, Builtin::String))])
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnnamedParameter { location: "query", index: 0, .. }));
    }

    #[test]
    fn rejects_two_unnamed_bodies() {
        let err = study(vec![route("create", Method::POST, "/study")
            .input(Parameter::body("Study"))
            .input(Parameter::body("Study"))])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MultipleUnnamedBodies(id) if id == "Study::create"));
    }

    #[test]
    fn rejects_duplicate_failure_kinds() {
        let err = study(vec![route("list", Method::GET, "/study")
            .throws(ExceptionMapping::new("NotFound", StatusCode::NOT_FOUND))
            .throws(ExceptionMapping::new("NotFound", StatusCode::GONE))])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFailureKind { kind, .. } if kind == "NotFound"));
    }

    #[test]
    fn rejects_duplicate_and_conflicting_bindings() {
        let dup = SchemaModel::new(vec![
            Component::new("A").route(route("list", Method::GET, "/items")),
            Component::new("B").route(route("list", Method::GET, "/items")),
        ])
        .unwrap_err();
        assert!(matches!(dup, ConfigError::DuplicateBinding { .. }));

        let conflict = study(vec![
            route("view", Method::GET, "/study/{id}").input(Parameter::path("id", Builtin::String)),
            route("remove", Method::DELETE, "/study/{study_id}").input(Parameter::path("study_id", Builtin::String)),
        ])
        .unwrap_err();
        assert!(matches!(conflict, ConfigError::ConflictingPaths { .. }));
    }

    #[test]
    fn rejects_relative_paths() {
        let err = study(vec![route("list", Method::GET, "study")]).unwrap_err();
        assert!(matches!(err, ConfigError::RelativePath { path, .. } if path == "study"));
    }

    #[test]
    fn rejects_placeholders_inside_a_segment() {
        let err = study(vec![route("file", Method::GET, "/files/{name}.json")
            .input(Parameter::path("name", Builtin::String))])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPathSegment { segment, .. } if segment == "{name}.json"));

        let prefixed = study(vec![route("version", Method::GET, "/v{n}/study")
            .input(Parameter::path("n", Builtin::String))])
        .unwrap_err();
        assert!(matches!(prefixed, ConfigError::InvalidPathSegment { .. }));
    }

    #[test]
    fn rejects_router_syntax_in_literals() {
        let colon = study(vec![route("view", Method::GET, "/study/:id")]).unwrap_err();
        assert!(matches!(colon, ConfigError::InvalidPathSegment { segment, .. } if segment == ":id"));
        let wildcard = study(vec![route("all", Method::GET, "/study/*rest")]).unwrap_err();
        assert!(matches!(wildcard, ConfigError::InvalidPathSegment { .. }));
    }

    #[test]
    fn rejects_unsupported_method_and_status() {
        let method = study(vec![route("tunnel", Method::CONNECT, "/study")]).unwrap_err();
        assert!(matches!(method, ConfigError::UnsupportedMethod { .. }));

        let status = study(vec![route("list", Method::GET, "/study").status(StatusCode::NOT_FOUND)]).unwrap_err();
        assert!(matches!(status, ConfigError::InvalidStatus { status: 404, .. }));
    }
}
