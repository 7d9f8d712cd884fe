//! Per-request context gathered once and read by every declared parameter.

use crate::error::AppError;
use crate::model::Location;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::COOKIE, HeaderMap, HeaderName, HeaderValue},
    response::IntoResponse,
};
use serde_json::Value;
use std::collections::HashMap;

/// Named accessors for each request source.
pub trait RequestSource {
    fn path_param(&self, name: &str) -> Option<&str>;
    fn query_param(&self, name: &str) -> Option<&str>;
    fn header(&self, name: &str) -> Option<&str>;
    fn cookie(&self, name: &str) -> Option<&str>;
    /// Parsed JSON body; `null` when the request had none.
    fn body(&self) -> &Value;
}

impl Location {
    /// Pull the raw value for a parameter from `source`. Absent values are `null`; strings are
    /// passed through without coercion.
    ///
    /// `Session` is not answered here: the materializer resolves it through its
    /// [`SessionResolver`](crate::extractors::SessionResolver).
    pub fn extract(self, name: Option<&str>, source: &dyn RequestSource) -> Value {
        let text = |v: Option<&str>| v.map(|s| Value::String(s.to_string())).unwrap_or(Value::Null);
        match (self, name) {
            (Location::Path, Some(n)) => text(source.path_param(n)),
            (Location::Query, Some(n)) => text(source.query_param(n)),
            (Location::Header, Some(n)) => text(source.header(n)),
            (Location::Cookie, Some(n)) => text(source.cookie(n)),
            (Location::Body, Some(n)) => source.body().get(n).cloned().unwrap_or(Value::Null),
            (Location::Body, None) => source.body().clone(),
            _ => Value::Null,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    path_params: HashMap<String, String>,
    query: HashMap<String, String>,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
    body: Value,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Invalid header names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(n), Ok(v)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.insert(n, v);
        }
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl RequestSource for RequestContext {
    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn body(&self) -> &Value {
        &self.body
    }
}

/// Cookies from every `Cookie` header; later pairs win.
pub fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|c| c.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn parse_body(bytes: &[u8]) -> Result<Value, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))
}

fn rejection(r: impl IntoResponse + std::fmt::Display) -> AppError {
    let message = r.to_string();
    let status = r.into_response().status();
    AppError::Rejected { status, message }
}

#[async_trait]
impl<S> FromRequest<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let path_params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, state).await {
            Ok(Path(params)) => params,
            Err(PathRejection::MissingPathParams(_)) => HashMap::new(),
            Err(e) => return Err(rejection(e)),
        };
        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).map_err(rejection)?;
        let cookies = parse_cookies(&parts.headers);
        let headers = parts.headers.clone();
        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(rejection)?;
        let body = parse_body(&bytes)?;
        Ok(RequestContext {
            path_params,
            query,
            headers,
            cookies,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> RequestContext {
        RequestContext::new()
            .with_path_param("study_id", "42")
            .with_query("limit", "10")
            .with_header("X-Api-Key", "secret")
            .with_cookie("sid", "abc")
            .with_body(json!({ "name": "Sleep", "tags": ["a"] }))
    }

    #[test]
    fn extracts_each_location() {
        let ctx = context();
        assert_eq!(Location::Path.extract(Some("study_id"), &ctx), json!("42"));
        assert_eq!(Location::Query.extract(Some("limit"), &ctx), json!("10"));
        assert_eq!(Location::Header.extract(Some("x-api-key"), &ctx), json!("secret"));
        assert_eq!(Location::Cookie.extract(Some("sid"), &ctx), json!("abc"));
        assert_eq!(Location::Body.extract(Some("tags"), &ctx), json!(["a"]));
        assert_eq!(
            Location::Body.extract(None, &ctx),
            json!({ "name": "Sleep", "tags": ["a"] })
        );
        assert_eq!(Location::None.extract(None, &ctx), Value::Null);
    }

    #[test]
    fn missing_values_are_null() {
        let ctx = context();
        assert_eq!(Location::Path.extract(Some("other"), &ctx), Value::Null);
        assert_eq!(Location::Body.extract(Some("missing"), &ctx), Value::Null);
        assert_eq!(Location::Query.extract(None, &ctx), Value::Null);
    }

    #[test]
    fn parses_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("a=b; c=d; flag"));
        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.get("a").map(String::as_str), Some("b"));
        assert_eq!(cookies.get("c").map(String::as_str), Some("d"));
        assert_eq!(cookies.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn empty_body_is_null_and_garbage_is_rejected() {
        assert_eq!(parse_body(b"").unwrap(), Value::Null);
        assert_eq!(parse_body(b"  \n").unwrap(), Value::Null);
        assert!(matches!(parse_body(b"{nope"), Err(AppError::BadRequest(_))));
    }
}
