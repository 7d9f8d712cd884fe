//! Route handlers: the statically typed callables bound to each route at startup.

use crate::error::Failure;
use crate::model::operation_id;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Positional arguments extracted for one request, in declared parameter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Arguments(values)
    }

    /// Value at `index`, or `null` past the end.
    pub fn get(&self, index: usize) -> &Value {
        self.0.get(index).unwrap_or(&NULL)
    }

    pub fn str(&self, index: usize) -> Option<&str> {
        self.get(index).as_str()
    }

    /// Deserialize the argument at `index`. Fails with kind `BadRequest`.
    pub fn decode<T: DeserializeOwned>(&self, index: usize) -> Result<T, Failure> {
        serde_json::from_value(self.get(index).clone())
            .map_err(|e| Failure::new("BadRequest", format!("argument {}: {}", index, e)))
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for Arguments {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The implementation bound to one route.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn call(&self, args: Arguments) -> Result<Value, Failure>;
}

#[async_trait]
impl<F, Fut> RouteHandler for F
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, Failure>> + Send + 'static,
{
    async fn call(&self, args: Arguments) -> Result<Value, Failure> {
        (self)(args).await
    }
}

pub type BoxedHandler = Arc<dyn RouteHandler>;

/// Handlers keyed by `<Component>::<Route>`, used to bind JSON declarations.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, BoxedHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry {
            handlers: HashMap::new(),
        }
    }

    pub fn register<H>(&mut self, component: &str, route: &str, handler: H) -> &mut Self
    where
        H: RouteHandler + 'static,
    {
        self.handlers
            .insert(operation_id(component, route), Arc::new(handler));
        self
    }

    pub fn get(&self, operation_id: &str) -> Option<BoxedHandler> {
        self.handlers.get(operation_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn closures_are_handlers() {
        let handler: BoxedHandler = Arc::new(|args: Arguments| async move {
            Ok::<_, Failure>(json!({ "echo": args.get(0).clone() }))
        });
        let out = handler.call(Arguments::new(vec![json!("hi")])).await.unwrap();
        assert_eq!(out, json!({ "echo": "hi" }));
    }

    #[test]
    fn missing_arguments_are_null() {
        let args = Arguments::new(vec![json!("42")]);
        assert_eq!(args.str(0), Some("42"));
        assert!(args.get(3).is_null());
    }

    #[test]
    fn decode_reports_bad_request() {
        let args = Arguments::new(vec![json!("not a number")]);
        let err = args.decode::<u32>(0).unwrap_err();
        assert_eq!(err.kind(), "BadRequest");
        assert_eq!(args.decode::<String>(0).unwrap(), "not a number");
    }

    #[test]
    fn registry_keys_by_operation_id() {
        let mut registry = HandlerRegistry::new();
        registry.register("Study", "view", |_args: Arguments| async { Ok::<_, Failure>(Value::Null) });
        assert!(registry.get("Study::view").is_some());
        assert!(registry.get("Study::list").is_none());
        assert_eq!(registry.len(), 1);
    }
}
