use std::{fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use http::HeaderMap;
use serde_json::{Map, Value};

use crate::Error;

/// Per-request data handed to every resolver.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Where the field being resolved lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub parent_type: String,
    pub field_name: String,
}

pub struct ResolveParams {
    /// The value of the parent object.
    pub source: Value,
    /// Field arguments as JSON.
    pub args: Map<String, Value>,
    pub context: RequestContext,
    pub info: FieldInfo,
}

type ResolveFn = dyn Fn(ResolveParams) -> BoxFuture<'static, Result<Value, Error>> + Send + Sync;

/// The resolution step of an object field.
#[derive(Clone)]
pub struct Resolver(Arc<ResolveFn>);

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver")
    }
}

impl Resolver {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ResolveParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Error>> + Send + 'static,
    {
        Self(Arc::new(move |params| f(params).boxed()))
    }

    /// A resolver that computes its value synchronously.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(ResolveParams) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Self(Arc::new(move |params| futures::future::ready(f(params)).boxed()))
    }

    /// Reads the field's value from its parent object.
    pub fn default_field() -> Self {
        Self::from_fn(|params| Ok(default_field_value(&params)))
    }

    pub async fn resolve(&self, params: ResolveParams) -> Result<Value, Error> {
        (self.0)(params).await
    }
}

fn default_field_value(params: &ResolveParams) -> Value {
    params
        .source
        .get(&params.info.field_name)
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(source: Value, field_name: &str) -> ResolveParams {
        ResolveParams {
            source,
            args: Map::new(),
            context: RequestContext::default(),
            info: FieldInfo {
                parent_type: "User".to_string(),
                field_name: field_name.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn default_resolver_reads_from_parent() {
        let resolver = Resolver::default_field();

        let value = resolver
            .resolve(params(json!({"name": "Ada"}), "name"))
            .await
            .unwrap();
        assert_eq!(value, json!("Ada"));

        let missing = resolver.resolve(params(json!({"name": "Ada"}), "email")).await.unwrap();
        assert_eq!(missing, Value::Null);

        let not_an_object = resolver.resolve(params(json!("Ada"), "name")).await.unwrap();
        assert_eq!(not_an_object, Value::Null);
    }

    #[tokio::test]
    async fn async_resolvers_receive_arguments_and_context() {
        let resolver = Resolver::new(|params: ResolveParams| async move {
            let greeting = params.args.get("greeting").cloned().unwrap_or(Value::Null);
            let agent = params
                .context
                .headers()
                .get("user-agent")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();

            Ok::<_, Error>(json!({ "greeting": greeting, "agent": agent }))
        });

        let mut headers = HeaderMap::new();
        headers.insert("user-agent", "tests".parse().unwrap());

        let mut request = params(Value::Null, "hello");
        request.args.insert("greeting".to_string(), json!("hi"));
        request.context = RequestContext::new(headers);

        let value = resolver.resolve(request).await.unwrap();
        assert_eq!(value, json!({ "greeting": "hi", "agent": "tests" }));
    }
}
