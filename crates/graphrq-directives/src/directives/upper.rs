use serde_json::Value;

use super::{SchemaDirective, TransformContext};
use crate::{
    resolver::{ResolveParams, Resolver},
    schema::FieldConfig,
    Error,
};

pub const UPPERCASE_DIRECTIVE: &str = "uppercase";

/// `@uppercase`: string results of the field are returned in upper case.
/// Anything else is returned as the inner resolver produced it.
#[derive(Debug)]
pub struct UpperDirective {
    name: String,
}

impl Default for UpperDirective {
    fn default() -> Self {
        Self::new(UPPERCASE_DIRECTIVE)
    }
}

impl UpperDirective {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SchemaDirective for UpperDirective {
    fn type_defs(&self) -> String {
        format!("directive @{} on FIELD_DEFINITION", self.name)
    }

    fn enter_field(
        &mut self,
        _ctx: &mut TransformContext<'_>,
        parent_type: &str,
        field: &mut FieldConfig,
    ) -> Result<(), Error> {
        if field.directive(&self.name).is_none() {
            return Ok(());
        }

        tracing::debug!(coordinate = %format!("{parent_type}.{}", field.name), "uppercasing field");

        let inner = field.resolver.take().unwrap_or_else(Resolver::default_field);
        field.resolver = Some(uppercase(inner));

        Ok(())
    }
}

fn uppercase(inner: Resolver) -> Resolver {
    Resolver::new(move |params: ResolveParams| resolve_uppercase(inner.clone(), params))
}

async fn resolve_uppercase(inner: Resolver, params: ResolveParams) -> Result<Value, Error> {
    match inner.resolve(params).await? {
        Value::String(s) => Ok(Value::String(s.to_uppercase())),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        resolver::{FieldInfo, RequestContext},
        schema::Schema,
    };
    use indoc::indoc;
    use serde_json::{json, Map};

    const SDL: &str = indoc! {r#"
        directive @uppercase on FIELD_DEFINITION

        type Query {
          name: String @uppercase
          count: Int @uppercase
          plain: String
        }
    "#};

    fn params(source: Value, field_name: &str) -> ResolveParams {
        ResolveParams {
            source,
            args: Map::new(),
            context: RequestContext::default(),
            info: FieldInfo {
                parent_type: "Query".to_string(),
                field_name: field_name.to_string(),
            },
        }
    }

    async fn resolve(schema: &Schema, field_name: &str, source: Value) -> Result<Value, Error> {
        let field = schema.field("Query", field_name).unwrap();
        let resolver = field.resolver.clone().unwrap_or_else(Resolver::default_field);
        resolver.resolve(params(source, field_name)).await
    }

    #[test]
    fn declaration() {
        assert_eq!(
            UpperDirective::default().type_defs(),
            "directive @uppercase on FIELD_DEFINITION"
        );
    }

    #[tokio::test]
    async fn wraps_the_default_resolver() {
        let schema = UpperDirective::default().transform(Schema::parse(SDL).unwrap()).unwrap();
        let source = json!({ "name": "ada lovelace", "count": 3, "plain": "quiet" });

        assert_eq!(resolve(&schema, "name", source.clone()).await.unwrap(), json!("ADA LOVELACE"));
        assert_eq!(resolve(&schema, "count", source.clone()).await.unwrap(), json!(3));
        assert_eq!(resolve(&schema, "plain", source.clone()).await.unwrap(), json!("quiet"));
        assert_eq!(resolve(&schema, "name", json!({})).await.unwrap(), Value::Null);

        assert!(schema.field("Query", "plain").unwrap().resolver.is_none());
    }

    #[tokio::test]
    async fn wraps_explicit_resolvers() {
        let schema = Schema::parse(SDL)
            .unwrap()
            .with_resolver(
                "Query",
                "name",
                Resolver::new(|params: ResolveParams| async move {
                    Ok::<_, Error>(json!(format!("{}-{}", params.info.parent_type, params.info.field_name)))
                }),
            )
            .unwrap();

        let schema = UpperDirective::default().transform(schema).unwrap();

        assert_eq!(resolve(&schema, "name", Value::Null).await.unwrap(), json!("QUERY-NAME"));
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let schema = Schema::parse(SDL)
            .unwrap()
            .with_resolver(
                "Query",
                "name",
                Resolver::from_fn(|_| Err(Error::Resolver("database unavailable".to_string()))),
            )
            .unwrap();

        let schema = UpperDirective::default().transform(schema).unwrap();
        let error = resolve(&schema, "name", Value::Null).await.unwrap_err();

        assert_eq!(error.to_string(), "database unavailable");
    }

    #[tokio::test]
    async fn objects_and_lists_are_untouched() {
        let schema = Schema::parse(indoc! {r#"
            directive @uppercase on FIELD_DEFINITION
            type Query { name: String @uppercase }
        "#})
        .unwrap()
        .with_resolver(
            "Query",
            "name",
            Resolver::from_fn(|_| Ok(json!(["a", { "b": "c" }]))),
        )
        .unwrap();

        let schema = UpperDirective::default().transform(schema).unwrap();

        assert_eq!(
            resolve(&schema, "name", Value::Null).await.unwrap(),
            json!(["a", { "b": "c" }])
        );
    }
}
