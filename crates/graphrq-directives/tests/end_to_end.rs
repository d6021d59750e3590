#![allow(unused_crate_dependencies)]

use async_graphql::PathSegment;
use graphrq_directives::{build_schema, default_directives, Error, ResolveParams, Resolver, Schema, SchemaDirective};
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const SDL: &str = indoc! {r#"
    type User {
      name: String @length(max: 5)
      email: String @stringFormat(format: "email")
      nickname: String @uppercase @length(max: 8)
    }

    type Query {
      user: User
      greeting(name: String!): String @uppercase
    }
"#};

fn schema() -> Schema {
    let mut directives = default_directives();
    let schema = Schema::parse(&format!("{}\n{SDL}", directives.type_defs()))
        .unwrap()
        .with_resolver(
            "Query",
            "greeting",
            Resolver::new(|params: ResolveParams| async move {
                let name = params.args.get("name").and_then(Value::as_str).unwrap_or_default();
                Ok::<_, Error>(json!(format!("hello {name}")))
            }),
        )
        .unwrap();

    directives.transform(schema).unwrap()
}

async fn execute(user: Value, query: &str) -> async_graphql::Response {
    schema()
        .into_executable(json!({ "user": user }))
        .unwrap()
        .execute(query)
        .await
}

#[tokio::test]
async fn length_within_max() {
    let response = execute(json!({ "name": "hello" }), "{ user { name } }").await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), json!({ "user": { "name": "hello" } }));
}

#[tokio::test]
async fn length_exceeded() {
    let response = execute(json!({ "name": "hello!" }), "{ user { name } }").await;

    assert_eq!(response.data.into_json().unwrap(), json!({ "user": { "name": null } }));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "expected max length: 5; given length: 6");
    assert_eq!(
        response.errors[0].path,
        vec![PathSegment::Field("user".to_string()), PathSegment::Field("name".to_string())]
    );
}

#[tokio::test]
async fn valid_email() {
    let response = execute(json!({ "email": "a@b.com" }), "{ user { email } }").await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), json!({ "user": { "email": "a@b.com" } }));
}

#[tokio::test]
async fn invalid_email() {
    let response = execute(json!({ "email": "a-b-com" }), "{ user { email } }").await;

    assert_eq!(response.data.into_json().unwrap(), json!({ "user": { "email": null } }));
    assert_eq!(response.errors[0].message, "Value a-b-com is not a valid email");
}

#[tokio::test]
async fn uppercase_default_and_explicit_resolvers() {
    let response = execute(
        json!({ "nickname": "ada" }),
        r#"{ user { nickname } greeting(name: "ada") }"#,
    )
    .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "user": { "nickname": "ADA" }, "greeting": "HELLO ADA" })
    );
}

#[tokio::test]
async fn uppercase_runs_before_the_length_check() {
    let response = execute(json!({ "nickname": "lovelace!" }), "{ user { nickname } }").await;

    assert_eq!(response.errors[0].message, "expected max length: 8; given length: 9");
}

#[tokio::test]
async fn one_bad_field_does_not_fail_the_others() {
    let response = execute(
        json!({ "name": "too long", "email": "a@b.com" }),
        "{ user { name email } }",
    )
    .await;

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "user": { "name": null, "email": "a@b.com" } })
    );
    assert_eq!(response.errors.len(), 1);
}

#[test]
fn directive_on_object_field_stops_the_build() {
    let mut directives = default_directives();
    let error = build_schema(
        indoc! {r#"
            type User { name: String }
            type Query { user: User @length(max: 3) }
        "#},
        &mut directives,
    )
    .unwrap_err();

    assert_eq!(
        error.to_string(),
        "@length cannot be applied to Query.user: not a scalar type: User"
    );
}

#[test]
fn unsupported_format_stops_the_build() {
    let mut directives = default_directives();
    let error = build_schema(
        r#"type Query { phone: String @stringFormat(format: "phone") }"#,
        &mut directives,
    )
    .unwrap_err();

    assert_eq!(error.to_string(), "Format phone is not supported");
}
