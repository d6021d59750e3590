//! GraphQL schema directives for the GraphRQ API.
//!
//! - `@length(max: Int)` limits the length of a scalar field's serialized value.
//! - `@stringFormat(format: String!)` checks a scalar field's serialized value
//!   against a named format.
//! - `@uppercase` upper-cases string results of a field.
//!
//! ```ignore
//! let mut directives = graphrq_directives::default_directives();
//! let schema = graphrq_directives::build_schema(sdl, &mut directives)?;
//! let executable = schema.into_executable(seed)?;
//! ```

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod directives;
mod error;
mod executable;
pub mod resolver;
pub mod scalar;
pub mod schema;

pub use directives::{
    cache::{CachePolicy, WrappedScalarCache},
    length::{LengthDirective, LENGTH_DIRECTIVE},
    string_format::{StringFormat, StringFormatDirective, STRING_FORMAT_DIRECTIVE},
    upper::{UpperDirective, UPPERCASE_DIRECTIVE},
    DirectivesCons, DirectivesNil, SchemaDirective, TransformContext,
};
pub use error::Error;
pub use executable::ExecutableOptions;
pub use resolver::{FieldInfo, RequestContext, ResolveParams, Resolver};
pub use scalar::ScalarType;
pub use schema::Schema;

/// The three directives under their default names.
pub type DefaultDirectives =
    DirectivesCons<UpperDirective, DirectivesCons<StringFormatDirective, DirectivesCons<LengthDirective, DirectivesNil>>>;

pub fn default_directives() -> DefaultDirectives {
    DirectivesNil
        .with(LengthDirective::default())
        .with(StringFormatDirective::default())
        .with(UpperDirective::default())
}

/// Parses `sdl` with the directives' declarations merged in front of it.
pub fn parse_with_directives<D: SchemaDirective + ?Sized>(sdl: &str, directives: &D) -> Result<Schema, Error> {
    let type_defs = directives.type_defs();

    if type_defs.is_empty() {
        Schema::parse(sdl)
    } else {
        Schema::parse(&format!("{type_defs}\n\n{sdl}"))
    }
}

/// Parses `sdl` and applies every directive to it.
pub fn build_schema<D: SchemaDirective + ?Sized>(sdl: &str, directives: &mut D) -> Result<Schema, Error> {
    let schema = parse_with_directives(sdl, directives)?;
    directives.transform(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn default_declarations() {
        insta::assert_snapshot!(default_directives().type_defs(), @r###"
        directive @length(max: Int) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION
        directive @stringFormat(format: String!) on FIELD_DEFINITION
        directive @uppercase on FIELD_DEFINITION
        "###);
    }

    #[test]
    fn builds_with_all_directives() {
        let mut directives = default_directives();
        let schema = build_schema(
            indoc! {r#"
                input UserWhere { name: String @length(max: 20) }

                type User {
                  name: String! @length(max: 20) @uppercase
                  email: String @stringFormat(format: "email")
                }

                type Query { users(where: UserWhere): [User!]! }
            "#},
            &mut directives,
        )
        .unwrap();

        insta::assert_snapshot!(schema.sdl(), @r###"
        directive @length(max: Int) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION

        directive @stringFormat(format: String!) on FIELD_DEFINITION

        directive @uppercase on FIELD_DEFINITION

        input UserWhere {
          name: LimitedLengthString20 @length(max: 20)
        }

        type User {
          name: LimitedLengthString20! @length(max: 20) @uppercase
          email: StringWithFormatEmail @stringFormat(format: "email")
        }

        type Query {
          users(where: UserWhere): [User!]!
        }

        "A String with limited length"
        scalar LimitedLengthString20

        "A String in email format"
        scalar StringWithFormatEmail
        "###);

        assert!(schema.field("User", "name").unwrap().resolver.is_some());
    }

    #[test]
    fn renamed_directives() {
        let mut directives = DirectivesNil.with(LengthDirective::new("maxLength"));
        let schema = build_schema("type Query { name: String @maxLength(max: 2) }", &mut directives).unwrap();

        assert_eq!(schema.field("Query", "name").unwrap().ty.to_string(), "LimitedLengthString2");
    }

    #[test]
    fn misplaced_directive_fails() {
        let mut directives = default_directives();
        let error = build_schema(
            indoc! {r#"
                input UserWhere { email: String @stringFormat(format: "email") }
                type Query { users(where: UserWhere): Boolean }
            "#},
            &mut directives,
        )
        .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Directive @stringFormat is not allowed on INPUT_FIELD_DEFINITION (UserWhere.email)"
        );
    }
}
