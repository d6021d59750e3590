//! Schema directives and the visitor that applies them.
//!
//! Every directive contributes its SDL declaration through
//! [`SchemaDirective::type_defs`] and rewrites the fields annotated with it in
//! [`SchemaDirective::transform`]. Directives are chained with
//! [`DirectivesNil::with`]; the chain transforms the schema with each member
//! in turn, in registration order.

pub mod cache;
pub mod length;
pub mod string_format;
pub mod upper;

use std::sync::Arc;

use async_graphql_value::ConstValue;

use crate::{
    scalar::ScalarType,
    schema::{DirectiveUsage, FieldConfig, InputFieldConfig, Schema, TypeDefinition, TypeRef},
    Error,
};

pub trait SchemaDirective {
    /// The directive declarations to merge into the schema text.
    fn type_defs(&self) -> String {
        String::new()
    }

    fn enter_field(
        &mut self,
        _ctx: &mut TransformContext<'_>,
        _parent_type: &str,
        _field: &mut FieldConfig,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn enter_input_field(
        &mut self,
        _ctx: &mut TransformContext<'_>,
        _parent_type: &str,
        _field: &mut InputFieldConfig,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Produces the rewritten schema.
    fn transform(&mut self, schema: Schema) -> Result<Schema, Error> {
        visit(self, schema)
    }
}

/// What a directive may look at and change while one of its fields is visited.
///
/// The type owning the visited field has its fields moved out for the
/// duration of the visit.
pub struct TransformContext<'a> {
    schema: &'a mut Schema,
}

impl TransformContext<'_> {
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// The scalar behind a field type: `T` or `T!` where `T` is a scalar.
    /// Lists, objects, inputs and enums are rejected.
    pub fn field_scalar(&self, directive: &str, coordinate: &str, ty: &TypeRef) -> Result<Arc<ScalarType>, Error> {
        ty.nullable_named()
            .and_then(|name| self.schema.scalar(name))
            .cloned()
            .ok_or_else(|| Error::UnsupportedType {
                directive: directive.to_string(),
                coordinate: coordinate.to_string(),
                ty: ty.to_string(),
            })
    }

    pub fn register_scalar(&mut self, scalar: Arc<ScalarType>) -> Result<(), Error> {
        self.schema.register_scalar(scalar)
    }
}

/// Walks every object field and input object field of the schema.
pub fn visit<D: SchemaDirective + ?Sized>(directive: &mut D, mut schema: Schema) -> Result<Schema, Error> {
    let type_names: Vec<String> = schema.types.keys().cloned().collect();

    for type_name in type_names {
        match schema.types.get_mut(&type_name) {
            Some(TypeDefinition::Object(object)) => {
                let mut fields = std::mem::take(&mut object.fields);

                let result = {
                    let mut ctx = TransformContext { schema: &mut schema };
                    fields
                        .values_mut()
                        .try_for_each(|field| directive.enter_field(&mut ctx, &type_name, field))
                };

                if let Some(TypeDefinition::Object(object)) = schema.types.get_mut(&type_name) {
                    object.fields = fields;
                }
                result?;
            }
            Some(TypeDefinition::InputObject(input)) => {
                let mut fields = std::mem::take(&mut input.fields);

                let result = {
                    let mut ctx = TransformContext { schema: &mut schema };
                    fields
                        .values_mut()
                        .try_for_each(|field| directive.enter_input_field(&mut ctx, &type_name, field))
                };

                if let Some(TypeDefinition::InputObject(input)) = schema.types.get_mut(&type_name) {
                    input.fields = fields;
                }
                result?;
            }
            _ => {}
        }
    }

    Ok(schema)
}

pub(crate) fn invalid_argument(
    directive: &DirectiveUsage,
    argument: &'static str,
    coordinate: &str,
    expected: &'static str,
) -> Error {
    Error::InvalidDirectiveArgument {
        directive: directive.name.clone(),
        argument,
        coordinate: coordinate.to_string(),
        expected,
    }
}

pub(crate) fn u64_argument(directive: &DirectiveUsage, argument: &'static str, coordinate: &str) -> Result<u64, Error> {
    let value = match directive.argument(argument) {
        Some(ConstValue::Number(number)) => number.as_u64(),
        _ => None,
    };

    value.ok_or_else(|| invalid_argument(directive, argument, coordinate, "a non-negative integer"))
}

pub(crate) fn string_argument<'a>(
    directive: &'a DirectiveUsage,
    argument: &'static str,
    coordinate: &str,
) -> Result<&'a str, Error> {
    match directive.argument(argument) {
        Some(ConstValue::String(value)) => Ok(value),
        _ => Err(invalid_argument(directive, argument, coordinate, "a string")),
    }
}

/// Empty directive chain.
pub struct DirectivesNil;

impl DirectivesNil {
    pub const fn with<D>(self, directive: D) -> DirectivesCons<D, Self> {
        DirectivesCons(directive, self)
    }
}

/// A directive followed by the ones registered before it.
pub struct DirectivesCons<A, B>(A, B);

impl<A, B> DirectivesCons<A, B> {
    pub const fn with<D>(self, directive: D) -> DirectivesCons<D, Self> {
        DirectivesCons(directive, self)
    }
}

impl SchemaDirective for DirectivesNil {
    fn transform(&mut self, schema: Schema) -> Result<Schema, Error> {
        Ok(schema)
    }
}

impl<A, B> SchemaDirective for DirectivesCons<A, B>
where
    A: SchemaDirective,
    B: SchemaDirective,
{
    fn type_defs(&self) -> String {
        let rest = self.1.type_defs();

        if rest.is_empty() {
            self.0.type_defs()
        } else {
            format!("{rest}\n{}", self.0.type_defs())
        }
    }

    fn transform(&mut self, schema: Schema) -> Result<Schema, Error> {
        let schema = self.1.transform(schema)?;
        self.0.transform(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    /// Records the coordinates it visits.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
        tag: &'static str,
    }

    impl SchemaDirective for Recorder {
        fn type_defs(&self) -> String {
            format!("directive @{} on FIELD_DEFINITION", self.tag)
        }

        fn enter_field(
            &mut self,
            _ctx: &mut TransformContext<'_>,
            parent_type: &str,
            field: &mut FieldConfig,
        ) -> Result<(), Error> {
            self.seen.push(format!("{parent_type}.{}", field.name));
            field.description = Some(format!("{}{}", field.description.take().unwrap_or_default(), self.tag));
            Ok(())
        }

        fn enter_input_field(
            &mut self,
            _ctx: &mut TransformContext<'_>,
            parent_type: &str,
            field: &mut InputFieldConfig,
        ) -> Result<(), Error> {
            self.seen.push(format!("input {parent_type}.{}", field.name));
            Ok(())
        }
    }

    fn schema() -> Schema {
        Schema::parse(indoc! {r#"
            input UserWhere { name: String }
            type User { name: String }
            type Query { users(where: UserWhere): [User] }
        "#})
        .unwrap()
    }

    #[test]
    fn visits_every_field_and_restores_them() {
        let mut recorder = Recorder {
            tag: "a",
            ..Default::default()
        };

        let schema = recorder.transform(schema()).unwrap();

        assert_eq!(recorder.seen, vec!["input UserWhere.name", "User.name", "Query.users"]);
        assert_eq!(schema.object("User").unwrap().fields.len(), 1);
        assert_eq!(schema.input_object("UserWhere").unwrap().fields.len(), 1);
    }

    #[test]
    fn chains_apply_in_registration_order() {
        let mut chain = DirectivesNil
            .with(Recorder {
                tag: "a",
                ..Default::default()
            })
            .with(Recorder {
                tag: "b",
                ..Default::default()
            });

        assert_eq!(
            chain.type_defs(),
            "directive @a on FIELD_DEFINITION\ndirective @b on FIELD_DEFINITION"
        );

        let schema = chain.transform(schema()).unwrap();
        let name = schema.field("User", "name").unwrap();
        assert_eq!(name.description.as_deref(), Some("ab"));
    }

    #[test]
    fn field_scalar_resolution() {
        let mut schema = Schema::parse(indoc! {r#"
            type User { name: String }
            type Query { user: User }
        "#})
        .unwrap();
        let ctx = TransformContext { schema: &mut schema };

        let scalar = ctx
            .field_scalar("length", "User.name", &TypeRef::NonNull(Box::new(TypeRef::named("String"))))
            .unwrap();
        assert_eq!(scalar.name(), "String");

        let error = ctx
            .field_scalar("length", "Query.user", &TypeRef::named("User"))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "@length cannot be applied to Query.user: not a scalar type: User"
        );

        let list = TypeRef::List(Box::new(TypeRef::named("String")));
        assert!(ctx.field_scalar("length", "User.names", &list).is_err());
    }
}
