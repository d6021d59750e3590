//! Turns a [`Schema`] into an `async-graphql` dynamic schema.
//!
//! Object fields run their [`Resolver`] and then complete the returned JSON
//! against the declared field type. Scalars are serialized through their
//! [`ScalarType`] at that point, which is where wrapped scalars reject values.
//! Any failure becomes an error on the field, not on the whole request.

use std::{collections::HashMap, sync::Arc};

use async_graphql::{
    dynamic::{
        self, Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ResolverContext, Scalar,
    },
    Name, Value as GqlValue,
};
use serde_json::{Map, Value};

use crate::{
    resolver::{FieldInfo, RequestContext, ResolveParams, Resolver},
    scalar::ScalarType,
    schema::{EnumType, FieldConfig, InputFieldConfig, InputObjectType, ObjectType, Schema, TypeDefinition, TypeRef},
    Error,
};

#[derive(Clone, Copy, Debug)]
pub struct ExecutableOptions {
    /// Answer `__schema` and `__type` queries.
    pub introspection: bool,
}

impl Default for ExecutableOptions {
    fn default() -> Self {
        Self { introspection: true }
    }
}

enum OutputKind {
    Scalar(Arc<ScalarType>),
    Enum,
    Object,
}

/// Shared by every field resolver of one executable schema.
struct Outputs {
    kinds: HashMap<String, OutputKind>,
    root: Value,
}

struct FieldPlan {
    info: FieldInfo,
    ty: TypeRef,
    resolver: Resolver,
    outputs: Arc<Outputs>,
}

impl Schema {
    /// Builds the executable schema. `root` is the source value of the root
    /// operation types' fields.
    pub fn into_executable(self, root: Value) -> Result<dynamic::Schema, Error> {
        self.into_executable_with(root, ExecutableOptions::default())
    }

    pub fn into_executable_with(self, root: Value, options: ExecutableOptions) -> Result<dynamic::Schema, Error> {
        let kinds = self
            .types
            .iter()
            .filter_map(|(name, definition)| {
                let kind = match definition {
                    TypeDefinition::Scalar(scalar) => OutputKind::Scalar(scalar.clone()),
                    TypeDefinition::Enum(_) => OutputKind::Enum,
                    TypeDefinition::Object(_) => OutputKind::Object,
                    TypeDefinition::InputObject(_) => return None,
                };
                Some((name.clone(), kind))
            })
            .collect();
        let outputs = Arc::new(Outputs { kinds, root });

        let mut builder = dynamic::Schema::build(&self.query_type, self.mutation_type.as_deref(), None);
        let type_count = self.types.len();

        for definition in self.types.into_values() {
            builder = match definition {
                // registered by async-graphql itself
                TypeDefinition::Scalar(scalar) if scalar.is_builtin() => builder,
                TypeDefinition::Scalar(scalar) => builder.register(scalar_type(scalar)),
                TypeDefinition::Enum(enum_type) => builder.register(enum_definition(enum_type)),
                TypeDefinition::InputObject(input) => builder.register(input_object(input)),
                TypeDefinition::Object(object) => builder.register(object_type(object, &outputs)),
            };
        }

        if !options.introspection {
            builder = builder.disable_introspection();
        }

        let schema = builder.finish()?;
        tracing::debug!(types = type_count, introspection = options.introspection, "built executable schema");

        Ok(schema)
    }
}

fn type_ref(ty: &TypeRef) -> dynamic::TypeRef {
    match ty {
        TypeRef::Named(name) => dynamic::TypeRef::named(name.clone()),
        TypeRef::NonNull(inner) => dynamic::TypeRef::NonNull(Box::new(type_ref(inner))),
        TypeRef::List(inner) => dynamic::TypeRef::List(Box::new(type_ref(inner))),
    }
}

fn scalar_type(scalar: Arc<ScalarType>) -> Scalar {
    let mut ty = Scalar::new(scalar.name());
    if let Some(description) = scalar.description() {
        ty = ty.description(description);
    }

    ty.validator(move |value: &GqlValue| {
        value
            .clone()
            .into_json()
            .is_ok_and(|value| scalar.parse_value(value).is_ok())
    })
}

fn enum_definition(enum_type: EnumType) -> Enum {
    let mut ty = Enum::new(enum_type.name);
    if let Some(description) = enum_type.description {
        ty = ty.description(description);
    }

    for value in enum_type.values {
        ty = ty.item(EnumItem::new(value));
    }

    ty
}

fn input_value(config: InputFieldConfig) -> InputValue {
    let mut value = InputValue::new(config.name, type_ref(&config.ty));
    if let Some(description) = config.description {
        value = value.description(description);
    }
    if let Some(default_value) = config.default_value {
        value = value.default_value(default_value);
    }

    value
}

fn input_object(input: InputObjectType) -> InputObject {
    let mut ty = InputObject::new(input.name);
    if let Some(description) = input.description {
        ty = ty.description(description);
    }

    for field in input.fields.into_values() {
        ty = ty.field(input_value(field));
    }

    ty
}

fn object_type(object: ObjectType, outputs: &Arc<Outputs>) -> Object {
    let mut ty = Object::new(&object.name);
    if let Some(description) = object.description {
        ty = ty.description(description);
    }

    for field in object.fields.into_values() {
        ty = ty.field(output_field(&object.name, field, outputs));
    }

    ty
}

fn output_field(parent_type: &str, field: FieldConfig, outputs: &Arc<Outputs>) -> Field {
    let plan = Arc::new(FieldPlan {
        info: FieldInfo {
            parent_type: parent_type.to_string(),
            field_name: field.name.clone(),
        },
        ty: field.ty.clone(),
        resolver: field.resolver.unwrap_or_else(Resolver::default_field),
        outputs: outputs.clone(),
    });

    let mut output = Field::new(field.name, type_ref(&field.ty), move |ctx| {
        let plan = plan.clone();

        FieldFuture::new(async move {
            let params = resolve_params(&plan, &ctx);

            match resolve_field(&plan, params).await {
                Ok(value) => Ok(value),
                Err(error) => {
                    // the field resolves to null and the error carries its path
                    ctx.add_error(ctx.set_error_path(error.into_server_error(ctx.item.pos)));
                    Ok(None)
                }
            }
        })
    });

    if let Some(description) = field.description {
        output = output.description(description);
    }

    for argument in field.arguments.into_values() {
        output = output.argument(input_value(argument));
    }

    output
}

fn resolve_params(plan: &FieldPlan, ctx: &ResolverContext<'_>) -> Result<ResolveParams, Error> {
    // root fields have no parent object of their own
    let source = match ctx.parent_value.try_downcast_ref::<Value>() {
        Ok(value) => value.clone(),
        Err(_) => plan.outputs.root.clone(),
    };

    let args = ctx
        .args
        .as_index_map()
        .iter()
        .map(|(name, value)| Ok((name.to_string(), value.clone().into_json()?)))
        .collect::<Result<Map<String, Value>, Error>>()?;

    let context = ctx.ctx.data_opt::<RequestContext>().cloned().unwrap_or_default();

    Ok(ResolveParams {
        source,
        args,
        context,
        info: plan.info.clone(),
    })
}

async fn resolve_field<'a>(
    plan: &FieldPlan,
    params: Result<ResolveParams, Error>,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    let value = plan.resolver.resolve(params?).await?;
    let completed = complete_value(&plan.outputs, &plan.ty, value)?;

    Ok(completed)
}

fn complete_value<'a>(outputs: &Outputs, ty: &TypeRef, value: Value) -> Result<Option<FieldValue<'a>>, Error> {
    match (ty, value) {
        (TypeRef::NonNull(inner), value) => complete_value(outputs, inner, value),
        (_, Value::Null) => Ok(None),
        (TypeRef::List(inner), Value::Array(items)) => {
            let items = items
                .into_iter()
                .map(|item| Ok(complete_value(outputs, inner, item)?.unwrap_or(FieldValue::NULL)))
                .collect::<Result<Vec<_>, Error>>()?;

            Ok(Some(FieldValue::list(items)))
        }
        (TypeRef::List(_), value) => Err(unexpected("a list", &value)),
        (TypeRef::Named(name), value) => match outputs.kinds.get(name) {
            Some(OutputKind::Scalar(scalar)) => {
                let serialized = scalar.serialize(value)?;
                Ok(Some(FieldValue::value(GqlValue::from_json(serialized)?)))
            }
            Some(OutputKind::Enum) => match value {
                Value::String(item) => Ok(Some(FieldValue::value(GqlValue::Enum(Name::new(item))))),
                other => Err(unexpected(&format!("a {name} value"), &other)),
            },
            Some(OutputKind::Object) if value.is_object() => Ok(Some(FieldValue::owned_any(value))),
            Some(OutputKind::Object) => Err(unexpected(&format!("a {name} object"), &value)),
            None => Err(Error::UnknownType {
                name: name.clone(),
                coordinate: "a resolved value".to_string(),
            }),
        },
    }
}

fn unexpected(expected: &str, value: &Value) -> Error {
    Error::UnexpectedValue {
        expected: expected.to_string(),
        value: value.to_string(),
    }
}
