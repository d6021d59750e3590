//! A mutable, in-memory GraphQL schema.
//!
//! [`Schema::parse`] turns SDL into this model, directives rewrite it, and
//! [`Schema::into_executable`](crate::Schema::into_executable) turns it into
//! something that can answer requests.

mod parse;
mod sdl;

use std::{fmt, sync::Arc};

use async_graphql_value::ConstValue;
use indexmap::IndexMap;

use crate::{resolver::Resolver, scalar::ScalarType, Error};

pub const DEFAULT_QUERY_TYPE: &str = "Query";
pub const DEFAULT_MUTATION_TYPE: &str = "Mutation";

#[derive(Clone, Debug)]
pub struct Schema {
    pub(crate) query_type: String,
    pub(crate) mutation_type: Option<String>,
    pub(crate) types: IndexMap<String, TypeDefinition>,
    pub(crate) directives: IndexMap<String, DirectiveDefinition>,
}

#[derive(Clone, Debug)]
pub enum TypeDefinition {
    Scalar(Arc<ScalarType>),
    Object(ObjectType),
    InputObject(InputObjectType),
    Enum(EnumType),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(scalar) => scalar.name(),
            TypeDefinition::Object(object) => &object.name,
            TypeDefinition::InputObject(input) => &input.name,
            TypeDefinition::Enum(enum_type) => &enum_type.name,
        }
    }

    pub fn is_input_type(&self) -> bool {
        !matches!(self, TypeDefinition::Object(_))
    }

    pub fn is_output_type(&self) -> bool {
        !matches!(self, TypeDefinition::InputObject(_))
    }
}

#[derive(Clone, Debug)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldConfig>,
}

#[derive(Clone, Debug)]
pub struct FieldConfig {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub arguments: IndexMap<String, InputFieldConfig>,
    pub directives: Vec<DirectiveUsage>,
    /// `None` resolves the field by reading it from the parent value.
    pub resolver: Option<Resolver>,
}

impl FieldConfig {
    pub fn directive(&self, name: &str) -> Option<&DirectiveUsage> {
        get_directive(&self.directives, name)
    }
}

#[derive(Clone, Debug)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputFieldConfig>,
}

/// An input object field or a field argument.
#[derive(Clone, Debug)]
pub struct InputFieldConfig {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub default_value: Option<ConstValue>,
    pub directives: Vec<DirectiveUsage>,
}

impl InputFieldConfig {
    pub fn directive(&self, name: &str) -> Option<&DirectiveUsage> {
        get_directive(&self.directives, name)
    }
}

#[derive(Clone, Debug)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// The innermost type name, stripped of list and non-null wrappers.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::NonNull(inner) | TypeRef::List(inner) => inner.named_type(),
        }
    }

    /// Replaces the innermost type name and keeps the wrappers around it.
    #[must_use]
    pub fn with_named_type(&self, name: &str) -> Self {
        match self {
            TypeRef::Named(_) => TypeRef::Named(name.to_string()),
            TypeRef::NonNull(inner) => TypeRef::NonNull(Box::new(inner.with_named_type(name))),
            TypeRef::List(inner) => TypeRef::List(Box::new(inner.with_named_type(name))),
        }
    }

    /// The named type if this is `T` or `T!`. Lists return `None`.
    pub fn nullable_named(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            TypeRef::NonNull(inner) => match inner.as_ref() {
                TypeRef::Named(name) => Some(name),
                _ => None,
            },
            TypeRef::List(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// A directive applied somewhere in the schema, e.g. `@length(max: 5)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveUsage {
    pub name: String,
    pub arguments: IndexMap<String, ConstValue>,
}

impl DirectiveUsage {
    pub fn argument(&self, name: &str) -> Option<&ConstValue> {
        self.arguments.get(name)
    }
}

impl fmt::Display for DirectiveUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;

        if !self.arguments.is_empty() {
            f.write_str("(")?;
            for (idx, (name, value)) in self.arguments.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: {value}")?;
            }
            f.write_str(")")?;
        }

        Ok(())
    }
}

/// The first usage of the directive called `name`.
pub fn get_directive<'a>(directives: &'a [DirectiveUsage], name: &str) -> Option<&'a DirectiveUsage> {
    directives.iter().find(|directive| directive.name == name)
}

#[derive(Clone, Debug)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputFieldConfig>,
    pub locations: Vec<DirectiveLocation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl Schema {
    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<&Arc<ScalarType>> {
        match self.types.get(name) {
            Some(TypeDefinition::Scalar(scalar)) => Some(scalar),
            _ => None,
        }
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        match self.types.get(name) {
            Some(TypeDefinition::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn input_object(&self, name: &str) -> Option<&InputObjectType> {
        match self.types.get(name) {
            Some(TypeDefinition::InputObject(input)) => Some(input),
            _ => None,
        }
    }

    pub fn directive_definition(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    /// Object field by type and field name.
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldConfig> {
        self.object(type_name).and_then(|object| object.fields.get(field_name))
    }

    /// Adds a scalar. Registering the same scalar again is a no-op; any other
    /// type already holding its name is a [`Error::DuplicateType`].
    pub fn register_scalar(&mut self, scalar: Arc<ScalarType>) -> Result<(), Error> {
        match self.types.get(scalar.name()) {
            Some(TypeDefinition::Scalar(existing)) if Arc::ptr_eq(existing, &scalar) => Ok(()),
            Some(_) => Err(Error::DuplicateType {
                name: scalar.name().to_string(),
            }),
            None => {
                self.types
                    .insert(scalar.name().to_string(), TypeDefinition::Scalar(scalar));
                Ok(())
            }
        }
    }

    /// Attaches a resolver to an object field. Directives that wrap resolvers
    /// only see the ones attached before they run.
    pub fn set_resolver(&mut self, type_name: &str, field_name: &str, resolver: Resolver) -> Result<(), Error> {
        let field = match self.types.get_mut(type_name) {
            Some(TypeDefinition::Object(object)) => object.fields.get_mut(field_name),
            _ => None,
        };

        match field {
            Some(field) => {
                field.resolver = Some(resolver);
                Ok(())
            }
            None => Err(Error::UnknownField {
                coordinate: format!("{type_name}.{field_name}"),
            }),
        }
    }

    /// Builder flavour of [`Schema::set_resolver`].
    pub fn with_resolver(mut self, type_name: &str, field_name: &str, resolver: Resolver) -> Result<Self, Error> {
        self.set_resolver(type_name, field_name, resolver)?;
        Ok(self)
    }
}
