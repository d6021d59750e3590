use std::sync::Arc;

use async_graphql_parser::{
    types::{
        self as ast, BaseType, ConstDirective, FieldDefinition, InputValueDefinition, TypeKind, TypeSystemDefinition,
    },
    Positioned,
};
use indexmap::IndexMap;

use super::{
    DirectiveDefinition, DirectiveLocation, DirectiveUsage, EnumType, FieldConfig, InputFieldConfig, InputObjectType,
    ObjectType, Schema, TypeDefinition, TypeRef, DEFAULT_MUTATION_TYPE, DEFAULT_QUERY_TYPE,
};
use crate::{
    scalar::{ScalarType, BUILTIN_SCALARS},
    Error,
};

impl Schema {
    /// Parses SDL into a schema.
    ///
    /// `extend type` blocks are merged into their base definition. Directives
    /// that are declared in the document are checked against their declared
    /// locations, the others are kept as plain annotations.
    pub fn parse(sdl: &str) -> Result<Schema, Error> {
        let document = async_graphql_parser::parse_schema(sdl)?;

        let mut types = IndexMap::new();
        for name in BUILTIN_SCALARS {
            if let Some(scalar) = ScalarType::builtin(name) {
                types.insert(name.to_string(), TypeDefinition::Scalar(Arc::new(scalar)));
            }
        }

        let mut schema = Schema {
            query_type: DEFAULT_QUERY_TYPE.to_string(),
            mutation_type: None,
            types,
            directives: IndexMap::new(),
        };

        let mut explicit_mutation = None;
        let mut extensions = Vec::new();

        for definition in &document.definitions {
            match definition {
                TypeSystemDefinition::Schema(definition) => {
                    let definition = &definition.node;

                    if let Some(query) = &definition.query {
                        schema.query_type = query.node.to_string();
                    }
                    if let Some(mutation) = &definition.mutation {
                        explicit_mutation = Some(mutation.node.to_string());
                    }
                    if let Some(subscription) = &definition.subscription {
                        return Err(Error::UnsupportedDefinition {
                            kind: "subscription",
                            name: subscription.node.to_string(),
                        });
                    }
                }
                TypeSystemDefinition::Directive(definition) => {
                    let definition = convert_directive_definition(&definition.node)?;
                    schema.directives.insert(definition.name.clone(), definition);
                }
                TypeSystemDefinition::Type(definition) if definition.node.extend => {
                    extensions.push(&definition.node);
                }
                TypeSystemDefinition::Type(definition) => {
                    let definition = convert_type_definition(&definition.node)?;
                    let name = definition.name().to_string();

                    if schema.types.contains_key(&name) {
                        return Err(Error::DuplicateType { name });
                    }
                    schema.types.insert(name, definition);
                }
            }
        }

        for extension in extensions {
            schema.extend_type(extension)?;
        }

        schema.mutation_type = match explicit_mutation {
            Some(mutation) => Some(mutation),
            None => schema
                .types
                .contains_key(DEFAULT_MUTATION_TYPE)
                .then(|| DEFAULT_MUTATION_TYPE.to_string()),
        };

        schema.validate()?;

        Ok(schema)
    }

    fn extend_type(&mut self, extension: &ast::TypeDefinition) -> Result<(), Error> {
        let name = extension.name.node.as_str();
        let extension_kind = convert_type_definition(extension)?;

        match (self.types.get_mut(name), extension_kind) {
            (Some(TypeDefinition::Object(object)), TypeDefinition::Object(extension)) => {
                object.fields.extend(extension.fields);
            }
            (Some(TypeDefinition::InputObject(input)), TypeDefinition::InputObject(extension)) => {
                input.fields.extend(extension.fields);
            }
            (Some(TypeDefinition::Enum(enum_type)), TypeDefinition::Enum(extension)) => {
                enum_type.values.extend(extension.values);
            }
            (Some(TypeDefinition::Scalar(_)), TypeDefinition::Scalar(_)) => {}
            (Some(_), _) => {
                return Err(Error::UnsupportedDefinition {
                    kind: "extension of a different kind for type",
                    name: name.to_string(),
                })
            }
            (None, _) => {
                return Err(Error::UnknownType {
                    name: name.to_string(),
                    coordinate: format!("extend type {name}"),
                })
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), Error> {
        if self.object(&self.query_type).is_none() {
            return Err(Error::UnknownType {
                name: self.query_type.clone(),
                coordinate: "the schema query root".to_string(),
            });
        }

        if let Some(mutation) = &self.mutation_type {
            if self.object(mutation).is_none() {
                return Err(Error::UnknownType {
                    name: mutation.clone(),
                    coordinate: "the schema mutation root".to_string(),
                });
            }
        }

        for definition in self.types.values() {
            match definition {
                TypeDefinition::Object(object) => {
                    for field in object.fields.values() {
                        let coordinate = format!("{}.{}", object.name, field.name);
                        self.check_type_ref(&field.ty, &coordinate, false)?;
                        self.check_directives(&field.directives, DirectiveLocation::FieldDefinition, &coordinate)?;

                        for argument in field.arguments.values() {
                            let coordinate = format!("{coordinate}({}:)", argument.name);
                            self.check_type_ref(&argument.ty, &coordinate, true)?;
                            self.check_directives(
                                &argument.directives,
                                DirectiveLocation::ArgumentDefinition,
                                &coordinate,
                            )?;
                        }
                    }
                }
                TypeDefinition::InputObject(input) => {
                    for field in input.fields.values() {
                        let coordinate = format!("{}.{}", input.name, field.name);
                        self.check_type_ref(&field.ty, &coordinate, true)?;
                        self.check_directives(
                            &field.directives,
                            DirectiveLocation::InputFieldDefinition,
                            &coordinate,
                        )?;
                    }
                }
                TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
            }
        }

        for directive in self.directives.values() {
            for argument in directive.arguments.values() {
                let coordinate = format!("@{}({}:)", directive.name, argument.name);
                self.check_type_ref(&argument.ty, &coordinate, true)?;
            }
        }

        Ok(())
    }

    fn check_type_ref(&self, ty: &TypeRef, coordinate: &str, input: bool) -> Result<(), Error> {
        let name = ty.named_type();

        let known = match self.types.get(name) {
            Some(definition) if input => definition.is_input_type(),
            Some(definition) => definition.is_output_type(),
            None => false,
        };

        if known {
            Ok(())
        } else {
            Err(Error::UnknownType {
                name: name.to_string(),
                coordinate: coordinate.to_string(),
            })
        }
    }

    fn check_directives(
        &self,
        directives: &[DirectiveUsage],
        location: DirectiveLocation,
        coordinate: &str,
    ) -> Result<(), Error> {
        for usage in directives {
            let Some(definition) = self.directives.get(&usage.name) else {
                continue;
            };

            if !definition.locations.contains(&location) {
                return Err(Error::MisplacedDirective {
                    directive: usage.name.clone(),
                    location: location.to_string(),
                    coordinate: coordinate.to_string(),
                });
            }
        }

        Ok(())
    }
}

fn convert_type_definition(definition: &ast::TypeDefinition) -> Result<TypeDefinition, Error> {
    let name = definition.name.node.to_string();
    let description = definition.description.as_ref().map(|d| d.node.clone());

    let converted = match &definition.kind {
        TypeKind::Scalar => {
            let scalar = ScalarType::custom(name);
            let scalar = match description {
                Some(description) => scalar.with_description(description),
                None => scalar,
            };

            TypeDefinition::Scalar(Arc::new(scalar))
        }
        TypeKind::Object(object) => TypeDefinition::Object(ObjectType {
            fields: object
                .fields
                .iter()
                .map(|field| convert_field(&field.node).map(|field| (field.name.clone(), field)))
                .collect::<Result<_, _>>()?,
            name,
            description,
        }),
        TypeKind::InputObject(input) => TypeDefinition::InputObject(InputObjectType {
            fields: convert_input_values(&input.fields)?,
            name,
            description,
        }),
        TypeKind::Enum(enum_type) => TypeDefinition::Enum(EnumType {
            values: enum_type
                .values
                .iter()
                .map(|value| value.node.value.node.to_string())
                .collect(),
            name,
            description,
        }),
        TypeKind::Interface(_) => {
            return Err(Error::UnsupportedDefinition {
                kind: "interface",
                name,
            })
        }
        TypeKind::Union(_) => return Err(Error::UnsupportedDefinition { kind: "union", name }),
    };

    Ok(converted)
}

fn convert_field(field: &FieldDefinition) -> Result<FieldConfig, Error> {
    Ok(FieldConfig {
        name: field.name.node.to_string(),
        description: field.description.as_ref().map(|d| d.node.clone()),
        ty: convert_type(&field.ty.node),
        arguments: convert_input_values(&field.arguments)?,
        directives: convert_directives(&field.directives),
        resolver: None,
    })
}

fn convert_input_values(
    values: &[Positioned<InputValueDefinition>],
) -> Result<IndexMap<String, InputFieldConfig>, Error> {
    values
        .iter()
        .map(|value| {
            let value = &value.node;
            let config = InputFieldConfig {
                name: value.name.node.to_string(),
                description: value.description.as_ref().map(|d| d.node.clone()),
                ty: convert_type(&value.ty.node),
                default_value: value.default_value.as_ref().map(|v| v.node.clone()),
                directives: convert_directives(&value.directives),
            };

            Ok((config.name.clone(), config))
        })
        .collect()
}

fn convert_type(ty: &ast::Type) -> TypeRef {
    let base = match &ty.base {
        BaseType::Named(name) => TypeRef::Named(name.to_string()),
        BaseType::List(inner) => TypeRef::List(Box::new(convert_type(inner))),
    };

    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn convert_directives(directives: &[Positioned<ConstDirective>]) -> Vec<DirectiveUsage> {
    directives
        .iter()
        .map(|directive| DirectiveUsage {
            name: directive.node.name.node.to_string(),
            arguments: directive
                .node
                .arguments
                .iter()
                .map(|(name, value)| (name.node.to_string(), value.node.clone()))
                .collect(),
        })
        .collect()
}

fn convert_directive_definition(definition: &ast::DirectiveDefinition) -> Result<DirectiveDefinition, Error> {
    Ok(DirectiveDefinition {
        name: definition.name.node.to_string(),
        description: definition.description.as_ref().map(|d| d.node.clone()),
        arguments: convert_input_values(&definition.arguments)?,
        locations: definition
            .locations
            .iter()
            .map(|location| DirectiveLocation::from(&location.node))
            .collect(),
    })
}

impl From<&ast::DirectiveLocation> for DirectiveLocation {
    fn from(location: &ast::DirectiveLocation) -> Self {
        match location {
            ast::DirectiveLocation::Query => DirectiveLocation::Query,
            ast::DirectiveLocation::Mutation => DirectiveLocation::Mutation,
            ast::DirectiveLocation::Subscription => DirectiveLocation::Subscription,
            ast::DirectiveLocation::Field => DirectiveLocation::Field,
            ast::DirectiveLocation::FragmentDefinition => DirectiveLocation::FragmentDefinition,
            ast::DirectiveLocation::FragmentSpread => DirectiveLocation::FragmentSpread,
            ast::DirectiveLocation::InlineFragment => DirectiveLocation::InlineFragment,
            ast::DirectiveLocation::VariableDefinition => DirectiveLocation::VariableDefinition,
            ast::DirectiveLocation::Schema => DirectiveLocation::Schema,
            ast::DirectiveLocation::Scalar => DirectiveLocation::Scalar,
            ast::DirectiveLocation::Object => DirectiveLocation::Object,
            ast::DirectiveLocation::FieldDefinition => DirectiveLocation::FieldDefinition,
            ast::DirectiveLocation::ArgumentDefinition => DirectiveLocation::ArgumentDefinition,
            ast::DirectiveLocation::Interface => DirectiveLocation::Interface,
            ast::DirectiveLocation::Union => DirectiveLocation::Union,
            ast::DirectiveLocation::Enum => DirectiveLocation::Enum,
            ast::DirectiveLocation::EnumValue => DirectiveLocation::EnumValue,
            ast::DirectiveLocation::InputObject => DirectiveLocation::InputObject,
            ast::DirectiveLocation::InputFieldDefinition => DirectiveLocation::InputFieldDefinition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql_value::ConstValue;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_objects_inputs_and_enums() {
        let schema = Schema::parse(indoc! {r#"
            scalar DateTime

            enum Category { UNIT INTEGRATION }

            type Requirement {
              "The requirement title"
              title: String!
              createdAt: DateTime!
              children: [Requirement!]!
            }

            input RequirementWhere {
              title: String = "x"
              category: Category
            }

            type Query {
              requirements(where: RequirementWhere): [Requirement!]!
            }
        "#})
        .unwrap();

        assert_eq!(schema.query_type(), "Query");
        assert_eq!(schema.mutation_type(), None);

        let title = schema.field("Requirement", "title").unwrap();
        assert_eq!(title.ty.to_string(), "String!");
        assert_eq!(title.description.as_deref(), Some("The requirement title"));

        let requirements = schema.field("Query", "requirements").unwrap();
        assert_eq!(requirements.ty.to_string(), "[Requirement!]!");
        assert_eq!(requirements.arguments["where"].ty.to_string(), "RequirementWhere");

        let input = schema.input_object("RequirementWhere").unwrap();
        assert_eq!(input.fields["title"].default_value, Some(ConstValue::String("x".to_string())));

        assert!(schema.scalar("DateTime").is_some());
        assert!(schema.scalar("String").unwrap().is_builtin());
    }

    #[test]
    fn merges_type_extensions() {
        let schema = Schema::parse(indoc! {r#"
            extend type Query {
              users: [String]
            }

            type Query {
              requirements: [String]
            }

            type Mutation {
              deleteUsers: Int
            }
        "#})
        .unwrap();

        let query = schema.object("Query").unwrap();
        assert_eq!(query.fields.keys().collect::<Vec<_>>(), vec!["requirements", "users"]);
        assert_eq!(schema.mutation_type(), Some("Mutation"));
    }

    #[test]
    fn explicit_root_types() {
        let schema = Schema::parse(indoc! {r#"
            schema { query: Root mutation: Change }
            type Root { a: Int }
            type Change { b: Int }
        "#})
        .unwrap();

        assert_eq!(schema.query_type(), "Root");
        assert_eq!(schema.mutation_type(), Some("Change"));
    }

    #[test]
    fn unknown_types_are_rejected() {
        let error = Schema::parse("type Query { user: User }").unwrap_err();

        assert_eq!(error.to_string(), "Unknown type `User` referenced by Query.user");
    }

    #[test]
    fn output_types_cannot_be_used_as_input() {
        let error = Schema::parse(indoc! {r#"
            type User { name: String }
            type Query { users(where: User): [User] }
        "#})
        .unwrap_err();

        assert_eq!(error.to_string(), "Unknown type `User` referenced by Query.users(where:)");
    }

    #[test]
    fn interfaces_are_not_supported() {
        let error = Schema::parse(indoc! {r#"
            interface Node { id: ID! }
            type Query { node: Node }
        "#})
        .unwrap_err();

        assert_eq!(error.to_string(), "interface `Node` is not supported");
    }

    #[test]
    fn declared_directives_are_checked_against_their_locations() {
        let error = Schema::parse(indoc! {r#"
            directive @uppercase on FIELD_DEFINITION

            input UserInput { name: String @uppercase }
            type Query { user(input: UserInput): String }
        "#})
        .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Directive @uppercase is not allowed on INPUT_FIELD_DEFINITION (UserInput.name)"
        );
    }

    #[test]
    fn undeclared_directives_are_kept_as_annotations() {
        let schema = Schema::parse(indoc! {r#"
            type Requirement {
              id: ID! @id
              parent: Requirement @relationship(type: "CHILD_OF", direction: OUT)
            }
            type Query { requirements: [Requirement!]! }
        "#})
        .unwrap();

        let parent = schema.field("Requirement", "parent").unwrap();
        assert_eq!(
            parent.directive("relationship").unwrap().to_string(),
            r#"@relationship(type: "CHILD_OF", direction: OUT)"#
        );
    }

    #[test]
    fn duplicate_types_are_rejected() {
        let error = Schema::parse(indoc! {r#"
            type Query { a: Int }
            type Query { b: Int }
        "#})
        .unwrap_err();

        assert_eq!(error.to_string(), "Type `Query` is defined more than once");
    }
}
