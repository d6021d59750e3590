use std::fmt::Write;

use super::{
    DirectiveDefinition, DirectiveUsage, InputFieldConfig, Schema, TypeDefinition, DEFAULT_MUTATION_TYPE,
    DEFAULT_QUERY_TYPE,
};

impl Schema {
    /// Renders the schema back to SDL. Built-in scalars are left out, wrapped
    /// scalars show up as the custom scalars they are.
    pub fn sdl(&self) -> String {
        let mut out = String::new();

        let custom_roots = self.query_type != DEFAULT_QUERY_TYPE
            || self
                .mutation_type
                .as_deref()
                .is_some_and(|mutation| mutation != DEFAULT_MUTATION_TYPE);

        if custom_roots {
            out.push_str("schema {\n");
            writeln!(out, "  query: {}", self.query_type).ok();
            if let Some(mutation) = &self.mutation_type {
                writeln!(out, "  mutation: {mutation}").ok();
            }
            out.push_str("}\n\n");
        }

        for directive in self.directives.values() {
            write_directive_definition(&mut out, directive);
        }

        for definition in self.types.values() {
            match definition {
                TypeDefinition::Scalar(scalar) if scalar.is_builtin() => continue,
                TypeDefinition::Scalar(scalar) => {
                    write_description(&mut out, scalar.description(), "");
                    writeln!(out, "scalar {}", scalar.name()).ok();
                }
                TypeDefinition::Enum(enum_type) => {
                    write_description(&mut out, enum_type.description.as_deref(), "");
                    writeln!(out, "enum {} {{", enum_type.name).ok();
                    for value in &enum_type.values {
                        writeln!(out, "  {value}").ok();
                    }
                    out.push_str("}\n");
                }
                TypeDefinition::InputObject(input) => {
                    write_description(&mut out, input.description.as_deref(), "");
                    writeln!(out, "input {} {{", input.name).ok();
                    for field in input.fields.values() {
                        write_description(&mut out, field.description.as_deref(), "  ");
                        out.push_str("  ");
                        write_input_value(&mut out, field);
                        out.push('\n');
                    }
                    out.push_str("}\n");
                }
                TypeDefinition::Object(object) => {
                    write_description(&mut out, object.description.as_deref(), "");
                    writeln!(out, "type {} {{", object.name).ok();
                    for field in object.fields.values() {
                        write_description(&mut out, field.description.as_deref(), "  ");
                        write!(out, "  {}", field.name).ok();
                        write_arguments(&mut out, field.arguments.values());
                        write!(out, ": {}", field.ty).ok();
                        write_directive_usages(&mut out, &field.directives);
                        out.push('\n');
                    }
                    out.push_str("}\n");
                }
            }

            out.push('\n');
        }

        let trimmed_len = out.trim_end().len();
        out.truncate(trimmed_len);
        out.push('\n');
        out
    }
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) {
    if let Some(description) = description {
        let quoted = serde_json::Value::String(description.to_string());
        writeln!(out, "{indent}{quoted}").ok();
    }
}

fn write_input_value(out: &mut String, value: &InputFieldConfig) {
    write!(out, "{}: {}", value.name, value.ty).ok();

    if let Some(default_value) = &value.default_value {
        write!(out, " = {default_value}").ok();
    }

    write_directive_usages(out, &value.directives);
}

fn write_arguments<'a>(out: &mut String, arguments: impl Iterator<Item = &'a InputFieldConfig>) {
    let mut arguments = arguments.peekable();
    if arguments.peek().is_none() {
        return;
    }

    out.push('(');
    for (idx, argument) in arguments.enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_input_value(out, argument);
    }
    out.push(')');
}

fn write_directive_usages(out: &mut String, directives: &[DirectiveUsage]) {
    for directive in directives {
        write!(out, " {directive}").ok();
    }
}

fn write_directive_definition(out: &mut String, directive: &DirectiveDefinition) {
    write_description(out, directive.description.as_deref(), "");
    write!(out, "directive @{}", directive.name).ok();
    write_arguments(out, directive.arguments.values());

    let locations = directive
        .locations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ");

    writeln!(out, " on {locations}\n").ok();
}
