use std::{str::FromStr, sync::OnceLock};

use regex::Regex;
use serde_json::Value;

use super::{
    cache::{CachePolicy, WrappedScalarCache},
    string_argument, visit, SchemaDirective, TransformContext,
};
use crate::{
    scalar::ScalarType,
    schema::{FieldConfig, Schema},
    Error,
};

pub const STRING_FORMAT_DIRECTIVE: &str = "stringFormat";

pub const FORMAT_ARGUMENT: &str = "format";

/// Formats understood by `@stringFormat`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StringFormat {
    Email,
}

impl StringFormat {
    /// Suffix of the wrapped scalar's name, e.g. `StringWithFormatEmail`.
    fn type_suffix(self) -> &'static str {
        match self {
            StringFormat::Email => "Email",
        }
    }

    pub fn is_valid(self, value: &str) -> bool {
        match self {
            StringFormat::Email => email_regex().is_match(value),
        }
    }

    fn check(self, value: Value) -> Result<Value, Error> {
        let valid = match &value {
            Value::String(s) => self.is_valid(s),
            _ => false,
        };

        if valid {
            return Ok(value);
        }

        let value = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };

        Err(Error::InvalidFormatValue {
            value,
            format: self.to_string(),
        })
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();

    EMAIL.get_or_init(|| {
        Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        )
        .expect("must be valid")
    })
}

/// `@stringFormat(format: String!)`: serializing a value that does not match
/// the format fails with [`Error::InvalidFormatValue`].
///
/// Unknown formats are reported while transforming, not on first use.
#[derive(Debug)]
pub struct StringFormatDirective {
    name: String,
    cache: WrappedScalarCache<StringFormat>,
}

impl Default for StringFormatDirective {
    fn default() -> Self {
        Self::new(STRING_FORMAT_DIRECTIVE)
    }
}

impl StringFormatDirective {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache: WrappedScalarCache::new(CachePolicy::default()),
        }
    }

    #[must_use]
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache = WrappedScalarCache::new(policy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SchemaDirective for StringFormatDirective {
    fn type_defs(&self) -> String {
        format!("directive @{}({FORMAT_ARGUMENT}: String!) on FIELD_DEFINITION", self.name)
    }

    fn enter_field(
        &mut self,
        ctx: &mut TransformContext<'_>,
        parent_type: &str,
        field: &mut FieldConfig,
    ) -> Result<(), Error> {
        let Some(directive) = field.directive(&self.name) else {
            return Ok(());
        };

        let coordinate = format!("{parent_type}.{}", field.name);
        let format = string_argument(directive, FORMAT_ARGUMENT, &coordinate)?;
        let format = StringFormat::from_str(format).map_err(|_| Error::UnsupportedFormat {
            format: format.to_string(),
        })?;
        let base = ctx.field_scalar(&self.name, &coordinate, &field.ty)?;

        let checked = self.cache.get_or_insert_with(&base, format, || {
            ScalarType::wrap(
                &base,
                format!("{}WithFormat{}", base.name(), format.type_suffix()),
                format!("A {} in {format} format", base.name()),
                move |value| format.check(value),
            )
        })?;

        tracing::debug!(%coordinate, scalar = checked.name(), %format, "checking string format");

        field.ty = field.ty.with_named_type(checked.name());
        ctx.register_scalar(checked)?;

        Ok(())
    }

    fn transform(&mut self, schema: Schema) -> Result<Schema, Error> {
        self.cache.clear();
        let schema = visit(self, schema)?;

        tracing::info!(directive = %self.name, wrapped = self.cache.len(), "applied string format directive");

        Ok(schema)
    }
}
