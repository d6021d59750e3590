use std::sync::Arc;

use serde_json::Value;

use super::{
    cache::{CachePolicy, WrappedScalarCache},
    u64_argument, visit, SchemaDirective, TransformContext,
};
use crate::{
    scalar::ScalarType,
    schema::{DirectiveUsage, FieldConfig, InputFieldConfig, Schema, TypeRef},
    Error,
};

pub const LENGTH_DIRECTIVE: &str = "length";

pub const MAX_ARGUMENT: &str = "max";

/// `@length(max: Int)`: serializing a value longer than `max` characters
/// fails with [`Error::LengthExceeded`].
#[derive(Debug)]
pub struct LengthDirective {
    name: String,
    cache: WrappedScalarCache<u64>,
}

impl Default for LengthDirective {
    fn default() -> Self {
        Self::new(LENGTH_DIRECTIVE)
    }
}

impl LengthDirective {
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

    /// The length-checked variant of `base` built during the last transform.
    pub fn cached(&self, base: &str, max: u64) -> Option<&Arc<ScalarType>> {
        self.cache.get(base, &max)
    }

    fn limit(
        &mut self,
        ctx: &mut TransformContext<'_>,
        coordinate: &str,
        directive: &DirectiveUsage,
        ty: &TypeRef,
    ) -> Result<TypeRef, Error> {
        let max = u64_argument(directive, MAX_ARGUMENT, coordinate)?;
        let base = ctx.field_scalar(&self.name, coordinate, ty)?;

        let limited = self.cache.get_or_insert_with(&base, max, || {
            ScalarType::wrap(
                &base,
                format!("LimitedLength{}{max}", base.name()),
                format!("A {} with limited length", base.name()),
                move |value| check_length(value, max),
            )
        })?;

        tracing::debug!(%coordinate, scalar = limited.name(), max, "limiting length");

        let limited_ty = ty.with_named_type(limited.name());
        ctx.register_scalar(limited)?;

        Ok(limited_ty)
    }
}

fn check_length(value: Value, max: u64) -> Result<Value, Error> {
    if let Value::String(s) = &value {
        let actual = s.chars().count() as u64;
        if actual > max {
            return Err(Error::LengthExceeded { max, actual });
        }
    }

    Ok(value)
}

impl SchemaDirective for LengthDirective {
    fn type_defs(&self) -> String {
        format!(
            "directive @{}({MAX_ARGUMENT}: Int) on FIELD_DEFINITION | INPUT_FIELD_DEFINITION",
            self.name
        )
    }

    fn enter_field(
        &mut self,
        ctx: &mut TransformContext<'_>,
        parent_type: &str,
        field: &mut FieldConfig,
    ) -> Result<(), Error> {
        let Some(directive) = field.directive(&self.name).cloned() else {
            return Ok(());
        };

        let coordinate = format!("{parent_type}.{}", field.name);
        field.ty = self.limit(ctx, &coordinate, &directive, &field.ty)?;

        Ok(())
    }

    fn enter_input_field(
        &mut self,
        ctx: &mut TransformContext<'_>,
        parent_type: &str,
        field: &mut InputFieldConfig,
    ) -> Result<(), Error> {
        let Some(directive) = field.directive(&self.name).cloned() else {
            return Ok(());
        };

        let coordinate = format!("{parent_type}.{}", field.name);
        field.ty = self.limit(ctx, &coordinate, &directive, &field.ty)?;

        Ok(())
    }

    fn transform(&mut self, schema: Schema) -> Result<Schema, Error> {
        self.cache.clear();
        let schema = visit(self, schema)?;

        tracing::info!(directive = %self.name, wrapped = self.cache.len(), "applied length directive");

        Ok(schema)
    }
}
