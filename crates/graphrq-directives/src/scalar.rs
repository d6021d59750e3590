use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::Error;

pub const STRING: &str = "String";
pub const ID: &str = "ID";
pub const INT: &str = "Int";
pub const FLOAT: &str = "Float";
pub const BOOLEAN: &str = "Boolean";

pub const BUILTIN_SCALARS: [&str; 5] = [STRING, ID, INT, FLOAT, BOOLEAN];

/// Coerces one value, either on the way out (serialize) or on the way in (parse).
pub type CoerceFn = Arc<dyn Fn(Value) -> Result<Value, Error> + Send + Sync>;

/// A scalar type described by its coercion functions.
///
/// Wrapping a scalar builds a new instance around closures that call into the
/// base scalar, so a checked variant never needs a type of its own.
#[derive(Clone)]
pub struct ScalarType {
    name: String,
    description: Option<String>,
    builtin: bool,
    serialize: CoerceFn,
    parse_value: CoerceFn,
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("builtin", &self.builtin)
            .finish_non_exhaustive()
    }
}

impl ScalarType {
    pub fn new(name: impl Into<String>, serialize: CoerceFn, parse_value: CoerceFn) -> Self {
        Self {
            name: name.into(),
            description: None,
            builtin: false,
            serialize,
            parse_value,
        }
    }

    /// A scalar declared in SDL without any coercion rules: values pass through unchanged.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, coerce(Ok), coerce(Ok))
    }

    /// One of the five scalars every GraphQL schema contains.
    pub fn builtin(name: &str) -> Option<Self> {
        let (serialize, parse_value): (CoerceFn, CoerceFn) = match name {
            STRING => (coerce(serialize_string), coerce(parse_string)),
            ID => (coerce(serialize_id), coerce(serialize_id)),
            INT => (coerce(serialize_int), coerce(parse_int)),
            FLOAT => (coerce(serialize_float), coerce(parse_float)),
            BOOLEAN => (coerce(serialize_boolean), coerce(parse_boolean)),
            _ => return None,
        };

        Some(Self {
            name: name.to_string(),
            description: None,
            builtin: true,
            serialize,
            parse_value,
        })
    }

    /// Builds a variant of `base` whose serialization runs `check` on the
    /// base's output. Parsing is delegated to `base` unchanged.
    pub fn wrap<F>(base: &Arc<ScalarType>, name: impl Into<String>, description: impl Into<String>, check: F) -> Self
    where
        F: Fn(Value) -> Result<Value, Error> + Send + Sync + 'static,
    {
        let serialize_base = base.clone();
        let parse_base = base.clone();

        Self {
            name: name.into(),
            description: Some(description.into()),
            builtin: false,
            serialize: Arc::new(move |value| check(serialize_base.serialize(value)?)),
            parse_value: Arc::new(move |value| parse_base.parse_value(value)),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Output coercion.
    pub fn serialize(&self, value: Value) -> Result<Value, Error> {
        (self.serialize)(value)
    }

    /// Input coercion.
    pub fn parse_value(&self, value: Value) -> Result<Value, Error> {
        (self.parse_value)(value)
    }
}

fn coerce(f: fn(Value) -> Result<Value, Error>) -> CoerceFn {
    Arc::new(f)
}

fn serialize_string(value: Value) -> Result<Value, Error> {
    match value {
        Value::String(_) => Ok(value),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        Value::Number(ref n) => Ok(Value::String(n.to_string())),
        other => Err(Error::invalid_scalar_value(STRING, &other)),
    }
}

fn parse_string(value: Value) -> Result<Value, Error> {
    match value {
        Value::String(_) => Ok(value),
        other => Err(Error::invalid_scalar_value(STRING, &other)),
    }
}

fn serialize_id(value: Value) -> Result<Value, Error> {
    match value {
        Value::String(_) => Ok(value),
        Value::Number(ref n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
        other => Err(Error::invalid_scalar_value(ID, &other)),
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX))
                .map(|f| f as i32),
        },
        _ => None,
    }
}

fn serialize_int(value: Value) -> Result<Value, Error> {
    let int = match &value {
        Value::Bool(b) => Some(i32::from(*b)),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        other => as_i32(other),
    };

    int.map(Value::from)
        .ok_or_else(|| Error::invalid_scalar_value(INT, &value))
}

fn parse_int(value: Value) -> Result<Value, Error> {
    as_i32(&value)
        .map(Value::from)
        .ok_or_else(|| Error::invalid_scalar_value(INT, &value))
}

fn serialize_float(value: Value) -> Result<Value, Error> {
    let float = match &value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    };

    float
        .map(Value::from)
        .ok_or_else(|| Error::invalid_scalar_value(FLOAT, &value))
}

fn parse_float(value: Value) -> Result<Value, Error> {
    match value {
        Value::Number(ref n) => n
            .as_f64()
            .map(Value::from)
            .ok_or_else(|| Error::invalid_scalar_value(FLOAT, &value)),
        other => Err(Error::invalid_scalar_value(FLOAT, &other)),
    }
}

fn serialize_boolean(value: Value) -> Result<Value, Error> {
    match value {
        Value::Bool(_) => Ok(value),
        Value::Number(ref n) => n
            .as_f64()
            .map(|f| Value::Bool(f != 0.0))
            .ok_or_else(|| Error::invalid_scalar_value(BOOLEAN, &value)),
        other => Err(Error::invalid_scalar_value(BOOLEAN, &other)),
    }
}

fn parse_boolean(value: Value) -> Result<Value, Error> {
    match value {
        Value::Bool(_) => Ok(value),
        other => Err(Error::invalid_scalar_value(BOOLEAN, &other)),
    }
}
