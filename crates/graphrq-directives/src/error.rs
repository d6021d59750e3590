/// Errors raised while building a schema or serializing a field value.
///
/// Variants up to `InvalidDirectiveArgument` are fatal at schema construction.
/// The serialization variants surface as field-level errors in a GraphQL response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The SDL could not be parsed
    #[error("{0}")]
    Parser(#[from] async_graphql_parser::Error),
    /// The SDL uses a construct this schema model does not handle
    #[error("{kind} `{name}` is not supported")]
    UnsupportedDefinition { kind: &'static str, name: String },
    /// A field, input field or argument references a type that is never defined
    #[error("Unknown type `{name}` referenced by {coordinate}")]
    UnknownType { name: String, coordinate: String },
    /// `set_resolver` names a field that does not exist
    #[error("Unknown field {coordinate}")]
    UnknownField { coordinate: String },
    /// A literal in the SDL cannot be represented as JSON
    #[error("invalid value: {0}")]
    Value(#[from] serde_json::Error),
    /// Two definitions share one name
    #[error("Type `{name}` is defined more than once")]
    DuplicateType { name: String },
    /// A declared directive is used at a location its declaration does not allow
    #[error("Directive @{directive} is not allowed on {location} ({coordinate})")]
    MisplacedDirective {
        directive: String,
        location: String,
        coordinate: String,
    },
    /// A directive was attached to a field whose type is not a scalar
    #[error("@{directive} cannot be applied to {coordinate}: not a scalar type: {ty}")]
    UnsupportedType {
        directive: String,
        coordinate: String,
        ty: String,
    },
    /// A directive argument is missing or of the wrong shape
    #[error("The @{directive} directive's `{argument}` argument on {coordinate} must be {expected}")]
    InvalidDirectiveArgument {
        directive: String,
        argument: &'static str,
        coordinate: String,
        expected: &'static str,
    },
    /// The string format directive names a format it does not know
    #[error("Format {format} is not supported")]
    UnsupportedFormat { format: String },
    /// A wrapped scalar for this base type and parameter was already built
    #[error("{name} already exists for type {base} and parameter {parameter}")]
    DuplicateWrappedType {
        name: String,
        base: String,
        parameter: String,
    },
    /// The serialized value is longer than the configured maximum
    #[error("expected max length: {max}; given length: {actual}")]
    LengthExceeded { max: u64, actual: u64 },
    /// The serialized value does not match the configured format
    #[error("Value {value} is not a valid {format}")]
    InvalidFormatValue { value: String, format: String },
    /// A value cannot be represented by a scalar type
    #[error("{scalar} cannot represent value: {value}")]
    InvalidScalarValue { scalar: String, value: String },
    /// A resolver produced a value that does not fit the field type
    #[error("Expected {expected}, found {value}")]
    UnexpectedValue { expected: String, value: String },
    /// A resolver failed
    #[error("{0}")]
    Resolver(String),
    /// The executable schema could not be built
    #[error("building executable schema: {0}")]
    Build(String),
}

impl Error {
    pub(crate) fn invalid_scalar_value(scalar: &str, value: &serde_json::Value) -> Self {
        Self::InvalidScalarValue {
            scalar: scalar.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<async_graphql::dynamic::SchemaError> for Error {
    fn from(value: async_graphql::dynamic::SchemaError) -> Self {
        Self::Build(value.to_string())
    }
}
