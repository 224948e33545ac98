use thiserror::Error;

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while parsing, resolving, or decoding against a schema.
/// All are fatal to the operation in progress; none are retried.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("array property \"{property}\" has no \"arrayType\" entry")]
    MissingArrayType { property: String },

    #[error(
        "no matching type definition found for type \"{type_name}\" in property \"{property}\""
    )]
    MissingTypeDefinition { type_name: String, property: String },

    #[error("no \"properties\" entry for type \"{type_name}\" in property \"{property}\"")]
    MalformedTypeDefinition { type_name: String, property: String },

    #[error("invalid type definition: arrayType \"{0}\" depends on itself")]
    CircularTypeDependency(String),

    #[error("property \"{property}\" expected a {expected} value, found {found}")]
    UnexpectedValue {
        property: String,
        expected: &'static str,
        found: String,
    },
}
