use thiserror::Error;

/// Errors that can occur during schema registration and resolution.
/// All of these indicate a build-time mistake; callers should treat them as
/// fatal at startup rather than recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema `{0}` is already registered")]
    DuplicateType(String),

    #[error("schema `{0}` is not registered")]
    UnknownType(String),

    #[error("schema `{type_name}` declares field `{field}` more than once in its flat layout")]
    FieldCollision { type_name: String, field: String },

    #[error("schema `{type_name}` flattens to {count} fields, more than ids can address")]
    TooManyFields { type_name: String, count: usize },
}
