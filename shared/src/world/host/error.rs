use thiserror::Error;

use crate::types::FieldId;

/// Errors that can occur while encoding an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
    /// The slot handle no longer refers to a live entity
    #[error("cannot encode an update for a stale entity slot")]
    StaleSlot,

    /// The entity produced no value for a field its schema declares
    #[error("entity produced no value for schema field {field}")]
    MissingField { field: FieldId },

    /// The entity produced a value of the wrong kind for a schema field
    #[error("entity produced a mismatched value kind for schema field {field}")]
    KindMismatch { field: FieldId },
}
