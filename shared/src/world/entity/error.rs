use thiserror::Error;

use crate::types::SlotIndex;

/// Errors that can occur during slot table operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    /// The requested preferred slot is occupied or out of range
    #[error("slot {index} is not available for allocation")]
    SlotUnavailable { index: SlotIndex },

    /// Every slot in the table is in use
    #[error("no free entity slots remain")]
    CapacityExceeded,

    /// The handle's serial no longer matches the slot (freed or reused)
    #[error("slot handle is stale; the entity it referred to is gone")]
    StaleHandle,
}
