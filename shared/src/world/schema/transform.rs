use crate::types::{ProtocolVersion, LEGACY_INDEX_PROTOCOL};

use super::field::FieldValue;

/// Custom encode/decode pair for fields needing non-default treatment
/// (colors, time values, handle indices, legacy-compatible enums).
pub trait FieldTransform: Send + Sync {
    /// Applied to the raw value before it is compared to baselines or
    /// written to the wire.
    fn encode(&self, value: FieldValue) -> FieldValue;

    /// Applied to the wire value before it is stored, gated on the sender's
    /// protocol revision.
    fn decode(&self, value: FieldValue, protocol: ProtocolVersion) -> FieldValue;
}

/// Folds legacy negative model indices back into the positive range.
/// Revisions up to `LEGACY_INDEX_PROTOCOL` wrote unassigned model slots as
/// negative values counted from -1; newer senders ship the index untouched.
pub struct LegacyIndexTransform;

impl FieldTransform for LegacyIndexTransform {
    fn encode(&self, value: FieldValue) -> FieldValue {
        value
    }

    fn decode(&self, value: FieldValue, protocol: ProtocolVersion) -> FieldValue {
        match value {
            FieldValue::Int(raw) if protocol <= LEGACY_INDEX_PROTOCOL && raw < 0 => {
                FieldValue::Int(-raw - 1)
            }
            other => other,
        }
    }
}
