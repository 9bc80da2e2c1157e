use crate::{types::FieldId, world::schema::field::FieldValue};

/// Implemented by anything whose fields replicate through a schema. The
/// core never sees entity memory: values cross this boundary keyed by the
/// flattened field id assigned at schema registration.
pub trait Replicated {
    /// Current value of a field, or `None` if the id is unknown to this
    /// entity.
    fn field(&self, id: FieldId) -> Option<FieldValue>;

    /// Store a decoded value. Returning `false` rejects the write (unknown
    /// id or unacceptable value), which the reader records as a dropped
    /// field.
    fn set_field(&mut self, id: FieldId, value: FieldValue) -> bool;
}
