pub type SlotIndex = u16;
pub type FieldId = u16;
pub type ProtocolVersion = u16;

/// Current wire protocol revision.
pub const PROTOCOL_VERSION: ProtocolVersion = 14;

/// Last revision whose senders wrote unassigned model indices as negative
/// values. Decoders remap those before storing (see `LegacyIndexTransform`).
pub const LEGACY_INDEX_PROTOCOL: ProtocolVersion = 13;
