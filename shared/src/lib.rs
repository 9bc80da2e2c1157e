//! # Netstate Shared
//! Entity network-state synchronization core: a reusable entity slot table,
//! a bounded change-tracking pool, a per-type property schema registry, and
//! a delta encoder/decoder that ships only the fields an observer has not
//! yet seen.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use netstate_serde::{
    BitReader, BitWrite, BitWriter, RoundMode, Serde, SerdeErr, SignedInteger,
    SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};

mod constants;
mod diagnostics;
mod types;
mod world;

pub use constants::{CHANGE_POOL_CAPACITY, CHANGE_RECORD_CAPACITY, DEFAULT_SLOT_CAPACITY};
pub use diagnostics::{entity_state_report, DiagnosticSink, LogDiagnosticSink};
pub use types::{FieldId, ProtocolVersion, SlotIndex, LEGACY_INDEX_PROTOCOL, PROTOCOL_VERSION};
pub use world::{
    component::Replicated,
    delta_frame::{DeltaFrame, DeltaPayload},
    entity::{
        error::SlotError,
        slot_table::{SlotFlags, SlotRef, SlotTable, SlotTableConfig},
    },
    host::{
        baseline::{BaselineStore, EntityBaseline, MemoryBaselineStore},
        change_pool::{ChangeBinding, ChangePool, ChangeRecord, MarkOutcome},
        error::HostError,
        update_writer::UpdateWriter,
    },
    remote::{
        error::RemoteError,
        update_reader::{ChangeNotify, DropReason, UpdateEvent, UpdateReader, UpdateReceipt},
    },
    schema::{
        error::SchemaError,
        field::{FieldDescriptor, FieldKind, FieldValue},
        registry::{SchemaBuilder, SchemaRegistry},
        schema::{Schema, SchemaHandle},
        transform::{FieldTransform, LegacyIndexTransform},
    },
    world_context::{WorldContext, WorldDiagnostics},
};
