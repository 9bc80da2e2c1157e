use std::collections::HashMap;

use crate::{
    types::{FieldId, SlotIndex},
    world::{delta_frame::DeltaFrame, schema::field::FieldValue},
};

/// The last acknowledged state of one entity as known to one observer, the
/// reference point for delta encoding. Values are stored post-transform,
/// i.e. as they went out on the wire.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityBaseline {
    values: HashMap<FieldId, FieldValue>,
}

impl EntityBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: FieldId) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Fold an emitted frame into this baseline.
    pub fn absorb(&mut self, frame: &DeltaFrame) {
        for (field, value) in frame.fields() {
            self.values.insert(*field, value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-observer baseline lookup the encoder consumes. The transport layer
/// owns the real store and its acknowledgment policy; the core only needs
/// these operations.
pub trait BaselineStore {
    fn baseline(&self, entity: SlotIndex) -> Option<&EntityBaseline>;
    fn store(&mut self, entity: SlotIndex, baseline: EntityBaseline);
    fn forget(&mut self, entity: SlotIndex);
}

/// In-memory store, one per observer.
#[derive(Default)]
pub struct MemoryBaselineStore {
    baselines: HashMap<SlotIndex, EntityBaseline>,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn baseline(&self, entity: SlotIndex) -> Option<&EntityBaseline> {
        self.baselines.get(&entity)
    }

    fn store(&mut self, entity: SlotIndex, baseline: EntityBaseline) {
        self.baselines.insert(entity, baseline);
    }

    fn forget(&mut self, entity: SlotIndex) {
        self.baselines.remove(&entity);
    }
}
