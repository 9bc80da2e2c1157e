use crate::{
    types::{FieldId, SlotIndex},
    world::{
        component::Replicated,
        delta_frame::DeltaFrame,
        entity::{
            error::SlotError,
            slot_table::{SlotFlags, SlotRef, SlotTable, SlotTableConfig},
        },
        host::{
            baseline::EntityBaseline,
            change_pool::{ChangePool, MarkOutcome},
            error::HostError,
            update_writer::UpdateWriter,
        },
        schema::{registry::SchemaRegistry, schema::Schema},
    },
};

/// Counters surfaced for console-style diagnostics dumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldDiagnostics {
    pub live_slots: usize,
    pub free_slots: usize,
    pub slot_capacity: usize,
    pub change_records_used: usize,
    pub change_record_capacity: usize,
}

/// One simulation's sync state — slot table, change pool, schema registry —
/// explicitly constructed and owned, so independent worlds (or tests) can
/// coexist in one process.
///
/// Tick order: field mutations (`mark_changed` via typed setters), then
/// `write_update` per observer per relevant entity, then
/// `finish_send_epoch` once every observer has been served.
pub struct WorldContext {
    slots: SlotTable,
    changes: ChangePool,
    schemas: SchemaRegistry,
}

impl WorldContext {
    pub fn new(config: SlotTableConfig) -> Self {
        Self {
            slots: SlotTable::new(config),
            changes: ChangePool::new(),
            schemas: SchemaRegistry::new(),
        }
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotTable {
        &mut self.slots
    }

    pub fn changes(&self) -> &ChangePool {
        &self.changes
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn schemas_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.schemas
    }

    pub fn allocate_entity(&mut self, preferred: Option<SlotIndex>) -> Result<SlotRef, SlotError> {
        self.slots.allocate(preferred)
    }

    pub fn free_entity(&mut self, slot: SlotRef) -> Result<(), SlotError> {
        self.slots.free(slot)
    }

    /// Note that one field of a live entity changed. Acquires a change
    /// record on first use per epoch; capacity pressure degrades the entity
    /// to whole-entity replication instead of failing.
    pub fn mark_changed(
        &mut self,
        slot: SlotRef,
        field: FieldId,
    ) -> Result<MarkOutcome, SlotError> {
        let (flags, binding) = self.slots.slot_state_mut(slot)?;
        flags.insert(SlotFlags::CHANGED);

        if flags.contains(SlotFlags::FULLY_CHANGED) {
            return Ok(MarkOutcome::CoarselyTracked);
        }

        let outcome = self.changes.mark(binding, field);
        if matches!(
            outcome,
            MarkOutcome::RecordOverflow | MarkOutcome::PoolExhausted
        ) {
            flags.insert(SlotFlags::FULLY_CHANGED);
        }
        Ok(outcome)
    }

    /// Encode the minimal update for `entity` relative to one observer's
    /// baseline. See `UpdateWriter::write_update`.
    pub fn write_update(
        &mut self,
        entity: &dyn Replicated,
        slot: SlotRef,
        schema: &Schema,
        baseline: Option<&EntityBaseline>,
    ) -> Result<DeltaFrame, HostError> {
        UpdateWriter::write_update(&mut self.slots, &self.changes, entity, slot, schema, baseline)
    }

    /// Close out a send epoch: invalidate every change record in O(1) and
    /// drop per-epoch flags from live slots. Call once all observers have
    /// consumed this epoch's dirty state.
    pub fn finish_send_epoch(&mut self) {
        self.changes.reset();
        self.slots.clear_changed();
    }

    /// Live entities that participate in this epoch's delta pass.
    pub fn changed_entities(&self) -> impl Iterator<Item = SlotRef> + '_ {
        self.slots.iter_changed()
    }

    pub fn diagnostics(&self) -> WorldDiagnostics {
        WorldDiagnostics {
            live_slots: self.slots.len(),
            free_slots: self.slots.free_count(),
            slot_capacity: self.slots.capacity(),
            change_records_used: self.changes.records_in_use(),
            change_record_capacity: self.changes.capacity(),
        }
    }
}
