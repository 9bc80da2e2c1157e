use log::trace;

use crate::{
    constants::{CHANGE_POOL_CAPACITY, CHANGE_RECORD_CAPACITY},
    types::FieldId,
};

/// One entity's record of which fields mutated since the last send epoch.
/// Insertion order is discovery order; the list is never sorted.
#[derive(Clone)]
pub struct ChangeRecord {
    offsets: [FieldId; CHANGE_RECORD_CAPACITY],
    count: usize,
}

impl ChangeRecord {
    fn new() -> Self {
        Self {
            offsets: [0; CHANGE_RECORD_CAPACITY],
            count: 0,
        }
    }

    fn clear(&mut self) {
        self.count = 0;
    }

    pub fn offsets(&self) -> &[FieldId] {
        &self.offsets[..self.count]
    }

    fn contains(&self, field: FieldId) -> bool {
        self.offsets().contains(&field)
    }

    fn push(&mut self, field: FieldId) -> bool {
        if self.count == CHANGE_RECORD_CAPACITY {
            return false;
        }
        self.offsets[self.count] = field;
        self.count += 1;
        true
    }
}

/// Opaque handle an entity holds into the pool. Valid only while its serial
/// matches the pool's current serial; serial 0 is never issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeBinding {
    index: u16,
    serial: u32,
}

impl ChangeBinding {
    pub fn unbound() -> Self {
        Self { index: 0, serial: 0 }
    }

    pub fn is_bound_to(&self, pool: &ChangePool) -> bool {
        self.serial == pool.serial
    }
}

/// What `ChangePool::mark` did with the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Field appended to the entity's record.
    Recorded,
    /// Field was already in the record; nothing to do.
    AlreadyRecorded,
    /// The record is full. The binding has been invalidated and the entity
    /// must fall back to whole-entity replication this epoch.
    RecordOverflow,
    /// No records left in the pool; same whole-entity fallback.
    PoolExhausted,
    /// The entity is already in whole-entity fallback this epoch, so
    /// per-field tracking is suppressed entirely.
    CoarselyTracked,
}

/// Globally bounded pool of change records. Records are never deallocated
/// one by one: `reset` bumps the pool serial, invalidating every
/// outstanding binding at once, and storage is reused from index 0.
pub struct ChangePool {
    records: Vec<ChangeRecord>,
    in_use: usize,
    serial: u32,
}

impl ChangePool {
    pub fn new() -> Self {
        Self {
            records: vec![ChangeRecord::new(); CHANGE_POOL_CAPACITY],
            in_use: 0,
            serial: 1,
        }
    }

    /// Note that `field` changed on the entity owning `binding`, acquiring a
    /// record first if the binding is stale. Overflow and exhaustion are not
    /// errors, only a loss of precision.
    pub fn mark(&mut self, binding: &mut ChangeBinding, field: FieldId) -> MarkOutcome {
        if binding.serial != self.serial {
            if self.in_use == self.records.len() {
                trace!("change pool exhausted; entity degrades to whole-entity tracking");
                *binding = ChangeBinding::unbound();
                return MarkOutcome::PoolExhausted;
            }
            let index = self.in_use;
            self.in_use += 1;
            self.records[index].clear();
            *binding = ChangeBinding {
                index: index as u16,
                serial: self.serial,
            };
        }

        let record = &mut self.records[usize::from(binding.index)];
        if record.contains(field) {
            return MarkOutcome::AlreadyRecorded;
        }
        if !record.push(field) {
            trace!(
                "change record overflow at field {field}; entity degrades to whole-entity tracking"
            );
            *binding = ChangeBinding::unbound();
            return MarkOutcome::RecordOverflow;
        }
        MarkOutcome::Recorded
    }

    /// The record behind a binding, or `None` if the binding is stale.
    pub fn record(&self, binding: &ChangeBinding) -> Option<&ChangeRecord> {
        if binding.serial != self.serial {
            return None;
        }
        self.records.get(usize::from(binding.index))
    }

    /// Invalidate every outstanding record in O(1). Called once per send
    /// epoch after all observers have been served.
    pub fn reset(&mut self) {
        self.serial = self.serial.wrapping_add(1);
        if self.serial == 0 {
            self.serial = 1;
        }
        self.in_use = 0;
    }

    pub fn records_in_use(&self) -> usize {
        self.in_use
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }
}

impl Default for ChangePool {
    fn default() -> Self {
        Self::new()
    }
}
