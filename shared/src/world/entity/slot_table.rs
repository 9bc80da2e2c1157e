use std::{
    collections::BTreeSet,
    fmt::Write as _,
    time::{Duration, Instant},
};

use log::warn;

use crate::{
    constants::{DEFAULT_REUSE_DELAY, DEFAULT_SLOT_CAPACITY},
    types::SlotIndex,
    world::host::change_pool::ChangeBinding,
};

use super::error::SlotError;

/// Per-slot state bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotFlags(u16);

impl SlotFlags {
    /// Slot is unoccupied.
    pub const FREE: Self = Self(1 << 0);
    /// Slot carries a full simulated entity rather than a lightweight
    /// networkable-only one.
    pub const FULL_ENTITY: Self = Self(1 << 1);
    /// At least one field changed since the last send epoch.
    pub const CHANGED: Self = Self(1 << 2);
    /// Entity is queued for a dormancy check.
    pub const PENDING_DORMANT_CHECK: Self = Self(1 << 3);
    /// Transmit to every observer regardless of visibility.
    pub const ALWAYS_TRANSMIT: Self = Self(1 << 4);
    /// Never transmit to any observer.
    pub const NEVER_TRANSMIT: Self = Self(1 << 5);
    /// Visibility set has been evaluated this frame.
    pub const PVS_CHECK: Self = Self(1 << 6);
    /// Cached visibility information needs recomputing.
    pub const DIRTY_PVS: Self = Self(1 << 7);
    /// Fine-grained tracking gave out; the whole entity must be re-sent.
    pub const FULLY_CHANGED: Self = Self(1 << 8);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Handle to an allocated slot. The serial makes reuse detectable: once the
/// slot is freed, every previously captured handle stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotRef {
    index: SlotIndex,
    serial: u32,
}

impl SlotRef {
    pub fn index(&self) -> SlotIndex {
        self.index
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }
}

struct Slot {
    serial: u32,
    flags: SlotFlags,
    freed_at: Option<Instant>,
    change: ChangeBinding,
}

pub struct SlotTableConfig {
    /// Total number of slots. Indices are dense in `[0, capacity)`.
    pub capacity: usize,
    /// Cooldown before a freed slot becomes eligible again.
    pub reuse_delay: Duration,
    /// Skip the cooldown entirely (e.g. single-player or test worlds).
    pub allow_immediate_reuse: bool,
    /// Log a warning when the free count drops below this threshold.
    /// Corrective reactions (map restart, rotation) are caller policy.
    pub low_slot_warning: Option<usize>,
}

impl Default for SlotTableConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SLOT_CAPACITY,
            reuse_delay: DEFAULT_REUSE_DELAY,
            allow_immediate_reuse: false,
            low_slot_warning: Some(16),
        }
    }
}

/// Fixed-capacity table of reusable entity slots.
pub struct SlotTable {
    slots: Vec<Slot>,
    free: BTreeSet<SlotIndex>,
    config: SlotTableConfig,
    low_warned: bool,
}

impl SlotTable {
    pub fn new(config: SlotTableConfig) -> Self {
        let capacity = config.capacity.min(usize::from(SlotIndex::MAX) + 1);
        let mut slots = Vec::with_capacity(capacity);
        let mut free = BTreeSet::new();
        for index in 0..capacity {
            slots.push(Slot {
                serial: 1,
                flags: SlotFlags::FREE,
                freed_at: None,
                change: ChangeBinding::unbound(),
            });
            free.insert(index as SlotIndex);
        }
        Self {
            slots,
            free,
            config,
            low_warned: false,
        }
    }

    /// Claim a free slot. With `preferred` set, that exact slot is taken or
    /// the call fails; otherwise the lowest-indexed eligible free slot wins,
    /// keeping the active set dense.
    pub fn allocate(&mut self, preferred: Option<SlotIndex>) -> Result<SlotRef, SlotError> {
        let now = Instant::now();
        let index = match preferred {
            Some(index) => {
                if !self.free.contains(&index) {
                    return Err(SlotError::SlotUnavailable { index });
                }
                index
            }
            None => self.pick_free(now).ok_or(SlotError::CapacityExceeded)?,
        };

        self.free.remove(&index);
        let slot = &mut self.slots[usize::from(index)];
        slot.flags = SlotFlags::default();
        slot.freed_at = None;
        slot.change = ChangeBinding::unbound();
        let slot_ref = SlotRef {
            index,
            serial: slot.serial,
        };
        self.check_low_watermark();
        Ok(slot_ref)
    }

    fn pick_free(&self, now: Instant) -> Option<SlotIndex> {
        if self.config.allow_immediate_reuse {
            return self.free.iter().next().copied();
        }
        let mut cooling_fallback = None;
        for &index in &self.free {
            if cooling_fallback.is_none() {
                cooling_fallback = Some(index);
            }
            let eligible = match self.slots[usize::from(index)].freed_at {
                Some(freed_at) => now.duration_since(freed_at) >= self.config.reuse_delay,
                None => true,
            };
            if eligible {
                return Some(index);
            }
        }
        // Every free slot is still cooling; taking the lowest beats failing
        // the allocation outright.
        cooling_fallback
    }

    /// Release a slot back to the free set. Its serial is bumped so handles
    /// captured before the free become detectably stale, and the slot stays
    /// ineligible for `reuse_delay`.
    pub fn free(&mut self, slot: SlotRef) -> Result<(), SlotError> {
        let entry = self
            .slots
            .get_mut(usize::from(slot.index))
            .ok_or(SlotError::StaleHandle)?;
        if entry.serial != slot.serial || entry.flags.contains(SlotFlags::FREE) {
            return Err(SlotError::StaleHandle);
        }

        entry.serial = entry.serial.wrapping_add(1);
        entry.flags = SlotFlags::FREE;
        entry.freed_at = Some(Instant::now());
        entry.change = ChangeBinding::unbound();
        self.free.insert(slot.index);

        if let Some(threshold) = self.config.low_slot_warning {
            if self.free.len() >= threshold {
                self.low_warned = false;
            }
        }
        Ok(())
    }

    fn check_low_watermark(&mut self) {
        let Some(threshold) = self.config.low_slot_warning else {
            return;
        };
        if self.free.len() < threshold {
            if !self.low_warned {
                self.low_warned = true;
                warn!(
                    "SlotTable: only {} free slots remain of {}",
                    self.free.len(),
                    self.slots.len()
                );
            }
        } else {
            self.low_warned = false;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Whether the handle still refers to a live slot.
    pub fn contains(&self, slot: SlotRef) -> bool {
        self.entry(slot).is_ok()
    }

    fn entry(&self, slot: SlotRef) -> Result<&Slot, SlotError> {
        let entry = self
            .slots
            .get(usize::from(slot.index()))
            .ok_or(SlotError::StaleHandle)?;
        if entry.serial != slot.serial() || entry.flags.contains(SlotFlags::FREE) {
            return Err(SlotError::StaleHandle);
        }
        Ok(entry)
    }

    fn entry_mut(&mut self, slot: SlotRef) -> Result<&mut Slot, SlotError> {
        let entry = self
            .slots
            .get_mut(usize::from(slot.index()))
            .ok_or(SlotError::StaleHandle)?;
        if entry.serial != slot.serial() || entry.flags.contains(SlotFlags::FREE) {
            return Err(SlotError::StaleHandle);
        }
        Ok(entry)
    }

    pub fn flags(&self, slot: SlotRef) -> Result<SlotFlags, SlotError> {
        Ok(self.entry(slot)?.flags)
    }

    pub fn flags_mut(&mut self, slot: SlotRef) -> Result<&mut SlotFlags, SlotError> {
        Ok(&mut self.entry_mut(slot)?.flags)
    }

    pub fn change_binding(&self, slot: SlotRef) -> Result<ChangeBinding, SlotError> {
        Ok(self.entry(slot)?.change)
    }

    /// Flags and change binding of one live slot, borrowed together so
    /// callers can update both in one step.
    pub(crate) fn slot_state_mut(
        &mut self,
        slot: SlotRef,
    ) -> Result<(&mut SlotFlags, &mut ChangeBinding), SlotError> {
        let entry = self.entry_mut(slot)?;
        Ok((&mut entry.flags, &mut entry.change))
    }

    pub fn iter_live(&self) -> impl Iterator<Item = SlotRef> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.flags.contains(SlotFlags::FREE))
            .map(|(index, slot)| SlotRef {
                index: index as SlotIndex,
                serial: slot.serial,
            })
    }

    /// Live slots with pending changes, the set that participates in this
    /// epoch's delta pass.
    pub fn iter_changed(&self) -> impl Iterator<Item = SlotRef> + '_ {
        self.iter_live()
            .filter(|slot| self.slots[usize::from(slot.index)].flags.contains(SlotFlags::CHANGED))
    }

    /// Drop per-epoch change state from every live slot.
    pub fn clear_changed(&mut self) {
        for slot in &mut self.slots {
            if !slot.flags.contains(SlotFlags::FREE) {
                slot.flags.remove(SlotFlags::CHANGED);
                slot.flags.remove(SlotFlags::FULLY_CHANGED);
            }
        }
    }

    /// Human-readable listing of live slots for console diagnostics.
    pub fn dump_slots(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "slots: {} live / {} capacity ({} free)",
            self.len(),
            self.capacity(),
            self.free_count()
        );
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.flags.contains(SlotFlags::FREE) {
                continue;
            }
            let _ = writeln!(
                out,
                "  #{index} serial={} changed={} full={}",
                slot.serial,
                slot.flags.contains(SlotFlags::CHANGED),
                slot.flags.contains(SlotFlags::FULL_ENTITY),
            );
        }
        out
    }
}
