use log::warn;

use crate::{
    types::FieldId,
    world::{
        component::Replicated,
        delta_frame::DeltaFrame,
        entity::slot_table::{SlotFlags, SlotRef, SlotTable},
        schema::{field::FieldValue, schema::Schema},
    },
};

use super::{baseline::EntityBaseline, change_pool::ChangePool, error::HostError};

pub struct UpdateWriter;

impl UpdateWriter {
    /// Produce the minimal update for one entity relative to one observer's
    /// baseline.
    ///
    /// The frame is full when the entity's fine-grained tracking gave out
    /// this epoch, or when the observer has no baseline yet (the first time
    /// the entity becomes relevant to it). Otherwise only fields in the
    /// entity's change record that actually differ from the baseline are
    /// emitted.
    ///
    /// The caller is expected to `absorb` the returned frame into the
    /// observer's baseline before the next epoch.
    pub fn write_update(
        slots: &mut SlotTable,
        changes: &ChangePool,
        entity: &dyn Replicated,
        slot: SlotRef,
        schema: &Schema,
        baseline: Option<&EntityBaseline>,
    ) -> Result<DeltaFrame, HostError> {
        let flags = slots.flags(slot).map_err(|_| HostError::StaleSlot)?;

        let baseline = match baseline {
            Some(baseline) if !flags.contains(SlotFlags::FULLY_CHANGED) => baseline,
            _ => {
                let mut fields = Vec::with_capacity(schema.field_count());
                for (id, _) in schema.fields() {
                    fields.push((id, Self::wire_value(entity, schema, id)?));
                }
                // The whole entity has been re-sent; fine-grained tracking
                // can resume next epoch.
                if let Ok(flags) = slots.flags_mut(slot) {
                    flags.remove(SlotFlags::FULLY_CHANGED);
                }
                return Ok(DeltaFrame::full(slot.index(), fields));
            }
        };

        let binding = slots.change_binding(slot).map_err(|_| HostError::StaleSlot)?;

        let mut fields = Vec::new();
        match changes.record(&binding) {
            Some(record) => {
                for &id in record.offsets() {
                    Self::push_if_changed(entity, schema, baseline, id, &mut fields)?;
                }
            }
            None => {
                // No record this epoch (e.g. the entity was marked in an
                // earlier epoch, or the pool was exhausted and reset since).
                // Fall back to comparing every field against the baseline.
                for (id, _) in schema.fields() {
                    Self::push_if_changed(entity, schema, baseline, id, &mut fields)?;
                }
            }
        }

        Ok(DeltaFrame::partial(slot.index(), fields))
    }

    fn push_if_changed(
        entity: &dyn Replicated,
        schema: &Schema,
        baseline: &EntityBaseline,
        id: FieldId,
        fields: &mut Vec<(FieldId, FieldValue)>,
    ) -> Result<(), HostError> {
        if schema.field(id).is_none() {
            // A marked id the schema does not know; skip rather than fail
            // the whole update.
            warn!("UpdateWriter: change record names field {id} unknown to schema");
            return Ok(());
        }
        let value = Self::wire_value(entity, schema, id)?;
        if baseline.value(id) != Some(&value) {
            fields.push((id, value));
        }
        Ok(())
    }

    /// The entity's current value for `id`, passed through the field's
    /// encode transform so baselines compare against what the wire will
    /// carry.
    fn wire_value(
        entity: &dyn Replicated,
        schema: &Schema,
        id: FieldId,
    ) -> Result<FieldValue, HostError> {
        let descriptor = schema
            .field(id)
            .ok_or(HostError::MissingField { field: id })?;
        let raw = entity
            .field(id)
            .ok_or(HostError::MissingField { field: id })?;
        if !descriptor.kind().accepts(&raw) {
            return Err(HostError::KindMismatch { field: id });
        }
        Ok(match descriptor.field_transform() {
            Some(transform) => transform.encode(raw),
            None => raw,
        })
    }
}
