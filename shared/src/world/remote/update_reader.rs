use log::warn;

use netstate_serde::BitReader;

use crate::{
    diagnostics::{entity_state_report, DiagnosticSink},
    types::{FieldId, ProtocolVersion, SlotIndex},
    world::{
        component::Replicated,
        delta_frame::DeltaFrame,
        schema::{field::FieldValue, schema::Schema},
    },
};

use super::error::RemoteError;

/// Fired once per applied update, after every field in the frame has been
/// stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateEvent {
    /// The entity was just created for this observer.
    Created,
    /// An already-known entity changed.
    Updated,
}

/// Observer-side hook for reacting to applied updates (recomputing derived
/// state, spawning render proxies, and so on).
pub trait ChangeNotify {
    fn notify(&mut self, entity: SlotIndex, event: UpdateEvent);
}

/// Why an incoming field was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The frame names a field the schema does not declare.
    UnknownField,
    /// The value variant does not match the field's declared kind.
    KindMismatch,
    /// The value lies outside the field's declared width or range.
    OutOfDomain,
    /// The entity refused the write.
    Rejected,
}

/// What happened while applying one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateReceipt {
    pub event: UpdateEvent,
    pub applied: usize,
    pub dropped: Vec<(FieldId, DropReason)>,
}

pub struct UpdateReader;

impl UpdateReader {
    /// Decode a frame off the wire and apply it. A frame that fails to
    /// decode is rejected whole — nothing is applied, and a diagnostic
    /// artifact of the entity's current state is saved for offline
    /// debugging.
    pub fn read_and_apply(
        entity: &mut dyn Replicated,
        schema: &Schema,
        reader: &mut BitReader,
        protocol: ProtocolVersion,
        newly_created: bool,
        notifier: &mut dyn ChangeNotify,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<UpdateReceipt, RemoteError> {
        match DeltaFrame::de(schema, reader) {
            Ok(frame) => Ok(Self::apply_update(
                entity,
                schema,
                &frame,
                protocol,
                newly_created,
                notifier,
                sink,
            )),
            Err(err) => {
                warn!(
                    "UpdateReader: rejecting malformed frame for schema `{}`: {err}",
                    schema.name()
                );
                sink.save_artifact(
                    "malformed-frame",
                    &entity_state_report(&*entity, schema),
                );
                Err(RemoteError::MalformedFrame(err))
            }
        }
    }

    /// Apply a decoded frame to the observer's mirror of the entity.
    ///
    /// Full frames set every schema field, with fields absent from the
    /// frame taking their declared defaults. Partial frames touch only the
    /// named fields. Malformed fields are dropped individually; the rest of
    /// the frame still applies. Fields within a frame carry no ordering
    /// dependency, and the notification hook fires exactly once, after the
    /// last field.
    pub fn apply_update(
        entity: &mut dyn Replicated,
        schema: &Schema,
        frame: &DeltaFrame,
        protocol: ProtocolVersion,
        newly_created: bool,
        notifier: &mut dyn ChangeNotify,
        sink: &mut dyn DiagnosticSink,
    ) -> UpdateReceipt {
        let mut applied = 0usize;
        let mut dropped: Vec<(FieldId, DropReason)> = Vec::new();

        if frame.is_full() {
            for (id, descriptor) in schema.fields() {
                let value = frame
                    .fields()
                    .iter()
                    .find(|(field, _)| *field == id)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_else(|| descriptor.default().clone());
                Self::apply_field(entity, schema, id, value, protocol, &mut applied, &mut dropped);
            }
            for (id, _) in frame.fields() {
                if schema.field(*id).is_none() {
                    dropped.push((*id, DropReason::UnknownField));
                }
            }
        } else {
            for (id, value) in frame.fields() {
                Self::apply_field(
                    entity,
                    schema,
                    *id,
                    value.clone(),
                    protocol,
                    &mut applied,
                    &mut dropped,
                );
            }
        }

        if !dropped.is_empty() {
            warn!(
                "UpdateReader: dropped {} field(s) from update for entity {}",
                dropped.len(),
                frame.entity()
            );
            sink.save_artifact(
                &format!("entity-{}-dropped-fields", frame.entity()),
                &entity_state_report(&*entity, schema),
            );
        }

        let event = if newly_created {
            UpdateEvent::Created
        } else {
            UpdateEvent::Updated
        };
        notifier.notify(frame.entity(), event);

        UpdateReceipt {
            event,
            applied,
            dropped,
        }
    }

    fn apply_field(
        entity: &mut dyn Replicated,
        schema: &Schema,
        id: FieldId,
        value: FieldValue,
        protocol: ProtocolVersion,
        applied: &mut usize,
        dropped: &mut Vec<(FieldId, DropReason)>,
    ) {
        let Some(descriptor) = schema.field(id) else {
            dropped.push((id, DropReason::UnknownField));
            return;
        };
        if !descriptor.kind().accepts(&value) {
            dropped.push((id, DropReason::KindMismatch));
            return;
        }
        if !descriptor.in_domain(&value) {
            dropped.push((id, DropReason::OutOfDomain));
            return;
        }

        // Version-gated remaps run before the value lands in entity state.
        let value = match descriptor.field_transform() {
            Some(transform) => transform.decode(value, protocol),
            None => value,
        };

        if entity.set_field(id, value) {
            *applied += 1;
        } else {
            dropped.push((id, DropReason::Rejected));
        }
    }
}
