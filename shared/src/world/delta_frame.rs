use log::warn;

use netstate_serde::{
    dequantize, quantize, read_bits, write_bits, BitReader, BitWrite, Serde, SerdeErr,
    SignedVariableInteger, UnsignedVariableInteger,
};

use crate::types::{FieldId, SlotIndex};

use super::schema::{
    field::{FieldDescriptor, FieldKind, FieldValue},
    schema::Schema,
};

/// The minimal set of field changes produced for one entity, for one
/// observer, in one send epoch. Fields omitted from a partial frame are
/// unchanged since that observer's last acknowledged baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct DeltaFrame {
    entity: SlotIndex,
    payload: DeltaPayload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeltaPayload {
    /// Complete snapshot. On apply, fields absent from the frame take their
    /// declared defaults; valid only the first time an observer sees the
    /// entity.
    Full(Vec<(FieldId, FieldValue)>),
    /// Only the named fields changed.
    Partial(Vec<(FieldId, FieldValue)>),
}

impl DeltaFrame {
    pub fn full(entity: SlotIndex, fields: Vec<(FieldId, FieldValue)>) -> Self {
        Self {
            entity,
            payload: DeltaPayload::Full(fields),
        }
    }

    pub fn partial(entity: SlotIndex, fields: Vec<(FieldId, FieldValue)>) -> Self {
        Self {
            entity,
            payload: DeltaPayload::Partial(fields),
        }
    }

    pub fn entity(&self) -> SlotIndex {
        self.entity
    }

    pub fn is_full(&self) -> bool {
        matches!(self.payload, DeltaPayload::Full(_))
    }

    pub fn fields(&self) -> &[(FieldId, FieldValue)] {
        match &self.payload {
            DeltaPayload::Full(fields) | DeltaPayload::Partial(fields) => fields,
        }
    }

    pub fn payload(&self) -> &DeltaPayload {
        &self.payload
    }

    /// Serialize for the wire. Values are encoded per their descriptor in
    /// `schema`; out-of-range numerics are clamped (a simulation logic
    /// error, logged, never a transport error).
    pub fn ser(&self, schema: &Schema, writer: &mut dyn BitWrite) {
        self.is_full().ser(writer);
        UnsignedVariableInteger::<7>::new(u64::from(self.entity)).ser(writer);

        for (field, value) in self.fields() {
            let Some(descriptor) = schema.field(*field) else {
                warn!(
                    "DeltaFrame: dropping field {field} unknown to schema `{}`",
                    schema.name()
                );
                continue;
            };
            // write FieldContinue bit
            true.ser(writer);
            // write field id
            UnsignedVariableInteger::<4>::new(u64::from(*field)).ser(writer);
            // write value
            ser_value(descriptor, value, writer);
        }

        // finish with a false FieldContinue bit
        false.ser(writer);
    }

    /// Deserialize from the wire. Any malformed content rejects the whole
    /// frame; a frame is never partially decoded.
    pub fn de(schema: &Schema, reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let full = bool::de(reader)?;
        let entity = UnsignedVariableInteger::<7>::de(reader)?.get();
        if entity > u64::from(SlotIndex::MAX) {
            return Err(SerdeErr::InvalidValue);
        }

        let mut fields = Vec::new();
        loop {
            // read FieldContinue bit
            if !bool::de(reader)? {
                break;
            }
            let id = UnsignedVariableInteger::<4>::de(reader)?.get();
            if id > u64::from(FieldId::MAX) {
                return Err(SerdeErr::InvalidValue);
            }
            let id = id as FieldId;
            let descriptor = schema.field(id).ok_or(SerdeErr::InvalidValue)?;
            fields.push((id, de_value(descriptor, reader)?));
        }

        let entity = entity as SlotIndex;
        Ok(if full {
            Self::full(entity, fields)
        } else {
            Self::partial(entity, fields)
        })
    }
}

fn ser_value(descriptor: &FieldDescriptor, value: &FieldValue, writer: &mut dyn BitWrite) {
    match (descriptor.kind(), value) {
        (FieldKind::Bool, FieldValue::Bool(v)) => v.ser(writer),
        (FieldKind::Int, FieldValue::Int(v)) => {
            let bits = descriptor.bits();
            if bits == 0 {
                SignedVariableInteger::<6>::new(*v).ser(writer);
            } else {
                let limit = (1i64 << bits) - 1;
                let clamped = (*v).clamp(-limit, limit);
                if clamped != *v {
                    warn!(
                        "field `{}`: {v} exceeds {bits} magnitude bits, clamped",
                        descriptor.name()
                    );
                }
                writer.write_bit(clamped < 0);
                write_bits(writer, clamped.unsigned_abs(), bits);
            }
        }
        (FieldKind::UInt | FieldKind::Enum, FieldValue::UInt(v)) => {
            let bits = descriptor.bits();
            if bits == 0 {
                UnsignedVariableInteger::<6>::new(*v).ser(writer);
            } else {
                let limit = (1u64 << bits) - 1;
                let clamped = (*v).min(limit);
                if clamped != *v {
                    warn!(
                        "field `{}`: {v} exceeds {bits} bits, clamped",
                        descriptor.name()
                    );
                }
                write_bits(writer, clamped, bits);
            }
        }
        (FieldKind::Float, FieldValue::Float(v)) => ser_float(descriptor, *v, writer),
        (FieldKind::String, FieldValue::String(v)) => v.ser(writer),
        (FieldKind::Vector, FieldValue::Vector(v)) => {
            for component in v {
                ser_float(descriptor, *component, writer);
            }
        }
        (kind, value) => {
            // The encoder validates kinds before building frames, so this
            // only trips on hand-built frames.
            warn!(
                "field `{}`: value {value:?} does not match kind {kind:?}, writing zero",
                descriptor.name()
            );
            ser_value(descriptor, &kind.default_value(), writer);
        }
    }
}

fn ser_float(descriptor: &FieldDescriptor, value: f32, writer: &mut dyn BitWrite) {
    let bits = descriptor.bits();
    if bits == 0 {
        value.ser(writer);
    } else {
        let step = quantize(
            value,
            descriptor.min(),
            descriptor.max(),
            bits,
            descriptor.round_mode(),
        );
        write_bits(writer, step, bits);
    }
}

fn de_value(descriptor: &FieldDescriptor, reader: &mut BitReader) -> Result<FieldValue, SerdeErr> {
    Ok(match descriptor.kind() {
        FieldKind::Bool => FieldValue::Bool(bool::de(reader)?),
        FieldKind::Int => {
            let bits = descriptor.bits();
            if bits == 0 {
                FieldValue::Int(SignedVariableInteger::<6>::de(reader)?.get())
            } else {
                let negative = reader.read_bit()?;
                let magnitude = read_bits(reader, bits)? as i64;
                FieldValue::Int(if negative { -magnitude } else { magnitude })
            }
        }
        FieldKind::UInt | FieldKind::Enum => {
            let bits = descriptor.bits();
            if bits == 0 {
                FieldValue::UInt(UnsignedVariableInteger::<6>::de(reader)?.get())
            } else {
                FieldValue::UInt(read_bits(reader, bits)?)
            }
        }
        FieldKind::Float => FieldValue::Float(de_float(descriptor, reader)?),
        FieldKind::String => FieldValue::String(String::de(reader)?),
        FieldKind::Vector => {
            let mut components = [0.0f32; 3];
            for component in &mut components {
                *component = de_float(descriptor, reader)?;
            }
            FieldValue::Vector(components)
        }
    })
}

fn de_float(descriptor: &FieldDescriptor, reader: &mut BitReader) -> Result<f32, SerdeErr> {
    let bits = descriptor.bits();
    if bits == 0 {
        f32::de(reader)
    } else {
        let step = read_bits(reader, bits)?;
        Ok(dequantize(step, descriptor.min(), descriptor.max(), bits))
    }
}
