use std::{fmt, sync::Arc};

use netstate_serde::RoundMode;

use super::transform::FieldTransform;

/// Semantic type of a networked field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    UInt,
    Float,
    String,
    Vector,
    /// Unsigned on the wire, interpreted as an enumeration by the entity.
    Enum,
}

/// A concrete field value crossing the get/set boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    String(String),
    Vector([f32; 3]),
}

impl FieldKind {
    /// Whether a value variant is valid for this kind.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Bool, FieldValue::Bool(_))
                | (FieldKind::Int, FieldValue::Int(_))
                | (FieldKind::UInt, FieldValue::UInt(_))
                | (FieldKind::Enum, FieldValue::UInt(_))
                | (FieldKind::Float, FieldValue::Float(_))
                | (FieldKind::String, FieldValue::String(_))
                | (FieldKind::Vector, FieldValue::Vector(_))
        )
    }

    /// The canonical zero value for this kind.
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Int => FieldValue::Int(0),
            FieldKind::UInt | FieldKind::Enum => FieldValue::UInt(0),
            FieldKind::Float => FieldValue::Float(0.0),
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::Vector => FieldValue::Vector([0.0; 3]),
        }
    }
}

/// Everything the codec needs to deterministically serialize one field:
/// semantic kind, bit width, value domain, rounding, plus metadata hints.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    /// Wire width. For floats and vectors, 0 means raw 32-bit components;
    /// for integers, 0 means variable-length encoding.
    bits: u8,
    min: f32,
    max: f32,
    rounding: RoundMode,
    changes_often: bool,
    default: FieldValue,
    transform: Option<Arc<dyn FieldTransform>>,
}

impl FieldDescriptor {
    fn new(name: &str, kind: FieldKind, bits: u8) -> Self {
        Self {
            name: name.to_string(),
            kind,
            bits,
            min: 0.0,
            max: 1.0,
            rounding: RoundMode::default(),
            changes_often: false,
            default: kind.default_value(),
            transform: None,
        }
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Bool, 1)
    }

    /// Signed integer with `bits` magnitude bits (0 = variable-length).
    pub fn int(name: &str, bits: u8) -> Self {
        Self::new(name, FieldKind::Int, bits)
    }

    pub fn uint(name: &str, bits: u8) -> Self {
        Self::new(name, FieldKind::UInt, bits)
    }

    pub fn enumeration(name: &str, bits: u8) -> Self {
        Self::new(name, FieldKind::Enum, bits)
    }

    /// Float quantized to `bits` over its declared range; 0 bits ships the
    /// raw 32-bit value.
    pub fn float(name: &str, bits: u8) -> Self {
        Self::new(name, FieldKind::Float, bits)
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldKind::String, 0)
    }

    /// Three-component vector, each component encoded like a float field.
    pub fn vector(name: &str, bits: u8) -> Self {
        Self::new(name, FieldKind::Vector, bits)
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn rounding(mut self, mode: RoundMode) -> Self {
        self.rounding = mode;
        self
    }

    /// Hint that this field mutates nearly every tick. Hot fields sort to
    /// the front of the flattened layout, where variable-length ids are
    /// cheapest.
    pub fn changes_often(mut self) -> Self {
        self.changes_often = true;
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default = value;
        self
    }

    pub fn transform(mut self, transform: Arc<dyn FieldTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn round_mode(&self) -> RoundMode {
        self.rounding
    }

    pub fn is_changes_often(&self) -> bool {
        self.changes_often
    }

    pub fn default(&self) -> &FieldValue {
        &self.default
    }

    pub fn field_transform(&self) -> Option<&Arc<dyn FieldTransform>> {
        self.transform.as_ref()
    }

    /// Decode-side domain check: a wire value outside the declared width or
    /// range is a protocol violation.
    pub fn in_domain(&self, value: &FieldValue) -> bool {
        match (value, self.bits) {
            (FieldValue::Int(v), bits) if bits > 0 => v.unsigned_abs() < 1 << bits,
            (FieldValue::UInt(v), bits) if bits > 0 => *v < 1 << bits,
            (FieldValue::Float(v), bits) if bits > 0 => {
                *v >= self.min - f32::EPSILON && *v <= self.max + f32::EPSILON
            }
            (FieldValue::Vector(v), bits) if bits > 0 => v
                .iter()
                .all(|c| *c >= self.min - f32::EPSILON && *c <= self.max + f32::EPSILON),
            _ => true,
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bits", &self.bits)
            .field("range", &(self.min, self.max))
            .field("changes_often", &self.changes_often)
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.bits == other.bits
            && self.min == other.min
            && self.max == other.max
            && self.rounding == other.rounding
            && self.changes_often == other.changes_often
            && self.default == other.default
            && match (&self.transform, &other.transform) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}
