use std::sync::Arc;

use crate::types::FieldId;

use super::field::FieldDescriptor;

pub type SchemaHandle = Arc<Schema>;

/// The immutable, flattened description of one entity type's networked
/// fields. Built once at registration and shared by every instance of the
/// type; field ids index directly into the flat layout.
#[derive(Debug, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub(super) fn new(name: String, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDescriptor> {
        self.fields.get(usize::from(id))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &FieldDescriptor)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(id, descriptor)| (id as FieldId, descriptor))
    }

    /// Reverse lookup by flattened field name, for tooling.
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields
            .iter()
            .position(|descriptor| descriptor.name() == name)
            .map(|id| id as FieldId)
    }

    pub(super) fn descriptors(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}
