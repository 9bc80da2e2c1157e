use std::collections::{HashMap, HashSet};

use log::info;

use crate::types::FieldId;

use super::{
    error::SchemaError,
    field::FieldDescriptor,
    schema::{Schema, SchemaHandle},
};

enum BuilderEntry {
    Field(FieldDescriptor),
    Nested {
        prefix: String,
        child: String,
    },
    Array {
        prefix: String,
        child: String,
        max_elements: usize,
    },
}

/// Declarative description of one entity type, registered into the
/// `SchemaRegistry` at startup. Base and child types must be registered
/// before the types that reference them, which also rules out cycles.
pub struct SchemaBuilder {
    name: String,
    base: Option<String>,
    entries: Vec<BuilderEntry>,
}

impl SchemaBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base: None,
            entries: Vec::new(),
        }
    }

    /// Inherit every field of an already-registered parent type.
    pub fn base(mut self, parent: &str) -> Self {
        self.base = Some(parent.to_string());
        self
    }

    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.entries.push(BuilderEntry::Field(descriptor));
        self
    }

    /// Embed an already-registered child type's fields under `prefix.`.
    pub fn nested(mut self, prefix: &str, child: &str) -> Self {
        self.entries.push(BuilderEntry::Nested {
            prefix: prefix.to_string(),
            child: child.to_string(),
        });
        self
    }

    /// Embed up to `max_elements` copies of a child type, one per element.
    pub fn array(mut self, prefix: &str, child: &str, max_elements: usize) -> Self {
        self.entries.push(BuilderEntry::Array {
            prefix: prefix.to_string(),
            child: child.to_string(),
            max_elements,
        });
        self
    }
}

/// Startup-time registry of per-type schemas. Registration flattens each
/// type's tree (base chain, nested structs, arrays-of-struct) into one
/// ordered field list; the resulting `Schema` is immutable and shared.
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaHandle>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    pub fn register(&mut self, builder: SchemaBuilder) -> Result<SchemaHandle, SchemaError> {
        if self.schemas.contains_key(&builder.name) {
            return Err(SchemaError::DuplicateType(builder.name));
        }

        let mut fields: Vec<FieldDescriptor> = Vec::new();

        if let Some(parent) = &builder.base {
            let parent_schema = self.resolve(parent)?;
            fields.extend(parent_schema.descriptors().iter().cloned());
        }

        for entry in &builder.entries {
            match entry {
                BuilderEntry::Field(descriptor) => fields.push(descriptor.clone()),
                BuilderEntry::Nested { prefix, child } => {
                    let child_schema = self.resolve(child)?;
                    for descriptor in child_schema.descriptors() {
                        let mut flattened = descriptor.clone();
                        flattened.rename(format!("{prefix}.{}", descriptor.name()));
                        fields.push(flattened);
                    }
                }
                BuilderEntry::Array {
                    prefix,
                    child,
                    max_elements,
                } => {
                    let child_schema = self.resolve(child)?;
                    for element in 0..*max_elements {
                        for descriptor in child_schema.descriptors() {
                            let mut flattened = descriptor.clone();
                            flattened.rename(format!("{prefix}[{element}].{}", descriptor.name()));
                            fields.push(flattened);
                        }
                    }
                }
            }
        }

        // Hot fields first: with variable-length ids, the fields that change
        // nearly every tick get the cheapest wire encoding.
        fields.sort_by_key(|descriptor| !descriptor.is_changes_often());

        let mut seen = HashSet::new();
        for descriptor in &fields {
            if !seen.insert(descriptor.name().to_string()) {
                return Err(SchemaError::FieldCollision {
                    type_name: builder.name,
                    field: descriptor.name().to_string(),
                });
            }
        }

        if fields.len() > usize::from(FieldId::MAX) {
            return Err(SchemaError::TooManyFields {
                type_name: builder.name,
                count: fields.len(),
            });
        }

        info!(
            "SchemaRegistry: registered `{}` with {} flattened fields",
            builder.name,
            fields.len()
        );
        let handle: SchemaHandle = Schema::new(builder.name.clone(), fields).into();
        self.schemas.insert(builder.name, handle.clone());
        Ok(handle)
    }

    /// Resolve a type by name. An unknown type is a configuration error the
    /// caller should treat as fatal, not retry.
    pub fn resolve(&self, name: &str) -> Result<SchemaHandle, SchemaError> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered type names, for tooling that enumerates fields.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
