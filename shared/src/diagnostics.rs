use std::fmt::Write as _;

use log::error;

use crate::world::{component::Replicated, schema::schema::Schema};

/// Receives human-readable artifacts when malformed update data is
/// detected. The default sink routes to the log; a real host might write
/// files next to its crash dumps instead.
pub trait DiagnosticSink {
    fn save_artifact(&mut self, name: &str, contents: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnosticSink;

impl DiagnosticSink for LogDiagnosticSink {
    fn save_artifact(&mut self, name: &str, contents: &str) {
        error!("diagnostic artifact `{name}`:\n{contents}");
    }
}

/// Render an entity's raw field state against its schema, the artifact
/// saved when corrupt update data is detected.
pub fn entity_state_report(entity: &dyn Replicated, schema: &Schema) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "schema `{}` ({} fields)", schema.name(), schema.field_count());
    for (id, descriptor) in schema.fields() {
        match entity.field(id) {
            Some(value) => {
                let _ = writeln!(
                    out,
                    "  [{id}] {} ({:?}) = {value:?}",
                    descriptor.name(),
                    descriptor.kind()
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "  [{id}] {} ({:?}) = <no value>",
                    descriptor.name(),
                    descriptor.kind()
                );
            }
        }
    }
    out
}
