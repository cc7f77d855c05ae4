//! JSON exporter.

use super::ExportError;
use crate::models::DiagramDocument;

pub struct JsonExporter;

impl JsonExporter {
    /// Pretty-print the document with two-space indentation.
    pub fn export(document: &DiagramDocument) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(document)?)
    }
}
