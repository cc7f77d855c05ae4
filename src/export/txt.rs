//! Plain-text component report.
//!
//! ```text
//! C4 Diagram:
//!
//! Components:
//! - Orders (database)
//!   Columns:
//!     - id: int
//!
//! Relationships:
//! - Ingest -> Orders
//! ```

use crate::models::DiagramDocument;
use std::fmt::Write;

pub struct TxtExporter;

impl TxtExporter {
    /// Render the report. Edges with a missing endpoint are left out.
    pub fn export(document: &DiagramDocument) -> String {
        let mut out = String::from("C4 Diagram:\n\nComponents:\n");

        for node in &document.nodes {
            let _ = writeln!(out, "- {} ({})", node.label(), node.kind());
            if let Some(columns) = node.data.columns() {
                out.push_str("  Columns:\n");
                for column in columns {
                    let _ = writeln!(out, "    - {}: {}", column.name, column.data_type);
                }
            }
        }

        out.push_str("\nRelationships:\n");
        for edge in &document.edges {
            if let (Some(source), Some(target)) =
                (document.node(&edge.source), document.node(&edge.target))
            {
                let _ = writeln!(out, "- {} -> {}", source.label(), target.label());
            }
        }

        out
    }
}
