//! Diagram import from uploaded files.
//!
//! The file name suffix picks the parser. Parsing is all-or-nothing: a
//! failed import leaves the current diagram untouched.

use super::mapper_service::MapperService;
use crate::models::{DiagramDocument, Notification};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid JSON format: missing `{0}`")]
    MissingField(&'static str),
    #[error("Invalid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Json,
    Txt,
}

impl ImportFormat {
    /// Format for `filename`, by suffix.
    pub fn detect(filename: &str) -> Result<Self, ImportError> {
        if filename.ends_with(".json") {
            Ok(ImportFormat::Json)
        } else if filename.ends_with(".txt") {
            Ok(ImportFormat::Txt)
        } else {
            Err(ImportError::UnsupportedFormat(filename.to_string()))
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            ImportFormat::Json => "JSON data has been imported successfully.",
            ImportFormat::Txt => "C4 model data has been imported successfully.",
        }
    }
}

/// What an import loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ImportSummary {
    pub format: ImportFormat,
    pub nodes: usize,
    pub edges: usize,
    /// Edges dropped because an endpoint was missing from the file.
    pub dropped_edges: Vec<String>,
}

pub struct ImportService;

impl ImportService {
    /// Parse a diagram document from file contents.
    pub fn parse(filename: &str, content: &str) -> Result<DiagramDocument, ImportError> {
        match ImportFormat::detect(filename)? {
            ImportFormat::Json => Self::parse_json(content),
            ImportFormat::Txt => Ok(Self::parse_c4_text(content)),
        }
    }

    /// Parse an exported JSON document. `nodes` and `edges` must be present.
    pub fn parse_json(content: &str) -> Result<DiagramDocument, ImportError> {
        let value: Value = serde_json::from_str(content)?;
        for field in ["nodes", "edges"] {
            if !value.get(field).is_some_and(Value::is_array) {
                return Err(ImportError::MissingField(field));
            }
        }

        let document: DiagramDocument = serde_json::from_value(value)?;
        if let Some(id) = document.duplicate_node_ids().into_iter().next() {
            return Err(ImportError::DuplicateNodeId(id));
        }
        Ok(document)
    }

    /// Parse the text report format.
    ///
    /// Not supported yet: always yields an empty diagram.
    pub fn parse_c4_text(content: &str) -> DiagramDocument {
        info!(
            "Text import is not implemented; ignoring {} bytes",
            content.len()
        );
        DiagramDocument::default()
    }

    /// Import a file into the controller and queue the user notification.
    pub fn import_into(
        mapper: &mut MapperService,
        filename: &str,
        content: &str,
    ) -> Result<ImportSummary, ImportError> {
        let parsed = ImportFormat::detect(filename)
            .and_then(|format| Self::parse(filename, content).map(|doc| (format, doc)));

        let (format, mut document) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Error importing {}: {}", filename, e);
                mapper.notify(Notification::error(
                    "Import Failed",
                    "There was an error importing the data. Please check the file format.",
                ));
                return Err(e);
            }
        };

        let dropped_edges = document.prune_dangling_edges();
        let summary = ImportSummary {
            format,
            nodes: document.nodes.len(),
            edges: document.edges.len(),
            dropped_edges,
        };

        mapper.replace_diagram(document);
        mapper.notify(Notification::info(
            "Import Successful",
            format.success_message(),
        ));
        Ok(summary)
    }
}
