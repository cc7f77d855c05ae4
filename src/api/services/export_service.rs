//! Export service for coordinating all export formats.

use crate::export::{
    ExportError, JSON_FILE_NAME, JsonExporter, PNG_FILE_NAME, PngExporter, TXT_FILE_NAME,
    TxtExporter,
};
use crate::models::DiagramDocument;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Json,
    Txt,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Json => "application/json",
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Png => PNG_FILE_NAME,
            ExportFormat::Json => JSON_FILE_NAME,
            ExportFormat::Txt => TXT_FILE_NAME,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(ExportFormat::Png),
            "json" => Ok(ExportFormat::Json),
            "txt" => Ok(ExportFormat::Txt),
            other => Err(format!("Unsupported export format: {}", other)),
        }
    }
}

/// A rendered export ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Service for coordinating exports to multiple formats.
pub struct ExportService;

impl ExportService {
    /// Export the document in `format`.
    ///
    /// PNG failures are logged here; callers do not raise a notification
    /// for them.
    pub fn export(
        document: &DiagramDocument,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let bytes = match format {
            ExportFormat::Png => PngExporter::export(document).inspect_err(|e| {
                error!("Error exporting to PNG: {}", e);
            })?,
            ExportFormat::Json => JsonExporter::export(document)?.into_bytes(),
            ExportFormat::Txt => TxtExporter::export(document).into_bytes(),
        };
        info!(
            "Exported diagram as {} ({} bytes)",
            format.file_name(),
            bytes.len()
        );
        Ok(ExportArtifact { format, bytes })
    }

    pub fn export_json(document: &DiagramDocument) -> Result<String, ExportError> {
        JsonExporter::export(document)
    }

    pub fn export_txt(document: &DiagramDocument) -> String {
        TxtExporter::export(document)
    }
}
