//! Export format generators module.
//!
//! Diagrams export to a PNG raster, a pretty-printed JSON document that can
//! be imported again, and a plain-text component report.

pub mod json;
pub mod png;
pub mod txt;

pub use json::JsonExporter;
pub use png::PngExporter;
pub use txt::TxtExporter;

use thiserror::Error;

/// Download names used by the export endpoints.
pub const PNG_FILE_NAME: &str = "process-map.png";
pub const JSON_FILE_NAME: &str = "process-map.json";
pub const TXT_FILE_NAME: &str = "process-map.txt";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Png(String),
    #[error("Diagram too large to rasterise ({width}x{height})")]
    TooLarge { width: u32, height: u32 },
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
