//! API error handling utilities.
//!
//! Every layer has its own error enum; this module decides which HTTP
//! status each variant maps to.

use crate::export::ExportError;
use crate::services::flows_dialog::FlowsError;
use crate::services::import_service::ImportError;
use crate::services::mapper_service::DiagramError;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });

        (self.status, axum::Json(body)).into_response()
    }
}

impl From<DiagramError> for ApiError {
    fn from(e: DiagramError) -> Self {
        let status = match &e {
            DiagramError::NodeNotFound(_) | DiagramError::EdgeNotFound(_) => StatusCode::NOT_FOUND,
            DiagramError::DuplicateEdge(_)
            | DiagramError::DuplicateNodeId(_)
            | DiagramError::NoOpenEditor => StatusCode::CONFLICT,
            DiagramError::NoColumns { .. }
            | DiagramError::ColumnOutOfRange { .. }
            | DiagramError::InvalidConnection(_) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(e: ImportError) -> Self {
        let status = match &e {
            ImportError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        let status = match &e {
            StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::QuotaExceeded { .. } => StatusCode::CONFLICT,
            StorageError::ConnectionError(_) => StatusCode::SERVICE_UNAVAILABLE,
            StorageError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<FlowsError> for ApiError {
    fn from(e: FlowsError) -> Self {
        let status = match &e {
            FlowsError::Storage(inner) => return inner.clone().into(),
            FlowsError::NotSignedIn => StatusCode::UNAUTHORIZED,
            FlowsError::SessionHeldByOther => StatusCode::FORBIDDEN,
            FlowsError::EmptyName => StatusCode::BAD_REQUEST,
            FlowsError::LimitReached(_) => StatusCode::CONFLICT,
            FlowsError::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, e.to_string())
    }
}
