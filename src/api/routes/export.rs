//! Export routes.
//!
//! Downloads of the current diagram as PNG, JSON or TXT.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::Response,
    routing::get,
};

use super::app_state::AppState;
use super::error::ApiError;
use crate::services::export_service::{ExportFormat, ExportService};

/// Create the export router
pub fn export_router() -> Router<AppState> {
    Router::new().route("/{format}", get(export_diagram))
}

/// GET /export/{format} - Download the current diagram
///
/// A failed PNG render is logged and answered with 500; no user
/// notification is raised for it.
#[utoipa::path(
    get,
    path = "/export/{format}",
    tag = "Export",
    params(("format" = ExportFormat, Path, description = "png, json or txt")),
    responses(
        (status = 200, description = "File download"),
        (status = 400, description = "Unknown format"),
        (status = 500, description = "Rendering failed")
    )
)]
pub async fn export_diagram(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse().map_err(ApiError::bad_request)?;

    let document = {
        let mapper = state.mapper.lock().await;
        mapper.document()
    };
    let artifact = ExportService::export(&document, format)?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
    Response::builder()
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(artifact.content_type()),
        )
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(artifact.bytes))
        .map_err(|e| ApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
