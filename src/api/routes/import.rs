//! Import routes.
//!
//! A successful import replaces the whole canvas. Failures leave it as it
//! was and queue an "Import Failed" notification.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::post,
};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::app_state::AppState;
use super::error::ApiError;
use crate::services::import_service::{ImportService, ImportSummary};

/// Largest accepted upload.
const MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Deserialize, ToSchema)]
pub struct ImportTextRequest {
    /// Name of the file the content came from; its suffix picks the parser.
    filename: String,
    content: String,
}

/// Create the import router
pub fn import_router() -> Router<AppState> {
    Router::new()
        .route("/", post(import_file))
        .route("/text", post(import_text))
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES + MULTIPART_OVERHEAD_BYTES))
}

/// POST /import - Upload a `.json` or `.txt` file in the `file` field
#[utoipa::path(
    post,
    path = "/import",
    tag = "Import",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Diagram replaced", body = ImportSummary),
        (status = 400, description = "File missing or not a valid diagram"),
        (status = 415, description = "Unsupported file type")
    )
)]
pub async fn import_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    let mut upload: Option<(String, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Rejected import upload: {}", e);
        ApiError::bad_request(format!("Failed to read upload: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        if content.len() > MAX_IMPORT_BYTES {
            warn!("Rejected import of {} ({} bytes)", filename, content.len());
            return Err(ApiError::bad_request("File exceeds the 10 MB limit"));
        }
        upload = Some((filename, String::from_utf8_lossy(&content).replace('\x00', "")));
    }

    let (filename, content) =
        upload.ok_or_else(|| ApiError::bad_request("Missing multipart field `file`"))?;
    import(&state, &filename, &content).await
}

/// POST /import/text - Import file content sent as JSON
#[utoipa::path(
    post,
    path = "/import/text",
    tag = "Import",
    request_body = ImportTextRequest,
    responses(
        (status = 200, description = "Diagram replaced", body = ImportSummary),
        (status = 400, description = "Not a valid diagram"),
        (status = 415, description = "Unsupported file type")
    )
)]
pub async fn import_text(
    State(state): State<AppState>,
    Json(request): Json<ImportTextRequest>,
) -> Result<Json<ImportSummary>, ApiError> {
    import(&state, &request.filename, &request.content).await
}

async fn import(
    state: &AppState,
    filename: &str,
    content: &str,
) -> Result<Json<ImportSummary>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    let summary = ImportService::import_into(&mut mapper, filename, content)?;
    info!(
        "[Import] {} loaded {} node(s) and {} edge(s)",
        filename, summary.nodes, summary.edges
    );
    Ok(Json(summary))
}
