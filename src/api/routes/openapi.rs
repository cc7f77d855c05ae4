//! OpenAPI specification endpoints.
//!
//! Serves the generated OpenAPI document and a landing page linking to it.

use axum::{
    Router,
    response::{Html, Json},
    routing::get,
};
use utoipa::OpenApi;

use super::super::openapi::ApiDoc;
use super::app_state::AppState;

/// Create the OpenAPI router
pub fn openapi_router() -> Router<AppState> {
    Router::new()
        .route("/openapi.json", get(serve_openapi_json))
        .route("/swagger", get(serve_swagger_html))
}

/// GET /openapi.json - Serve the OpenAPI specification as JSON
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "OpenAPI",
    responses(
        (status = 200, description = "OpenAPI specification", body = Object)
    )
)]
pub async fn serve_openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /swagger - Landing page pointing at the spec and the editors that read it
pub async fn serve_swagger_html() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Process Mapper API</title>
    <style>
        body { font-family: sans-serif; max-width: 720px; margin: 40px auto; }
        code { background: #f3f4f6; padding: 2px 4px; }
    </style>
</head>
<body>
    <h1>Process Mapper API</h1>
    <p>The OpenAPI document is served at <a href="/api/v1/openapi.json"><code>/api/v1/openapi.json</code></a>.</p>
    <p>Paste that URL into <a href="https://editor.swagger.io" target="_blank">Swagger Editor</a>
       or import it into Postman to browse the diagram, import, export and flow endpoints.</p>
</body>
</html>
"#,
    )
}
