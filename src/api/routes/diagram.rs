//! Diagram routes.
//!
//! The canvas is shared by every client of this server. Handlers lock the
//! controller for the duration of one operation.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::{
    Column, DiagramDocument, Edge, FontSize, FontWeight, Node, NodeKind, Notification, Position,
};
use crate::render::{EdgeGeometry, NodeView};
use crate::services::edge_editor::{EdgeEditorAction, EdgePatch};
use crate::services::mapper_service::{
    ContextAction, ContextTarget, DeletionSummary, InteractionState, KeyFocus, MapperService,
};

#[derive(Serialize, ToSchema)]
pub struct PaletteEntry {
    kind: NodeKind,
    label: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DropNodeRequest {
    kind: NodeKind,
    x: f64,
    y: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLabelRequest {
    label: String,
    font_size: Option<FontSize>,
    font_weight: Option<FontWeight>,
}

#[derive(Deserialize, ToSchema)]
pub struct MoveNodeRequest {
    x: f64,
    y: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct SetColumnsRequest {
    columns: Vec<Column>,
}

#[derive(Deserialize, ToSchema)]
pub struct ConnectRequest {
    source: String,
    target: String,
    source_handle: Option<String>,
    target_handle: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct KeyRequest {
    key: String,
    #[serde(default)]
    focus: KeyFocus,
}

#[derive(Serialize, ToSchema)]
pub struct KeyResponse {
    handled: bool,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteModeResponse {
    delete_mode: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ToggleColumnsResponse {
    expanded: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct ContextMenuRequest {
    target: ContextTarget,
    x: f64,
    y: f64,
}

/// Create the diagram router
pub fn diagram_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_diagram))
        .route("/state", get(get_interaction_state))
        .route("/notifications", get(take_notifications))
        .route("/nodes", get(list_node_views).post(drop_node))
        .route("/nodes/{id}", axum::routing::delete(delete_node))
        .route("/nodes/{id}/label", put(update_node_label))
        .route("/nodes/{id}/position", put(move_node))
        .route("/nodes/{id}/columns", put(set_node_columns))
        .route("/nodes/{id}/toggle-columns", post(toggle_columns))
        .route("/nodes/{id}/duplicate", post(duplicate_node))
        .route("/nodes/{id}/click", post(click_node))
        .route("/nodes/{id}/double-click", post(double_click_node))
        .route("/nodes/{id}/view", get(get_node_view))
        .route("/edges", post(connect))
        .route(
            "/edges/{id}",
            axum::routing::patch(patch_edge).delete(delete_edge),
        )
        .route("/edges/{id}/click", post(click_edge))
        .route("/edges/{id}/double-click", post(double_click_edge))
        .route("/edges/{id}/geometry", get(get_edge_geometry))
        .route("/edge-editor", post(edge_editor_action))
        .route("/pane/click", post(click_pane))
        .route("/delete-mode", post(toggle_delete_mode))
        .route("/keys", post(key_down))
        .route("/delete-selected", post(delete_selected))
        .route(
            "/context-menu",
            post(open_context_menu).delete(close_context_menu),
        )
        .route("/context-menu/{action}", post(context_menu_action))
}

/// GET /palette - Node kinds offered in the sidebar, in display order
#[utoipa::path(
    get,
    path = "/palette",
    tag = "Diagram",
    responses(
        (status = 200, description = "Palette entries", body = Vec<PaletteEntry>)
    )
)]
pub async fn get_palette() -> Json<Vec<PaletteEntry>> {
    Json(
        NodeKind::ALL
            .iter()
            .map(|kind| PaletteEntry {
                kind: *kind,
                label: kind.palette_label().to_string(),
            })
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/diagram",
    tag = "Diagram",
    responses(
        (status = 200, description = "Current diagram document", body = Object)
    )
)]
pub async fn get_diagram(State(state): State<AppState>) -> Json<DiagramDocument> {
    let mapper = state.mapper.lock().await;
    Json(mapper.document())
}

#[utoipa::path(
    get,
    path = "/diagram/state",
    tag = "Diagram",
    responses(
        (status = 200, description = "Selection, delete mode and open editors", body = Object)
    )
)]
pub async fn get_interaction_state(State(state): State<AppState>) -> Json<InteractionState> {
    let mapper = state.mapper.lock().await;
    Json(mapper.interaction())
}

/// GET /diagram/notifications - Drain queued notifications
#[utoipa::path(
    get,
    path = "/diagram/notifications",
    tag = "Diagram",
    responses(
        (status = 200, description = "Notifications raised since the last call", body = Vec<Notification>)
    )
)]
pub async fn take_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    let mut mapper = state.mapper.lock().await;
    Json(mapper.take_notifications())
}

#[utoipa::path(
    get,
    path = "/diagram/nodes",
    tag = "Diagram",
    responses(
        (status = 200, description = "Render descriptors for every node", body = Object)
    )
)]
pub async fn list_node_views(State(state): State<AppState>) -> Json<Vec<NodeView>> {
    let mapper = state.mapper.lock().await;
    Json(mapper.render_nodes())
}

/// POST /diagram/nodes - Drop a node from the palette
#[utoipa::path(
    post,
    path = "/diagram/nodes",
    tag = "Diagram",
    request_body = DropNodeRequest,
    responses(
        (status = 201, description = "Node created", body = Object)
    )
)]
pub async fn drop_node(
    State(state): State<AppState>,
    Json(request): Json<DropNodeRequest>,
) -> (StatusCode, Json<Node>) {
    let mut mapper = state.mapper.lock().await;
    let node = mapper
        .drop_node(request.kind, Position::new(request.x, request.y))
        .clone();
    (StatusCode::CREATED, Json(node))
}

#[utoipa::path(
    delete,
    path = "/diagram/nodes/{id}",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 204, description = "Node and its edges deleted"),
        (status = 404, description = "Node not found")
    )
)]
pub async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut mapper = state.mapper.lock().await;
    if mapper.delete_node(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Node not found: {}", id)))
    }
}

#[utoipa::path(
    put,
    path = "/diagram/nodes/{id}/label",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Node updated", body = Object),
        (status = 404, description = "Node not found")
    )
)]
pub async fn update_node_label(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateLabelRequest>,
) -> Result<Json<Node>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    if !mapper.update_node_label(&id, request.label, request.font_size, request.font_weight) {
        return Err(ApiError::not_found(format!("Node not found: {}", id)));
    }
    node_json(&mapper, &id)
}

#[utoipa::path(
    put,
    path = "/diagram/nodes/{id}/position",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    request_body = MoveNodeRequest,
    responses(
        (status = 200, description = "Node moved", body = Object),
        (status = 404, description = "Node not found")
    )
)]
pub async fn move_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveNodeRequest>,
) -> Result<Json<Node>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.move_node(&id, Position::new(request.x, request.y))?;
    node_json(&mapper, &id)
}

/// PUT /diagram/nodes/{id}/columns - Replace the column list of a database or schema node
#[utoipa::path(
    put,
    path = "/diagram/nodes/{id}/columns",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    request_body = SetColumnsRequest,
    responses(
        (status = 200, description = "Columns replaced", body = Object),
        (status = 400, description = "Node kind has no columns"),
        (status = 404, description = "Node not found")
    )
)]
pub async fn set_node_columns(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetColumnsRequest>,
) -> Result<Json<Node>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.set_node_columns(&id, request.columns)?;
    node_json(&mapper, &id)
}

#[utoipa::path(
    post,
    path = "/diagram/nodes/{id}/toggle-columns",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "New expansion state", body = ToggleColumnsResponse),
        (status = 400, description = "Node kind has no columns"),
        (status = 404, description = "Node not found")
    )
)]
pub async fn toggle_columns(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleColumnsResponse>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    let expanded = mapper.toggle_columns(&id)?;
    Ok(Json(ToggleColumnsResponse { expanded }))
}

/// POST /diagram/nodes/{id}/duplicate - Copy a node 50 units down and right
#[utoipa::path(
    post,
    path = "/diagram/nodes/{id}/duplicate",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 201, description = "Duplicate created", body = Object),
        (status = 404, description = "Node not found")
    )
)]
pub async fn duplicate_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Node>), ApiError> {
    let mut mapper = state.mapper.lock().await;
    let copy = mapper.duplicate_node(&id)?.clone();
    Ok((StatusCode::CREATED, Json(copy)))
}

/// POST /diagram/nodes/{id}/click - Select the node, or delete it in delete mode
#[utoipa::path(
    post,
    path = "/diagram/nodes/{id}/click",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "Interaction state after the click", body = Object),
        (status = 404, description = "Node not found")
    )
)]
pub async fn click_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InteractionState>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.click_node(&id)?;
    Ok(Json(mapper.interaction()))
}

#[utoipa::path(
    post,
    path = "/diagram/nodes/{id}/double-click",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "Interaction state with the property dialog open", body = Object),
        (status = 404, description = "Node not found")
    )
)]
pub async fn double_click_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InteractionState>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.double_click_node(&id)?;
    Ok(Json(mapper.interaction()))
}

#[utoipa::path(
    get,
    path = "/diagram/nodes/{id}/view",
    tag = "Diagram",
    params(("id" = String, Path, description = "Node id")),
    responses(
        (status = 200, description = "Render descriptor", body = Object),
        (status = 404, description = "Node not found")
    )
)]
pub async fn get_node_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NodeView>, ApiError> {
    let mapper = state.mapper.lock().await;
    mapper
        .render_node(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Node not found: {}", id)))
}

/// POST /diagram/edges - Connect two anchors
#[utoipa::path(
    post,
    path = "/diagram/edges",
    tag = "Diagram",
    request_body = ConnectRequest,
    responses(
        (status = 201, description = "Edge created", body = Object),
        (status = 400, description = "Connection not allowed"),
        (status = 404, description = "Endpoint not found"),
        (status = 409, description = "Edge already exists")
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Result<(StatusCode, Json<Edge>), ApiError> {
    let mut mapper = state.mapper.lock().await;
    let edge = mapper
        .connect(
            &request.source,
            &request.target,
            request.source_handle,
            request.target_handle,
        )?
        .clone();
    Ok((StatusCode::CREATED, Json(edge)))
}

#[utoipa::path(
    patch,
    path = "/diagram/edges/{id}",
    tag = "Diagram",
    params(("id" = String, Path, description = "Edge id")),
    request_body = EdgePatch,
    responses(
        (status = 200, description = "Edge updated", body = Object),
        (status = 404, description = "Edge not found")
    )
)]
pub async fn patch_edge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EdgePatch>,
) -> Result<Json<Edge>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    let edge = mapper.update_edge(&id, &patch)?.clone();
    Ok(Json(edge))
}

#[utoipa::path(
    delete,
    path = "/diagram/edges/{id}",
    tag = "Diagram",
    params(("id" = String, Path, description = "Edge id")),
    responses(
        (status = 204, description = "Edge deleted"),
        (status = 404, description = "Edge not found")
    )
)]
pub async fn delete_edge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut mapper = state.mapper.lock().await;
    if mapper.delete_edge(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Edge not found: {}", id)))
    }
}

#[utoipa::path(
    post,
    path = "/diagram/edges/{id}/click",
    tag = "Diagram",
    params(("id" = String, Path, description = "Edge id")),
    responses(
        (status = 200, description = "Interaction state after the click", body = Object),
        (status = 404, description = "Edge not found")
    )
)]
pub async fn click_edge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InteractionState>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.click_edge(&id)?;
    Ok(Json(mapper.interaction()))
}

#[utoipa::path(
    post,
    path = "/diagram/edges/{id}/double-click",
    tag = "Diagram",
    params(("id" = String, Path, description = "Edge id")),
    responses(
        (status = 200, description = "Interaction state with the edge editor open", body = Object),
        (status = 404, description = "Edge not found")
    )
)]
pub async fn double_click_edge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InteractionState>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.double_click_edge(&id)?;
    Ok(Json(mapper.interaction()))
}

#[utoipa::path(
    get,
    path = "/diagram/edges/{id}/geometry",
    tag = "Diagram",
    params(("id" = String, Path, description = "Edge id")),
    responses(
        (status = 200, description = "Path and label placement", body = Object),
        (status = 404, description = "Edge not found")
    )
)]
pub async fn get_edge_geometry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EdgeGeometry>, ApiError> {
    let mapper = state.mapper.lock().await;
    mapper
        .edge_geometry(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Edge not found: {}", id)))
}

/// POST /diagram/edge-editor - Apply an action in the open edge editor
#[utoipa::path(
    post,
    path = "/diagram/edge-editor",
    tag = "Diagram",
    request_body = EdgeEditorAction,
    responses(
        (status = 200, description = "Interaction state after the action", body = Object),
        (status = 409, description = "No edge editor is open")
    )
)]
pub async fn edge_editor_action(
    State(state): State<AppState>,
    Json(action): Json<EdgeEditorAction>,
) -> Result<Json<InteractionState>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.edge_editor_action(action)?;
    Ok(Json(mapper.interaction()))
}

#[utoipa::path(
    post,
    path = "/diagram/pane/click",
    tag = "Diagram",
    responses(
        (status = 200, description = "Interaction state after clearing selection", body = Object)
    )
)]
pub async fn click_pane(State(state): State<AppState>) -> Json<InteractionState> {
    let mut mapper = state.mapper.lock().await;
    mapper.click_pane();
    Json(mapper.interaction())
}

#[utoipa::path(
    post,
    path = "/diagram/delete-mode",
    tag = "Diagram",
    responses(
        (status = 200, description = "Delete mode after the toggle", body = DeleteModeResponse)
    )
)]
pub async fn toggle_delete_mode(State(state): State<AppState>) -> Json<DeleteModeResponse> {
    let mut mapper = state.mapper.lock().await;
    let delete_mode = mapper.toggle_delete_mode();
    Json(DeleteModeResponse { delete_mode })
}

/// POST /diagram/keys - Key press on the canvas
#[utoipa::path(
    post,
    path = "/diagram/keys",
    tag = "Diagram",
    request_body = KeyRequest,
    responses(
        (status = 200, description = "Whether the canvas handled the key", body = KeyResponse)
    )
)]
pub async fn key_down(
    State(state): State<AppState>,
    Json(request): Json<KeyRequest>,
) -> Json<KeyResponse> {
    let mut mapper = state.mapper.lock().await;
    let handled = mapper.key_down(&request.key, request.focus);
    Json(KeyResponse { handled })
}

#[utoipa::path(
    post,
    path = "/diagram/delete-selected",
    tag = "Diagram",
    responses(
        (status = 200, description = "Number of nodes and edges removed", body = DeletionSummary)
    )
)]
pub async fn delete_selected(State(state): State<AppState>) -> Json<DeletionSummary> {
    let mut mapper = state.mapper.lock().await;
    Json(mapper.delete_selected_elements())
}

#[utoipa::path(
    post,
    path = "/diagram/context-menu",
    tag = "Diagram",
    request_body = ContextMenuRequest,
    responses(
        (status = 200, description = "Interaction state with the menu open", body = Object),
        (status = 404, description = "Target not found")
    )
)]
pub async fn open_context_menu(
    State(state): State<AppState>,
    Json(request): Json<ContextMenuRequest>,
) -> Result<Json<InteractionState>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.open_context_menu(request.target, request.x, request.y)?;
    Ok(Json(mapper.interaction()))
}

#[utoipa::path(
    delete,
    path = "/diagram/context-menu",
    tag = "Diagram",
    responses(
        (status = 204, description = "Menu closed")
    )
)]
pub async fn close_context_menu(State(state): State<AppState>) -> StatusCode {
    let mut mapper = state.mapper.lock().await;
    mapper.close_context_menu();
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    post,
    path = "/diagram/context-menu/{action}",
    tag = "Diagram",
    params(("action" = ContextAction, Path, description = "duplicate or delete")),
    responses(
        (status = 200, description = "Interaction state after the action", body = Object),
        (status = 409, description = "No context menu is open")
    )
)]
pub async fn context_menu_action(
    State(state): State<AppState>,
    Path(action): Path<ContextAction>,
) -> Result<Json<InteractionState>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    mapper.context_menu_action(action)?;
    Ok(Json(mapper.interaction()))
}

fn node_json(mapper: &MapperService, id: &str) -> Result<Json<Node>, ApiError> {
    mapper
        .node(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Node not found: {}", id)))
}
