//! Saved flow routes.
//!
//! All endpoints require JWT authentication via Authorization header. Each
//! request drives its own flows dialog, refreshed from the store, so the
//! listing and the limit check always reflect the caller's saved flows.
//! While a user holds the canvas session, other users' changes are refused.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{DiagramDocument, Flow, FlowSummary};
use crate::services::flows_dialog::FlowsDialog;
use crate::services::mapper_service::MapperService;
use crate::services::session_service::UserIdentity;

#[derive(Serialize, ToSchema)]
pub struct FlowListResponse {
    flows: Vec<FlowSummary>,
    count: usize,
    limit: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveFlowRequest {
    name: String,
}

/// Create the flows router
pub fn flows_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_flows).post(save_flow))
        .route(
            "/{id}",
            get(get_flow).put(update_flow).delete(delete_flow),
        )
        .route("/{id}/load", post(load_flow))
}

async fn open_dialog(
    state: &AppState,
    identity: &UserIdentity,
    mapper: &mut MapperService,
) -> FlowsDialog {
    let mut dialog =
        FlowsDialog::with_session(state.flow_store.clone(), state.session.subscribe());
    if let Some(ticket) = dialog.open(Some(identity)) {
        let result = FlowsDialog::fetch(dialog.store(), ticket).await;
        dialog.apply_refresh(result, mapper);
    }
    dialog
}

/// GET /flows - List the caller's flows, newest first
#[utoipa::path(
    get,
    path = "/flows",
    tag = "Flows",
    responses(
        (status = 200, description = "Saved flows with count and limit", body = FlowListResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_flows(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<FlowListResponse>, ApiError> {
    // The dialog swallows listing errors into a notification; ask the store
    // directly so the caller sees them.
    let flows = state.flow_store.list_flows(auth.identity.user_id).await?;
    let count = state.flow_store.count_flows(auth.identity.user_id).await?;
    Ok(Json(FlowListResponse {
        flows: flows.iter().map(FlowSummary::from).collect(),
        count,
        limit: state.flow_store.flow_limit(),
    }))
}

/// POST /flows - Save the current diagram under a new name
#[utoipa::path(
    post,
    path = "/flows",
    tag = "Flows",
    request_body = SaveFlowRequest,
    responses(
        (status = 201, description = "Flow saved", body = Flow),
        (status = 400, description = "Name is empty"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Canvas session held by another user"),
        (status = 409, description = "Flow limit reached")
    ),
    security(("bearer_auth" = []))
)]
pub async fn save_flow(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<SaveFlowRequest>,
) -> Result<(StatusCode, Json<Flow>), ApiError> {
    let mut mapper = state.mapper.lock().await;
    let mut dialog = open_dialog(&state, &auth.identity, &mut mapper).await;
    dialog.set_new_flow_name(request.name);
    let flow = dialog.save_new(Some(&auth.identity), &mut mapper).await?;
    Ok((StatusCode::CREATED, Json(flow)))
}

#[utoipa::path(
    get,
    path = "/flows/{id}",
    tag = "Flows",
    params(("id" = Uuid, Path, description = "Flow id")),
    responses(
        (status = 200, description = "Saved flow", body = Flow),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Flow not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_flow(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Flow>, ApiError> {
    let flow = state.flow_store.get_flow(auth.identity.user_id, id).await?;
    Ok(Json(flow))
}

/// PUT /flows/{id} - Overwrite a flow with the current diagram
#[utoipa::path(
    put,
    path = "/flows/{id}",
    tag = "Flows",
    params(("id" = Uuid, Path, description = "Flow id")),
    responses(
        (status = 200, description = "Flow updated", body = Flow),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Canvas session held by another user"),
        (status = 404, description = "Flow not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_flow(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Flow>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    let mut dialog = open_dialog(&state, &auth.identity, &mut mapper).await;
    let flow = dialog.update(Some(&auth.identity), id, &mut mapper).await?;
    Ok(Json(flow))
}

#[utoipa::path(
    delete,
    path = "/flows/{id}",
    tag = "Flows",
    params(("id" = Uuid, Path, description = "Flow id")),
    responses(
        (status = 204, description = "Flow deleted"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Canvas session held by another user"),
        (status = 404, description = "Flow not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_flow(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut mapper = state.mapper.lock().await;
    let mut dialog = open_dialog(&state, &auth.identity, &mut mapper).await;
    dialog.delete(Some(&auth.identity), id, &mut mapper).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /flows/{id}/load - Replace the canvas with a saved flow
#[utoipa::path(
    post,
    path = "/flows/{id}/load",
    tag = "Flows",
    params(("id" = Uuid, Path, description = "Flow id")),
    responses(
        (status = 200, description = "Diagram now on the canvas", body = Object),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Canvas session held by another user"),
        (status = 404, description = "Flow not found"),
        (status = 422, description = "Saved data is not a valid diagram")
    ),
    security(("bearer_auth" = []))
)]
pub async fn load_flow(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagramDocument>, ApiError> {
    let mut mapper = state.mapper.lock().await;
    let mut dialog = open_dialog(&state, &auth.identity, &mut mapper).await;
    dialog.load(Some(&auth.identity), id, &mut mapper).await?;
    Ok(Json(mapper.document()))
}
