//! Authentication routes.
//!
//! Tokens are issued by the identity provider; these endpoints report who a
//! token belongs to and refresh it. The canvas session is taken with
//! `POST /auth/session` and released with `POST /auth/logout`.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::{AuthContext, MaybeAuth};
use super::error::ApiError;
use crate::services::jwt_service::TokenPair;
use crate::services::session_service::UserIdentity;

#[derive(Serialize, ToSchema)]
pub struct AuthStatusResponse {
    authenticated: bool,
    user: Option<UserIdentity>,
    /// Holder of the canvas session, if anyone.
    session: Option<UserIdentity>,
}

#[derive(Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    refresh_token: String,
}

/// Create the auth router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(auth_status))
        .route("/session", post(sign_in))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
}

/// GET /auth/status - Identity behind the bearer token, if any
#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "Auth",
    responses(
        (status = 200, description = "Authentication status", body = AuthStatusResponse)
    )
)]
pub async fn auth_status(
    State(state): State<AppState>,
    MaybeAuth(auth): MaybeAuth,
) -> Json<AuthStatusResponse> {
    let user = auth.map(|auth| auth.identity);
    Json(AuthStatusResponse {
        authenticated: user.is_some(),
        user,
        session: state.session.current(),
    })
}

/// POST /auth/session - Take the canvas session as the token's user
///
/// Open flows dialogs are closed when the holder changes.
#[utoipa::path(
    post,
    path = "/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Session now held by the caller", body = AuthStatusResponse),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn sign_in(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Json<AuthStatusResponse> {
    if state.session.current().as_ref() != Some(&auth.identity) {
        info!("Session signed in as {}", auth.identity.email);
        state.session.sign_in(auth.identity.clone());
    }
    Json(AuthStatusResponse {
        authenticated: true,
        user: Some(auth.identity.clone()),
        session: Some(auth.identity),
    })
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = Object),
        (status = 401, description = "Refresh token invalid or expired")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    state
        .jwt
        .refresh_access_token(&request.refresh_token)
        .map(Json)
        .map_err(|e| {
            warn!("Token refresh failed: {}", e);
            ApiError::new(StatusCode::UNAUTHORIZED, e)
        })
}

/// POST /auth/logout - Clear the canvas session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> StatusCode {
    if state.session.current().as_ref() == Some(&auth.identity) {
        state.session.sign_out();
        info!("Session signed out ({})", auth.identity.email);
    }
    StatusCode::NO_CONTENT
}
