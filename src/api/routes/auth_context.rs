//! Authentication context extractors.
//!
//! Identity comes from a bearer access token in the Authorization header.

use super::app_state::AppState;
use crate::services::jwt_service::JwtService;
use crate::services::session_service::UserIdentity;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};
use std::convert::Infallible;

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub identity: UserIdentity,
    pub session_id: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_bearer_token)
            .ok_or_else(|| {
                tracing::warn!("No authorization token provided");
                StatusCode::UNAUTHORIZED
            })?;

        let claims = state.jwt.validate_access_token(token).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        let user_id = claims.user_id().map_err(|e| {
            tracing::warn!("JWT has an unusable subject claim: {}", e);
            StatusCode::BAD_REQUEST
        })?;

        Ok(AuthContext {
            identity: UserIdentity::new(user_id, claims.email),
            session_id: claims.session_id,
        })
    }
}

/// Authentication context when a valid token is present; never rejects.
#[derive(Clone, Debug)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuth(
            AuthContext::from_request_parts(parts, state).await.ok(),
        ))
    }
}
