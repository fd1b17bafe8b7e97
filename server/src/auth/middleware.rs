//! Authentication middleware
//!
//! Tokens ride on the custom `x-auth-token` header (not a cookie, not
//! an Authorization bearer) - the wire contract the storefront client
//! already speaks.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use shared::{AppError, ErrorCode};

use crate::auth::{CurrentUser, JwtError};
use crate::state::AppState;

/// Header carrying the signed token
pub const AUTH_HEADER: &str = "x-auth-token";

/// Require a valid token; injects [`CurrentUser`] into request extensions
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match req.headers().get(AUTH_HEADER).and_then(|h| h.to_str().ok()) {
        Some(token) if !token.is_empty() => token,
        _ => {
            tracing::warn!(target: "security", uri = %req.uri(), "Request without auth token");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt.validate_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser::from(claims));
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(
                target: "security",
                error = %e,
                uri = %req.uri(),
                "Token validation failed"
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid or expired token")),
            }
        }
    }
}

/// Require the admin role (must run after [`require_auth`])
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;

    if !user.is_admin() {
        tracing::warn!(
            target: "security",
            user_id = %user.id,
            email = %user.email,
            "Admin access denied"
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// Extractor for protected handlers
///
/// Reuses the middleware-injected user when present, otherwise
/// validates the header itself.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(AppError::unauthorized)?;

        match state.jwt.validate_token(token) {
            Ok(claims) => {
                let user = CurrentUser::from(claims);
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(JwtError::ExpiredToken) => Err(AppError::token_expired()),
            Err(_) => Err(AppError::invalid_token("Invalid or expired token")),
        }
    }
}
