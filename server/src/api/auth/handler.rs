//! Auth API handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, AppResult};

use crate::auth::{AuthResponse, CurrentUser, OAuthProfile, OAuthProvider, RegisterRequest};
use crate::db::models::{PublicUser, Role};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CheckRoleRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let response = state.auth.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(response)),
    ))
}

/// POST /api/auth/login - client entry point
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// POST /api/auth/admin-login - admin entry point
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = state.auth.admin_login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// POST /api/auth/check-role - login-page helper
pub async fn check_role(
    State(state): State<AppState>,
    Json(req): Json<CheckRoleRequest>,
) -> AppResult<Json<ApiResponse<RoleResponse>>> {
    let role = state.auth.check_role(&req.email).await?;
    Ok(Json(ApiResponse::success(RoleResponse { role })))
}

/// POST /api/auth/oauth/{provider} - link a verified external identity
pub async fn oauth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(profile): Json<OAuthProfile>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let provider: OAuthProvider = provider.parse()?;
    let response = state.auth.oauth_link(provider, profile).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let me = state.auth.me(&user.id).await?;
    Ok(Json(ApiResponse::success(me)))
}
