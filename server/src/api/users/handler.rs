//! Users API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, AppError, AppResult, ErrorCode, Paginated};

use crate::auth::CurrentUser;
use crate::db::models::{Address, Order, PublicUser};
use crate::db::repository::{UserRepository, record_id};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
};

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct AdminUpdateRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Serialize)]
pub struct UserStats {
    pub order_count: u64,
    pub total_spent: f64,
    pub orders: Vec<Order>,
}

#[derive(Serialize)]
pub struct UserWithStats {
    pub user: PublicUser,
    pub stats: UserStats,
}

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let me = state.auth.me(&user.id).await?;
    Ok(Json(ApiResponse::success(me)))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    validate_optional_text(&req.first_name, "first_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.last_name, "last_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let users = UserRepository::new(state.db.clone());
    let updated = users
        .update(
            &user.id,
            req.first_name,
            req.last_name,
            req.phone,
            req.address,
            None,
        )
        .await?;

    Ok(Json(ApiResponse::success(updated.into())))
}

/// PUT /api/users/password
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .auth
        .change_password(&user.id, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok("Password updated")))
}

/// GET /api/users - admin page of users
pub async fn admin_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<PublicUser>>>> {
    let users = UserRepository::new(state.db.clone());
    let (page_users, total) = users.find_page(query.page, query.limit).await?;

    let items = page_users.into_iter().map(PublicUser::from).collect();
    Ok(Json(ApiResponse::success(Paginated::new(
        items,
        total,
        query.page,
        query.limit,
    ))))
}

/// GET /api/users/{id} - admin
pub async fn admin_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// GET /api/users/{id}/stats - admin, per-user order statistics
pub async fn admin_user_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<UserWithStats>>> {
    let users = UserRepository::new(state.db.clone());
    let user = users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let (orders, order_count, total_spent) = state.engine.user_stats(&id).await?;

    Ok(Json(ApiResponse::success(UserWithStats {
        user: user.into(),
        stats: UserStats {
            order_count,
            total_spent,
            orders,
        },
    })))
}

/// PUT /api/users/{id} - admin edit (role is immutable)
pub async fn admin_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdminUpdateRequest>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    validate_optional_text(&req.first_name, "first_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.last_name, "last_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let users = UserRepository::new(state.db.clone());
    let updated = users
        .update(
            &id,
            req.first_name,
            req.last_name,
            req.phone,
            req.address,
            req.is_active,
        )
        .await?;

    Ok(Json(ApiResponse::success(updated.into())))
}

/// DELETE /api/users/{id} - admin; self-delete forbidden
pub async fn admin_delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    if record_id("user", &id).to_string() == current.id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }

    let users = UserRepository::new(state.db.clone());
    if users.find_by_id(&id).await?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound));
    }

    users.delete(&id).await?;
    tracing::info!(user_id = %id, admin = %current.id, "User deleted");
    Ok(Json(ApiResponse::ok("User deleted")))
}
