//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::{ApiResponse, AppResult, Paginated};

use crate::auth::CurrentUser;
use crate::db::models::Order;
use crate::orders::{CreateOrderRequest, CustomOrderRequest};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub status: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// POST /api/orders - convert the cart into an order
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let order = state.engine.create_order(&user.id, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// POST /api/orders/custom - customized item, bypasses the catalog
pub async fn create_custom(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CustomOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let order = state.engine.create_custom_order(&user.id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Custom order created",
            order,
        )),
    ))
}

/// GET /api/orders - the caller's own orders
pub async fn list_mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.engine.list_for_user(&user.id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /api/orders/{id} - owner or admin
pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.engine.get_for_user(&id, &user).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// GET /api/orders/admin/all - admin page, optional status filter
pub async fn admin_list(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Order>>>> {
    let page = state
        .engine
        .list_all(query.page, query.limit, query.status.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// PUT /api/orders/{id}/status - admin status transition
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .engine
        .update_status(&id, &req.status, req.tracking_number)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
