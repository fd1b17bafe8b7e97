//! Admin API handlers

use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::RegisterRequest;
use crate::db::models::PublicUser;
use crate::db::repository::{OrderRepository, UserRepository};
use crate::services::compute_stats;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AdminCheck {
    pub exists: bool,
}

#[derive(Serialize)]
pub struct AdminInfo {
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Serialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub revenue: f64,
    pub orders_by_status: HashMap<String, u64>,
}

/// GET /api/admin/check - is the store bootstrapped?
pub async fn check(State(state): State<AppState>) -> AppResult<Json<ApiResponse<AdminCheck>>> {
    let users = UserRepository::new(state.db.clone());
    let exists = users.find_admin().await?.is_some();
    Ok(Json(ApiResponse::success(AdminCheck { exists })))
}

/// POST /api/admin/setup - bootstrap the single administrator
pub async fn setup(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PublicUser>>)> {
    let admin = state.auth.admin_bootstrap(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Administrator account created",
            admin,
        )),
    ))
}

/// GET /api/admin/info - store contact block (public, for the footer)
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ApiResponse<AdminInfo>>> {
    let users = UserRepository::new(state.db.clone());
    let admin = users
        .find_admin()
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, "No administrator found"))?;

    let address = admin
        .address
        .as_ref()
        .filter(|a| !a.street.is_empty() && !a.city.is_empty())
        .map(|a| {
            let mut formatted = format!("{}, {} {}", a.street, a.postal_code, a.city);
            if !a.country.is_empty() {
                formatted.push_str(&format!(", {}", a.country));
            }
            formatted
        })
        .unwrap_or_else(|| "Rue de la Mode, 1000 Tunis".to_string());

    Ok(Json(ApiResponse::success(AdminInfo {
        email: admin.email,
        phone: admin.phone.unwrap_or_else(|| "+216 00 000 000".into()),
        address,
    })))
}

/// GET /api/admin/stats - dashboard counters
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<AdminStats>>> {
    let snapshot = compute_stats(&state.db).await?;

    let orders = OrderRepository::new(state.db.clone());
    let orders_by_status = orders
        .counts_by_status()
        .await?
        .into_iter()
        .map(|(status, count)| (status.as_str().to_string(), count))
        .collect();

    Ok(Json(ApiResponse::success(AdminStats {
        total_users: snapshot.total_users,
        total_products: snapshot.total_products,
        total_orders: snapshot.total_orders,
        revenue: snapshot.revenue,
        orders_by_status,
    })))
}
