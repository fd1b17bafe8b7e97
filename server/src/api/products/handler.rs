//! Product API handlers
//!
//! Admin mutations push live events to the admin channel and trigger a
//! stats broadcast; product creation additionally announces to the
//! client mailing list, best-effort.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::{ApiResponse, AppError, AppResult, ErrorCode, Paginated};

use crate::auth::CurrentUser;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::{ProductRepository, UserRepository};
use crate::services::LiveEvent;
use crate::state::AppState;

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
    12
}

/// GET /api/products - public, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Product>>>> {
    let repo = ProductRepository::new(state.db.clone());
    let (products, total) = repo.find_page(query.page, query.limit).await?;

    Ok(Json(ApiResponse::success(Paginated::new(
        products,
        total,
        query.page,
        query.limit,
    ))))
}

/// GET /api/products/{id} - public
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    Ok(Json(ApiResponse::success(product)))
}

/// POST /api/products - admin
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(req).await?;

    tracing::info!(product_id = %product.id_string(), admin = %user.id, "Product created");

    state.events.publish(LiveEvent::ProductAdded {
        product: product.clone(),
        actor: user.id.clone(),
    });
    state.emit_stats_update();

    // Announce to active clients; advisory only
    let users = UserRepository::new(state.db.clone());
    let notifier = state.notifier.clone();
    let announced = product.clone();
    tokio::spawn(async move {
        let recipients = match users.client_emails().await {
            Ok(emails) => emails,
            Err(e) => {
                tracing::warn!(error = %e, "Client email lookup failed");
                return;
            }
        };
        if recipients.is_empty() {
            return;
        }
        if let Err(e) = notifier.send_new_product(&recipients, &announced).await {
            tracing::warn!(error = %e, "New-product announcement failed");
        }
    });

    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// PUT /api/products/{id} - admin
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, req).await?;

    tracing::info!(product_id = %product.id_string(), admin = %user.id, "Product updated");

    state.events.publish(LiveEvent::ProductUpdated {
        product: product.clone(),
        actor: user.id.clone(),
    });
    state.emit_stats_update();

    Ok(Json(ApiResponse::success(product)))
}

/// DELETE /api/products/{id} - admin
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = ProductRepository::new(state.db.clone());
    let full_id = crate::db::repository::record_id("product", &id).to_string();
    repo.delete(&id).await?;

    tracing::info!(product_id = %full_id, admin = %user.id, "Product deleted");

    state.events.publish(LiveEvent::ProductDeleted {
        id: full_id,
        actor: user.id.clone(),
    });
    state.emit_stats_update();

    Ok(Json(ApiResponse::ok("Product deleted")))
}
