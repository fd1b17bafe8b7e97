//! Cart API handlers
//!
//! The stock check on add/update is a courtesy guard at cart time;
//! order creation itself never re-validates availability.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, AppError, AppResult, ErrorCode, util};

use crate::auth::CurrentUser;
use crate::db::models::Cart;
use crate::db::repository::{CartRepository, ProductRepository, record_id};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
    pub size: String,
    pub color: String,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Cart line enriched with catalog details for display
#[derive(Serialize)]
pub struct CartItemView {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: i64,
    pub size: String,
    pub color: String,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: f64,
    pub item_count: i64,
}

#[derive(Serialize)]
pub struct CartCount {
    pub item_count: i64,
}

async fn build_view(state: &AppState, cart: &Cart) -> AppResult<CartView> {
    let products = ProductRepository::new(state.db.clone());

    let mut items = Vec::with_capacity(cart.items.len());
    for line in &cart.items {
        let product = products.find_by_id(&line.product.to_string()).await?;
        let (name, brand, image) = match product {
            Some(p) => (
                p.name,
                p.brand,
                p.images.first().map(|i| i.url.clone()),
            ),
            None => (String::new(), String::new(), None),
        };

        items.push(CartItemView {
            id: line.id.clone(),
            product_id: line.product.to_string(),
            name,
            brand,
            image,
            quantity: line.quantity,
            size: line.size.clone(),
            color: line.color.clone(),
            unit_price: line.unit_price,
            line_total: line.unit_price * line.quantity as f64,
        });
    }

    Ok(CartView {
        items,
        total: cart.total(),
        item_count: cart.item_count(),
    })
}

/// GET /api/cart - created lazily on first read
pub async fn get_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let carts = CartRepository::new(state.db.clone());
    let cart = carts.get_or_create(&record_id("user", &user.id)).await?;
    let view = build_view(&state, &cart).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    if req.quantity < 1 {
        return Err(AppError::validation("quantity must be at least 1"));
    }

    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&req.product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    match product.stock_for(&req.size) {
        Some(stock) if stock >= req.quantity => {}
        _ => return Err(AppError::new(ErrorCode::InsufficientStock)),
    }

    let carts = CartRepository::new(state.db.clone());
    let mut cart = carts.get_or_create(&record_id("user", &user.id)).await?;
    cart.add_line(
        record_id("product", &req.product_id),
        req.quantity,
        req.size,
        req.color,
        product.effective_price(),
        util::now_millis(),
    );

    let saved = carts.save_items(&cart).await?;
    let view = build_view(&state, &saved).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// PUT /api/cart/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    if req.quantity < 1 {
        return Err(AppError::validation("quantity must be at least 1"));
    }

    let carts = CartRepository::new(state.db.clone());
    let mut cart = carts
        .find_by_user(&record_id("user", &user.id))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;

    let line = cart
        .items
        .iter_mut()
        .find(|item| item.id == item_id)
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;

    let products = ProductRepository::new(state.db.clone());
    let product = products.find_by_id(&line.product.to_string()).await?;
    match product.as_ref().and_then(|p| p.stock_for(&line.size)) {
        Some(stock) if stock >= req.quantity => {}
        _ => return Err(AppError::new(ErrorCode::InsufficientStock)),
    }

    line.quantity = req.quantity;
    let saved = carts.save_items(&cart).await?;
    let view = build_view(&state, &saved).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// DELETE /api/cart/items/{item_id}
pub async fn remove_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let carts = CartRepository::new(state.db.clone());
    let mut cart = carts
        .find_by_user(&record_id("user", &user.id))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;

    if !cart.remove_line(&item_id, util::now_millis()) {
        return Err(AppError::new(ErrorCode::CartItemNotFound));
    }

    let saved = carts.save_items(&cart).await?;
    let view = build_view(&state, &saved).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    let carts = CartRepository::new(state.db.clone());
    carts.clear(&record_id("user", &user.id)).await?;
    Ok(Json(ApiResponse::ok("Cart cleared")))
}

/// GET /api/cart/count
pub async fn count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let carts = CartRepository::new(state.db.clone());
    let item_count = carts
        .find_by_user(&record_id("user", &user.id))
        .await?
        .map(|cart| cart.item_count())
        .unwrap_or(0);

    Ok(Json(ApiResponse::success(CartCount { item_count })))
}
