//! API routing
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - registration, login, OAuth linking
//! - [`admin`] - bootstrap, contact info, dashboard stats
//! - [`users`] - profile and admin user management
//! - [`products`] - catalog (public read, admin write)
//! - [`cart`] - per-user cart
//! - [`orders`] - order creation and lifecycle
//! - [`settings`] - store settings (public read)
//! - [`ws`] - admin live channel

pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;
pub mod ws;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router
pub fn router(state: AppState) -> Router {
    let cors = match state.config.client_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(
                origin = %state.config.client_url,
                "Invalid CLIENT_URL, falling back to permissive CORS"
            );
            CorsLayer::permissive()
        }
    };

    Router::new()
        .merge(health::router())
        .merge(auth::router(state.clone()))
        .merge(admin::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(products::router(state.clone()))
        .merge(cart::router(state.clone()))
        .merge(orders::router(state.clone()))
        .merge(settings::router())
        .merge(ws::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
