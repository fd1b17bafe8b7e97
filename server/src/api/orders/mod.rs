//! Order API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_admin, require_auth};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let user_routes = Router::new()
        .route("/", post(handler::create).get(handler::list_mine))
        .route("/custom", post(handler::create_custom))
        .route("/{id}", get(handler::get_by_id));

    let admin_routes = Router::new()
        .route("/admin/all", get(handler::admin_list))
        .route("/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_admin));

    Router::new().nest(
        "/api/orders",
        user_routes
            .merge(admin_routes)
            .layer(middleware::from_fn_with_state(state, require_auth)),
    )
}
