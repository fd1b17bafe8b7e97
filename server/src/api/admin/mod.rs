//! Admin API module (bootstrap, contact info, dashboard stats)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{require_admin, require_auth};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/check", get(handler::check))
        .route("/setup", post(handler::setup))
        .route("/info", get(handler::info));

    let protected = Router::new()
        .route("/stats", get(handler::stats))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().nest("/api/admin", public.merge(protected))
}
