//! Auth API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_auth;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/admin-login", post(handler::admin_login))
        .route("/check-role", post(handler::check_role))
        .route("/oauth/{provider}", post(handler::oauth));

    let protected = Router::new()
        .route("/me", get(handler::me))
        .layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().nest("/api/auth", public.merge(protected))
}
