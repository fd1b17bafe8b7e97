//! Users API module (profile + admin user management)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{require_admin, require_auth};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let profile = Router::new()
        .route(
            "/profile",
            get(handler::get_profile).put(handler::update_profile),
        )
        .route("/password", put(handler::change_password));

    let admin = Router::new()
        .route("/", get(handler::admin_list))
        .route(
            "/{id}",
            get(handler::admin_get)
                .put(handler::admin_update)
                .delete(handler::admin_delete),
        )
        .route("/{id}/stats", get(handler::admin_user_stats))
        .layer(middleware::from_fn(require_admin));

    Router::new().nest(
        "/api/users",
        profile
            .merge(admin)
            .layer(middleware::from_fn_with_state(state, require_auth)),
    )
}
