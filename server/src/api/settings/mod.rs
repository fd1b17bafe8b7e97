//! Settings API module (public read; the write surface lives elsewhere)

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(handler::get_settings))
}
