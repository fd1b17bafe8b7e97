//! Settings API handlers

use axum::{Json, extract::State};
use shared::{ApiResponse, AppResult};

use crate::db::models::StoreSettings;
use crate::db::repository::SettingsRepository;
use crate::state::AppState;

/// GET /api/settings - auto-creates the default document on first read
pub async fn get_settings(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<StoreSettings>>> {
    let repo = SettingsRepository::new(state.db.clone());
    let settings = repo.get_or_create().await?;
    Ok(Json(ApiResponse::success(settings)))
}
