//! Dashboard counters endpoint

use crate::{api::error::ApiError, api::items::AppState, tracker::ItemStats};
use axum::{extract::State, response::Json, routing::get, Router};

/// Create stats routes
pub fn create_stats_routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(get_stats))
}

/// GET /api/stats
/// Returns: { "active": n, "pending": n, "completed": n }
async fn get_stats(State(state): State<AppState>) -> Result<Json<ItemStats>, ApiError> {
    Ok(Json(state.storage.item_stats().await?))
}
