//! Work item REST API endpoints
//!
//! Thin pass-through from HTTP to `ItemStorage`: each handler does one storage
//! call and maps "missing" to 404.

use crate::{
    api::error::ApiError,
    storage::ItemStorage,
    tracker::{NewWorkItem, WorkItem, WorkItemPatch},
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Application state shared by all API handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Work item storage (the injected per-request session source)
    pub storage: ItemStorage,
}

/// Query string for GET /api/items
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Create work item routes
pub fn create_item_routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/{id}", get(get_item).put(update_item).delete(delete_item))
}

/// List work items
///
/// GET /api/items?offset=0&limit=100
async fn list_items(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<WorkItem>>, ApiError> {
    let items = state.storage.list_items(page.offset, page.limit).await?;
    tracing::debug!("Listed {} items (offset={}, limit={})", items.len(), page.offset, page.limit);
    Ok(Json(items))
}

/// Create a work item
///
/// POST /api/items
/// Body: { "title": "...", "role": "Reviewer", "status": "Invited", ... }
async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewWorkItem>,
) -> Result<Json<WorkItem>, ApiError> {
    let item = state.storage.create_item(payload).await?;
    tracing::info!("📝 Created item {} ({})", item.id, item.title);
    Ok(Json(item))
}

/// Get a work item by id
///
/// GET /api/items/{id}
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkItem>, ApiError> {
    state.storage.get_item(id).await?.map(Json).ok_or(ApiError::NotFound)
}

/// Partially update a work item
///
/// PUT /api/items/{id}
/// Body: any subset of the item's fields; `id` is ignored
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<WorkItemPatch>,
) -> Result<Json<WorkItem>, ApiError> {
    match state.storage.update_item(id, patch).await? {
        Some(item) => {
            tracing::info!("✏️ Updated item {} ({:?})", item.id, item.status);
            Ok(Json(item))
        }
        None => Err(ApiError::NotFound),
    }
}

/// Delete a work item
///
/// DELETE /api/items/{id}
/// Returns: { "ok": true }
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if state.storage.delete_item(id).await? {
        tracing::info!("🗑️ Deleted item {}", id);
        Ok(Json(json!({ "ok": true })))
    } else {
        Err(ApiError::NotFound)
    }
}
