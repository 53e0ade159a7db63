//! HTTP API Layer
//!
//! REST endpoints for the review tracker:
//! - Work item CRUD under /api/items
//! - Aggregate counters at /api/stats
//! - Error translation to 404/500 JSON bodies

// HTTP error type shared by all handlers
pub mod error;

// Work item endpoints (GET/POST/PUT/DELETE)
pub mod items;

// Stats endpoint
pub mod stats;

// Re-export router builders
pub use error::ApiError;
pub use items::{create_item_routes, AppState};
pub use stats::create_stats_routes;
