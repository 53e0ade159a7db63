//! Work item domain layer
//!
//! Record and payload types for tracked review work, plus the status
//! bucketing behind the stats endpoint.

// Core type definitions (WorkItem, Role, Status, payloads)
pub mod types;

// Status bucket counting
pub mod stats;

// Re-export commonly used types
pub use stats::{ItemStats, StatsBucket};
pub use types::{NewWorkItem, Role, Status, WorkItem, WorkItemPatch};
