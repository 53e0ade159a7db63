//! Review tracker: minimal backend for academic review work items
//!
//! Tracks manuscripts, roles, statuses and due dates over a relational store
//! (embedded SQLite or hosted PostgreSQL) and exposes them as a JSON HTTP API.

// Core configuration and setup
pub mod config;

// Work item types and status bucketing
pub mod tracker;

// Relational persistence - SQLite/PostgreSQL backends and connector
pub mod storage;

// HTTP API layer - REST endpoints and error translation
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use server::start_server;
pub use storage::{Database, ItemStorage};
pub use tracker::{ItemStats, NewWorkItem, Role, Status, WorkItem, WorkItemPatch};
