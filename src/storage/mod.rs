//! Storage layer
//!
//! Relational persistence for work items:
//! - Embedded SQLite via sqlx (local development, tests)
//! - Hosted PostgreSQL via sqlx, TLS per `sslmode` (deployment)
//! - A connector that picks one from the connection string

// Backend selection, connection and schema creation
pub mod database;

// Backend-agnostic work item operations
pub mod items;

// sqlx SQLite backend
pub mod sqlite;

// sqlx PostgreSQL backend
pub mod postgres;

// Re-export commonly used types
pub use database::{Backend, Database};
pub use items::ItemStorage;
