//! Configuration management for the review tracker
//!
//! Handles server binding, database connection string and static frontend location.
//! Everything is read once from environment variables at process startup.

use serde::{Deserialize, Serialize};

/// Default embedded database used when no hosted store is configured
pub const DEFAULT_SQLITE_PATH: &str = "database.db";

/// Default port, same as the original development server
pub const DEFAULT_PORT: u16 = 8000;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
    /// Directory holding the browser frontend (index.html, js/...)
    /// Served for any path not claimed by the API; skipped if missing.
    pub static_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Normalized connection string: `postgresql://...` or `sqlite://...`
    pub url: String,
}

impl Config {
    /// Build configuration from ENV_VARs with local-development defaults
    ///
    /// - REVIEW_TRACKER_HOST / REVIEW_TRACKER_PORT: bind address
    /// - POSTGRES_URL: hosted store; falls back to embedded SQLite when unset
    /// - REVIEW_TRACKER_SQLITE_PATH: embedded database file (default "database.db")
    /// - REVIEW_TRACKER_STATIC_DIR: frontend directory (default "public")
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("REVIEW_TRACKER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_port(std::env::var("REVIEW_TRACKER_PORT").ok().as_deref()),
                static_dir: std::env::var("REVIEW_TRACKER_STATIC_DIR")
                    .unwrap_or_else(|_| "public".to_string()),
            },
            database: DatabaseConfig {
                url: resolve_database_url(
                    std::env::var("POSTGRES_URL").ok().as_deref(),
                    std::env::var("REVIEW_TRACKER_SQLITE_PATH").ok().as_deref(),
                ),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse the port, falling back to the default on absent or garbage input
fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse().ok()).unwrap_or(DEFAULT_PORT)
}

/// Pick the connection string: hosted Postgres if given, embedded SQLite otherwise
///
/// An empty POSTGRES_URL counts as unset.
pub fn resolve_database_url(postgres_url: Option<&str>, sqlite_path: Option<&str>) -> String {
    match postgres_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => normalize_postgres_url(url),
        None => {
            let path = sqlite_path
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_SQLITE_PATH);
            format!("sqlite://{}", path)
        }
    }
}

/// Rewrite the legacy `postgres://` scheme to `postgresql://`
///
/// Only the leading scheme is touched; the rest of the URL is left as-is.
pub fn normalize_postgres_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{}", rest),
        None => url.to_string(),
    }
}
