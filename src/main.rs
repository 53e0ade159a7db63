//! Review tracker server entry point
//!
//! Reads configuration from the environment and starts the HTTP server.

use review_tracker::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Work item API at /api/items/*
/// - Counters at /api/stats
/// - Health check at /api/health
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // POSTGRES_URL selects the hosted store; otherwise ./database.db
    let config = Config::from_env();

    start_server(config).await?;

    Ok(())
}
