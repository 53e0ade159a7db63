//! Server setup and initialization
//!
//! Wires together storage, API routes and middleware (CORS, panic translation,
//! request tracing), and serves the optional browser frontend.

use crate::{
    api::{create_item_routes, create_stats_routes, error::panic_response, AppState},
    config::Config,
    storage::{Database, ItemStorage},
};
use anyhow::Result;
use axum::{
    response::{Json, Redirect},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

/// Create the main Axum application with all routes and middleware
///
/// Opens the database named by the config and creates the schema before any
/// route is served. An unreachable store fails here, and with it startup.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("🗄️ Opening database");
    let database = Database::connect(&config.database.url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {:#}", e))?;

    tracing::info!("📋 Ensuring work_items schema ({:?})", database.backend());
    database
        .ensure_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create schema: {:#}", e))?;

    let state = AppState {
        storage: ItemStorage::new(database),
    };

    let static_dir = Path::new(&config.server.static_dir);
    let static_dir = if static_dir.is_dir() {
        tracing::info!("🌐 Serving frontend from {}", static_dir.display());
        Some(static_dir)
    } else {
        tracing::debug!("No frontend directory at {}, API only", static_dir.display());
        None
    };

    let app = build_router(state, static_dir);
    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Assemble routes and middleware around an existing state
///
/// Unmatched paths fall through to `static_dir` when one is given.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/", get(root_redirect))
        .route("/api/health", get(health_check))
        .merge(create_item_routes())
        .merge(create_stats_routes())
        .with_state(state);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        // Any origin, mirrored so credentials stay allowed
        .layer(CorsLayer::very_permissive())
}

/// Start the HTTP server with the given configuration
///
/// Initializes logging, creates the application and serves until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    // RUST_LOG overrides; default keeps sqlx statement echo visible
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx::query=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting review tracker server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The frontend lives at /index.html
async fn root_redirect() -> Redirect {
    Redirect::temporary("/index.html")
}
