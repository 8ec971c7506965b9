use rmbs_rating_api::app::build_router;
use rmbs_rating_api::config::Config;
use rmbs_rating_api::db::Database;
use rmbs_rating_api::handlers::AppState;
use rmbs_rating_api::telemetry;
use std::net::SocketAddr;
use std::sync::Arc;

/// Main entry point for the application.
///
/// Loads configuration, initializes logging, connects to the database
/// (creating the schema if needed), then serves the HTTP API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first: it carries the log level and log file
    let config = Config::from_env()?;
    telemetry::init(&config)?;
    config.log_summary();

    // Initialize database connection pool
    let db = Database::new(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database connection pool established");

    let addr = SocketAddr::new(config.host, config.port);

    // Build application state
    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
        config,
    });

    let app = build_router(app_state)?;

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
