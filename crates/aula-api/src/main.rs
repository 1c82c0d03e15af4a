//! Aula API Server
//!
//! REST API server for the Aula administration backend.

use aula_api::{create_router, state::AppState};
use aula_core::config::AppConfig;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aula_api=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration; a missing JWT secret fails startup here.
    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.postgres_pool_size)
        .connect(&config.database.postgres_url)
        .await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config, pool));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Aula API Server starting on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
