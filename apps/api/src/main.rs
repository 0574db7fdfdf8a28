//! # Wako API Server
//!
//! Main entry point for the back office HTTP server.
//!
//! ## Startup
//! 1. Load `.env` (optional) and configuration
//! 2. Open SQLite and apply migrations
//! 3. Build the PDF renderer from the business profile
//! 4. Serve until Ctrl-C / SIGTERM

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wako_api::auth::JwtManager;
use wako_api::build_router;
use wako_api::config::ApiConfig;
use wako_api::state::AppState;
use wako_db::{Database, DbConfig};
use wako_pdf::PdfInvoiceRenderer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; everything has a default.
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wako=debug,sqlx=warn")),
        )
        .init();

    info!("Starting Wako back office API...");

    let config = ApiConfig::load()?;
    let local_offset = config.local_offset()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        %local_offset,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_path)
            .max_connections(config.db_max_connections)
            .local_offset(local_offset),
    )
    .await?;

    let renderer = PdfInvoiceRenderer::new(config.business.clone()).with_offset(local_offset);
    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);

    let state = Arc::new(AppState::new(db.clone(), jwt, Arc::new(renderer)));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
