//! Main entry point for the Limitless API server

use limitless_api::{build_router, build_runtime};
use limitless_core::{Config, context_error, context_error::Result, init_logging};
use limitless_database::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    // Development convenience; absence is fine
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("Failed to load config ({err}), using defaults");
        Config::default()
    });

    // Keep the guard alive so file logs are flushed on exit
    let _log_guard = init_logging(&config.logging)?;

    info!(
        "Starting Limitless API server v{} on {} with {} workers",
        env!("CARGO_PKG_VERSION"),
        config.bind_address(),
        config.server.workers
    );

    build_runtime(&config.server)?.block_on(serve(config))
}

async fn serve(config: Config) -> Result<()> {
    info!("Connecting to database...");
    let database = match Database::new(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(context_error!("Database connection failed: {}", e));
        }
    };

    info!("Running database migrations...");
    if let Err(e) = database.migrate().await {
        error!("Database migration failed: {}", e);
        return Err(context_error!("Migration failed: {}", e));
    }

    if let Err(e) = database.health_check().await {
        error!("Database health check failed: {}", e);
        return Err(context_error!("Database health check failed: {}", e));
    }
    info!("Database ready");

    if !config.security.require_session {
        warn!("Admin session verification is DISABLED; /api/admin is open");
    }

    let app = build_router(config.clone(), database.pool().clone())?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| context_error!("Invalid server address: {}", e))?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| context_error!("Failed to bind to {}: {}", addr, e))?;

    info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| context_error!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received terminate signal, shutting down gracefully..."),
    }
}
