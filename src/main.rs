//! HR payroll rules server.
//!
//! Loads the rules configuration and a seeded record store, then serves the
//! HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrms_rules::api::{AppState, create_router};
use hrms_rules::config::ConfigLoader;
use hrms_rules::store::Database;

/// Command-line arguments for hrms-rules
#[derive(Parser, Debug)]
#[command(name = "hrms-rules")]
#[command(about = "Leave, overtime, arrear and employee benefit rules for HR payroll")]
#[command(version)]
struct Args {
    /// Directory holding the YAML rules configuration
    #[arg(short, long, default_value = "./config/hrms", env = "HRMS_CONFIG_DIR")]
    config: PathBuf,

    /// YAML file seeding the record store; starts empty when omitted
    #[arg(short, long, env = "HRMS_DATA_FILE")]
    data: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080", env = "HRMS_BIND")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hrms_rules=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = ConfigLoader::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    info!(config = %args.config.display(), "Configuration loaded");

    let db = match &args.data {
        Some(path) => {
            let db = Database::load_seed(path)
                .with_context(|| format!("Failed to load seed data from {}", path.display()))?;
            info!(
                data = %path.display(),
                employees = db.employees.len(),
                "Seed data loaded"
            );
            db
        }
        None => Database::default(),
    };

    let app = create_router(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .context("Failed to bind to address")?;
    info!("Starting HTTP server on {}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
