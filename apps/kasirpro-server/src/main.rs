//! `kasirpro-server`: the KasirPro HTTP server
//!
//! Usage:
//!   kasirpro-server [--config <file.yaml>] [run|migrate|check-config]

mod config;
mod logging;

use anyhow::{Context, Result};
use axum::routing::get;
use clap::{Parser, Subcommand};
use config::AppConfig;
use pos_service::PosServiceModule;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// KasirPro point-of-sale server
#[derive(Parser, Debug)]
#[command(name = "kasirpro-server", version, about = "KasirPro POS server")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "KASIRPRO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Serve the HTTP API (default)
    Run,
    /// Apply database migrations and exit
    Migrate,
    /// Print the effective configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::CheckConfig => {
            println!("{:#?}", config);
            Ok(())
        }
        Command::Migrate => {
            let db = connect(&config).await?;
            PosServiceModule::migrate(&db).await
        }
        Command::Run => run(config).await,
    }
}

async fn connect(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", redact(&config.database.url)))?;
    info!(url = %redact(&config.database.url), "database connected");
    Ok(db)
}

async fn run(config: AppConfig) -> Result<()> {
    let db = connect(&config).await?;
    if config.database.migrate {
        PosServiceModule::migrate(&db).await?;
    }

    let module = PosServiceModule::init(config.pos.clone(), Arc::new(db));
    let app = module
        .router()
        .route("/health", get(|| async { "ok" }))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let cancel = CancellationToken::new();
    tokio::spawn(watch_signals(cancel.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "KasirPro server listening");

    // SSE streams only end once their channels close
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
            module.shutdown();
        })
        .await?;
    info!("KasirPro server stopped");
    Ok(())
}

async fn watch_signals(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
    }
    cancel.cancel();
}

/// Hide the password part of a connection url
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}
