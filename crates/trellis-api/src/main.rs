//! trellisd — HTTP API server for trellis.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use trellis_api::{config, routes, state::AppState};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "trellisd: workspace and work-item tracking API",
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file).
    #[arg(long)]
    listen: Option<String>,

    /// SQLite database path (overrides the config file).
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(db) = cli.db {
        config.db = db;
    }

    let store = trellis_core::db::open_store(&config.db)
        .with_context(|| format!("open store at {}", config.db.display()))?;
    let app = routes::router(AppState::shared(store));

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("bind {}", config.listen))?;
    tracing::info!(addr = %config.listen, db = %config.db.display(), "trellisd listening");
    axum::serve(listener, app).await.context("serve")?;

    Ok(())
}
