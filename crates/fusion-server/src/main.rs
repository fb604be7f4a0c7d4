//! fusion-server binary.
//!
//! Reads `fusion.toml` (or the path given with `--config`) layered under
//! `FUSION_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use fusion_server::{Server, ServerConfig, config::DEFAULT_CONFIG_PATH, housekeeping};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fusion API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let server = Server::build(&cfg)
    .await
    .with_context(|| format!("failed to initialise with store at {:?}", cfg.database_path))?;

  let _purge = housekeeping::spawn(server.store.clone(), cfg.cache_purge_interval());

  let app = server.router(cfg.offline);
  let address = cfg.address();

  tracing::info!(
    offline = cfg.offline,
    require_token = cfg.require_token,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
