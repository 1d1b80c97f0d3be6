//! restock server binary.
//!
//! Reads `restock.toml` (or the path given with `--config`) layered under
//! `RESTOCK_*` environment variables, opens the SQLite forecast history and
//! serves the JSON API over HTTP.
//!
//! ```sh
//! RESTOCK_PORT=9000 cargo run -p restock-server -- --config restock.toml
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use restock_server::{app, expand_tilde, load_config};
use restock_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Restock planning server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "restock.toml")]
  config: PathBuf,

  /// Create the database schema and exit.
  #[arg(long)]
  init_db: bool,
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

  let server_cfg = load_config(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Opening the store creates the schema.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.init_db {
    tracing::info!("Initialised forecast store at {store_path:?}");
    return Ok(());
  }

  let router = app(Arc::new(store), server_cfg.forecast.clone())
    .context("invalid forecast settings")?;
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, router).await.context("server error")?;

  Ok(())
}
