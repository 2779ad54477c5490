//! daychaind: keeps daychain state rolling over while the host is up.
//!
//! Reads `daychain.toml` (or the path given with `--config`), opens the
//! SQLite store, and runs the rollover loop until Ctrl-C.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use daychain_core::clock::SystemClock;
use daychain_runtime::{RolloverTask, Tracker, TrackerConfig};
use daychain_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "daychain rollover daemon")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "daychain.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = TrackerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store_path = expand_tilde(&config.store_path);
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let tracker = Tracker::open(store, Arc::new(SystemClock), &config)
    .await
    .context("failed to load chain state")?;
  let tracker = Arc::new(tracker);

  tracing::info!(
    store = %store_path.display(),
    every_secs = config.tick_interval().as_secs(),
    "rollover loop started"
  );
  let task = RolloverTask::spawn(Arc::clone(&tracker), config.tick_interval());

  tokio::signal::ctrl_c()
    .await
    .context("failed to listen for ctrl-c")?;

  tracing::info!("shutting down");
  task.stop().await;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
