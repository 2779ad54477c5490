//! Runtime configuration.

use std::{path::{Path, PathBuf}, time::Duration};

use daychain_core::{chain::MULTI_CHAIN_FORWARD_DAYS, persist::DEFAULT_STORAGE_KEY};
use serde::Deserialize;

use crate::Result;

/// Tracker settings, deserialised from `daychain.toml` and `DAYCHAIN_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_storage_key")]
  pub storage_key:        String,
  #[serde(default = "default_tick_interval_secs")]
  pub tick_interval_secs: u64,
  /// Forward horizon for newly created chains.
  #[serde(default = "default_forward_days")]
  pub forward_days:       u32,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      store_path:         default_store_path(),
      storage_key:        default_storage_key(),
      tick_interval_secs: default_tick_interval_secs(),
      forward_days:       default_forward_days(),
    }
  }
}

impl TrackerConfig {
  /// Layer the optional TOML file at `path` under `DAYCHAIN_*` variables.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = ::config::Config::builder()
      .add_source(::config::File::from(path).required(false))
      .add_source(::config::Environment::with_prefix("DAYCHAIN"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn tick_interval(&self) -> Duration {
    Duration::from_secs(self.tick_interval_secs.max(1))
  }
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/daychain/daychain.db") }

fn default_storage_key() -> String { DEFAULT_STORAGE_KEY.to_owned() }

fn default_tick_interval_secs() -> u64 { 60 }

fn default_forward_days() -> u32 { MULTI_CHAIN_FORWARD_DAYS }
