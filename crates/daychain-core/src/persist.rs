//! The `StateStore` trait and JSON document helpers.
//!
//! Chain state is persisted as a single JSON document under a fixed key. The
//! trait is implemented by storage backends (e.g. `daychain-store-sqlite`);
//! the runtime depends on this abstraction, not on any concrete backend.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use crate::{store::MultiChainState, Result};

/// Key the multi-chain document is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "multi-blockchain-state";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Durable key-value storage of string blobs.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait StateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the blob stored under `key`. Returns `None` if nothing is stored.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Replace the blob stored under `key`.
  fn put<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

impl<T: StateStore> StateStore for Arc<T> {
  type Error = T::Error;

  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a {
    (**self).get(key)
  }

  fn put<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a {
    (**self).put(key, value)
  }
}

// ─── Document encoding ───────────────────────────────────────────────────────

impl MultiChainState {
  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  pub fn from_json(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }

  /// Decode a stored blob, treating a missing one as the empty default.
  pub fn from_stored(blob: Option<&str>) -> Result<Self> {
    blob.map_or_else(|| Ok(Self::default()), Self::from_json)
  }
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// A non-durable [`StateStore`] backed by a `HashMap`. Useful for tests and
/// throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
  blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl StateStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(blobs.get(key).cloned())
  }

  async fn put(&self, key: &str, value: String) -> Result<(), Infallible> {
    let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
    blobs.insert(key.to_owned(), value);
    Ok(())
  }
}
