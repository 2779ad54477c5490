//! [`Tracker`], the single writer in front of the chain store.
//!
//! The whole multi-chain state lives behind one `Arc`. Every mutation runs
//! the pure core operation against the current value, persists the result,
//! and only then swaps the `Arc`. Readers take a snapshot and can never see
//! a half-applied change.

use std::sync::Arc;

use chrono::NaiveDate;
use daychain_core::{
  clock::{Clock, Moment},
  criterion::{Criterion, CriterionPatch},
  persist::StateStore,
  rollover::Rollover,
  store::{MultiChainState, NewChain},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{config::TrackerConfig, Error, Result};

pub struct Tracker<S> {
  store:        S,
  clock:        Arc<dyn Clock>,
  storage_key:  String,
  forward_days: u32,
  state:        RwLock<Arc<MultiChainState>>,
}

impl<S: StateStore> Tracker<S> {
  /// Load the persisted document from `store`, starting empty if none exists.
  pub async fn open(store: S, clock: Arc<dyn Clock>, config: &TrackerConfig) -> Result<Self> {
    let blob = store
      .get(&config.storage_key)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    let state = MultiChainState::from_stored(blob.as_deref())?;

    tracing::info!(
      chains = state.chains.len(),
      active = ?state.active_chain_id,
      "loaded chain state"
    );

    Ok(Self {
      store,
      clock,
      storage_key: config.storage_key.clone(),
      forward_days: config.forward_days,
      state: RwLock::new(Arc::new(state)),
    })
  }

  /// The current state. Cheap; later writes do not affect the snapshot.
  pub async fn snapshot(&self) -> Arc<MultiChainState> {
    Arc::clone(&*self.state.read().await)
  }

  // ── Chains ────────────────────────────────────────────────────────────

  pub async fn create_chain(
    &self,
    name: impl Into<String>,
    description: Option<String>,
    start_date: NaiveDate,
    criteria: Vec<Criterion>,
  ) -> Result<Uuid> {
    let input = NewChain {
      name: name.into(),
      description,
      start_date,
      criteria,
      forward_days: self.forward_days,
    };
    let id = self.commit(|state, now| state.create_chain(input, now)).await?;
    tracing::info!(chain_id = %id, %start_date, "created chain");
    Ok(id)
  }

  /// Make `id` the active chain and immediately roll it forward, so a chain
  /// that sat inactive across midnight catches up before it is read.
  pub async fn switch_chain(&self, id: Uuid) -> Result<()> {
    self
      .commit(|state, now| Ok((caught_up(state.switch_chain(id)?, now), ())))
      .await?;
    tracing::info!(chain_id = %id, "switched chain");
    Ok(())
  }

  pub async fn rename_chain(
    &self,
    id: Uuid,
    name: impl Into<String>,
    description: Option<String>,
  ) -> Result<()> {
    let name = name.into();
    self
      .commit(|state, _| Ok((state.rename_chain(id, name, description)?, ())))
      .await
  }

  /// Remove a chain. If it was the active one, the chain promoted in its
  /// place is rolled forward the same way [`Tracker::switch_chain`] does.
  pub async fn delete_chain(&self, id: Uuid) -> Result<()> {
    let active = self
      .commit(|state, now| {
        let next = state.delete_chain(id)?;
        let active = next.active_chain_id;
        if active == state.active_chain_id {
          return Ok((next, active));
        }
        Ok((caught_up(next, now), active))
      })
      .await?;
    tracing::info!(chain_id = %id, active = ?active, "deleted chain");
    Ok(())
  }

  // ── Active chain ──────────────────────────────────────────────────────

  pub async fn add_criterion(&self, criterion: Criterion) -> Result<()> {
    self
      .commit(|state, _| Ok((state.add_criterion(criterion)?, ())))
      .await
  }

  pub async fn update_criterion(&self, id: Uuid, patch: CriterionPatch) -> Result<()> {
    self
      .commit(|state, _| Ok((state.update_criterion(id, &patch)?, ())))
      .await
  }

  pub async fn archive_criterion(&self, id: Uuid) -> Result<()> {
    self
      .commit(|state, now| Ok((state.archive_criterion(id, now)?, ())))
      .await
  }

  /// Flip a completion on the active chain's current block. Silently does
  /// nothing if that block is already mined.
  pub async fn toggle_completion(&self, criterion_id: Uuid) -> Result<()> {
    self
      .commit(|state, now| Ok((state.toggle_completion(criterion_id, now)?, ())))
      .await
  }

  // ── Rollover ──────────────────────────────────────────────────────────

  /// Run one rollover tick against the active chain.
  pub async fn tick(&self) -> Result<Option<Rollover>> {
    self
      .commit(|state, now| {
        Ok(match state.rollover(now) {
          Some((next, rollover)) => {
            if let Some(chain) = state.active_chain_id {
              log_rollover(chain, &rollover);
            }
            (next, Some(rollover))
          }
          None => {
            tracing::trace!("rollover tick: nothing to do");
            (state.clone(), None)
          }
        })
      })
      .await
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  /// Apply `f` to the current state under the write lock. The new state is
  /// persisted before it becomes visible; an unchanged state is not written.
  async fn commit<T>(
    &self,
    f: impl FnOnce(&MultiChainState, &Moment) -> daychain_core::Result<(MultiChainState, T)>,
  ) -> Result<T> {
    let mut guard = self.state.write().await;
    let now = self.clock.now();
    let (next, out) = f(&guard, &now)?;

    if next != **guard {
      let json = next.to_json()?;
      self
        .store
        .put(&self.storage_key, json)
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;
      *guard = Arc::new(next);
    }

    Ok(out)
  }
}

/// Roll the active chain of `state` forward, so a chain that sat inactive
/// across midnight never exposes an elapsed day as current.
fn caught_up(state: MultiChainState, now: &Moment) -> MultiChainState {
  match state.rollover(now) {
    Some((rolled, rollover)) => {
      if let Some(chain) = state.active_chain_id {
        log_rollover(chain, &rollover);
      }
      rolled
    }
    None => state,
  }
}

fn log_rollover(chain_id: Uuid, rollover: &Rollover) {
  tracing::info!(
    chain_id = %chain_id,
    mined = ?rollover.mined,
    appended = ?rollover.appended,
    current = ?rollover.current,
    "rolled over"
  );
}
