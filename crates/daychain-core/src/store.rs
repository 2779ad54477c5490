//! The chain store: every chain a user keeps, and which one is active.
//!
//! Chain-level operations (create, switch, rename, delete) act on the
//! collection. Everything else is routed to the active chain only, so a
//! mutation in one chain can never reach another.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  chain::{ChainState, MULTI_CHAIN_FORWARD_DAYS},
  clock::Moment,
  criterion::{Criterion, CriterionPatch},
  rollover::Rollover,
  Error, Result,
};

// ─── Chain ───────────────────────────────────────────────────────────────────

/// One named, independent chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
  pub id:          Uuid,
  pub name:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
  pub state:       ChainState,
}

/// Input to [`MultiChainState::create_chain`].
#[derive(Debug, Clone)]
pub struct NewChain {
  pub name:         String,
  pub description:  Option<String>,
  pub start_date:   NaiveDate,
  pub criteria:     Vec<Criterion>,
  pub forward_days: u32,
}

impl NewChain {
  /// Convenience constructor using the default forward horizon.
  pub fn new(
    name: impl Into<String>,
    start_date: NaiveDate,
    criteria: Vec<Criterion>,
  ) -> Self {
    Self {
      name: name.into(),
      description: None,
      start_date,
      criteria,
      forward_days: MULTI_CHAIN_FORWARD_DAYS,
    }
  }
}

// ─── Multi-chain state ───────────────────────────────────────────────────────

/// The whole persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChainState {
  pub chains:          Vec<Chain>,
  pub active_chain_id: Option<Uuid>,
}

impl MultiChainState {
  pub fn chain(&self, id: Uuid) -> Option<&Chain> {
    self.chains.iter().find(|c| c.id == id)
  }

  pub fn active_chain(&self) -> Option<&Chain> {
    self.active_chain_id.and_then(|id| self.chain(id))
  }

  // ── Chain-level operations ────────────────────────────────────────────

  /// Initialize a new chain, append it, and make it active.
  pub fn create_chain(&self, input: NewChain, now: &Moment) -> Result<(Self, Uuid)> {
    let state = ChainState::initialize(
      input.start_date,
      input.criteria,
      input.forward_days,
      now,
    )?;
    let chain = Chain {
      id: Uuid::new_v4(),
      name: input.name,
      description: input.description,
      created_at: now.instant,
      state,
    };
    let id = chain.id;

    let mut chains = self.chains.clone();
    chains.push(chain);
    Ok((Self { chains, active_chain_id: Some(id) }, id))
  }

  pub fn switch_chain(&self, id: Uuid) -> Result<Self> {
    self.chain(id).ok_or(Error::ChainNotFound(id))?;
    Ok(Self { active_chain_id: Some(id), ..self.clone() })
  }

  pub fn rename_chain(
    &self,
    id: Uuid,
    name: impl Into<String>,
    description: Option<String>,
  ) -> Result<Self> {
    let name = name.into();
    self.map_chain(id, |chain| {
      Ok(Chain { name, description, ..chain.clone() })
    })
  }

  /// Remove a chain. If it was active, the first remaining chain becomes
  /// active, or none if the store is now empty.
  pub fn delete_chain(&self, id: Uuid) -> Result<Self> {
    self.chain(id).ok_or(Error::ChainNotFound(id))?;

    let chains: Vec<Chain> =
      self.chains.iter().filter(|c| c.id != id).cloned().collect();
    let active_chain_id = if self.active_chain_id == Some(id) {
      chains.first().map(|c| c.id)
    } else {
      self.active_chain_id
    };
    Ok(Self { chains, active_chain_id })
  }

  // ── Active-chain operations ───────────────────────────────────────────

  pub fn add_criterion(&self, criterion: Criterion) -> Result<Self> {
    self.map_active(|state| state.add_criterion(criterion))
  }

  pub fn update_criterion(&self, id: Uuid, patch: &CriterionPatch) -> Result<Self> {
    self.map_active(|state| state.update_criterion(id, patch))
  }

  pub fn archive_criterion(&self, id: Uuid, now: &Moment) -> Result<Self> {
    self.map_active(|state| state.archive_criterion(id, now))
  }

  /// Toggle a completion on the active chain's current block. A no-op on a
  /// mined block, but still an error when no chain is active.
  pub fn toggle_completion(&self, criterion_id: Uuid, now: &Moment) -> Result<Self> {
    self.map_active(|state| Ok(state.toggle_completion(criterion_id, now)))
  }

  /// Run a rollover tick on the active chain. `None` when there is no active
  /// chain or the tick changed nothing.
  pub fn rollover(&self, now: &Moment) -> Option<(Self, Rollover)> {
    let active = self.active_chain()?;
    let rollover = active.state.rollover(now)?;
    let state = rollover.state.clone();
    let next = self
      .map_chain(active.id, |chain| Ok(Chain { state, ..chain.clone() }))
      .ok()?;
    Some((next, rollover))
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  fn map_active(&self, f: impl FnOnce(&ChainState) -> Result<ChainState>) -> Result<Self> {
    let id = self.active_chain().ok_or(Error::NoActiveChain)?.id;
    self.map_chain(id, |chain| Ok(Chain { state: f(&chain.state)?, ..chain.clone() }))
  }

  fn map_chain(&self, id: Uuid, f: impl FnOnce(&Chain) -> Result<Chain>) -> Result<Self> {
    let index = self
      .chains
      .iter()
      .position(|c| c.id == id)
      .ok_or(Error::ChainNotFound(id))?;

    let mut chains = self.chains.clone();
    chains[index] = f(&chains[index])?;
    Ok(Self { chains, ..self.clone() })
  }
}
