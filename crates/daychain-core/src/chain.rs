//! A single chain: its configuration, block run, and current-block key.
//!
//! Every operation here takes `&self` and returns a new [`ChainState`]. The
//! current block is stored as a block number and always looked up in
//! `blocks`, so the two can never disagree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  block::{Block, Completion},
  builder::build_blocks,
  calendar::add_days,
  clock::Moment,
  criterion::{self, Criterion, CriterionPatch},
  fill::calculate_fill,
  Error, Result,
};

/// Forward horizon of a single-chain tracker: blocks are built through today.
pub const SINGLE_CHAIN_FORWARD_DAYS: u32 = 0;

/// Forward horizon of chains created through the chain store.
pub const MULTI_CHAIN_FORWARD_DAYS: u32 = 7;

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
  /// First tracked day; fixed once initialized.
  pub start_date:   Option<NaiveDate>,
  /// Every criterion ever registered, archived ones included.
  pub criteria:     Vec<Criterion>,
  pub initialized:  bool,
  /// How many days past today the builder and rollover materialise.
  #[serde(default)]
  pub forward_days: u32,
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainState {
  pub config:        ChainConfig,
  pub blocks:        Vec<Block>,
  /// Block number of the current block, if initialized.
  pub current_block: Option<u32>,
}

impl ChainState {
  /// Build the initial block run from `start_date` through
  /// `today + forward_days` and point the current block at today.
  pub fn initialize(
    start_date: NaiveDate,
    criteria: Vec<Criterion>,
    forward_days: u32,
    now: &Moment,
  ) -> Result<Self> {
    let today = now.today();
    if start_date > today {
      return Err(Error::StartDateInFuture { start: start_date, today });
    }

    let active = criterion::active(&criteria);
    let horizon = add_days(today, forward_days);
    let blocks = build_blocks(start_date, &active, horizon, now);

    let mut state = Self {
      config: ChainConfig {
        start_date: Some(start_date),
        criteria,
        initialized: true,
        forward_days,
      },
      blocks,
      current_block: None,
    };
    state.current_block = state.block_number_for(today);
    Ok(state)
  }

  pub fn is_initialized(&self) -> bool { self.config.initialized }

  /// The current block, looked up by key.
  pub fn current_block(&self) -> Option<&Block> {
    self.current_block.and_then(|n| self.block(n))
  }

  pub fn block(&self, block_number: u32) -> Option<&Block> {
    self.blocks.iter().find(|b| b.block_number == block_number)
  }

  /// Non-archived criteria, in registry order.
  pub fn active_criteria(&self) -> Vec<Criterion> {
    criterion::active(&self.config.criteria)
  }

  pub fn criterion(&self, id: Uuid) -> Option<&Criterion> {
    self.config.criteria.iter().find(|c| c.id == id)
  }

  /// Number of the block dated `date`, falling back to the last block.
  pub(crate) fn block_number_for(&self, date: NaiveDate) -> Option<u32> {
    self
      .blocks
      .iter()
      .find(|b| b.date == date)
      .or_else(|| self.blocks.last())
      .map(|b| b.block_number)
  }

  // ── Criteria registry ─────────────────────────────────────────────────

  /// Register a new criterion and reconcile unmined blocks.
  pub fn add_criterion(&self, criterion: Criterion) -> Result<Self> {
    if self.criterion(criterion.id).is_some() {
      return Err(Error::DuplicateCriterion(criterion.id));
    }
    let mut criteria = self.config.criteria.clone();
    criteria.push(criterion);
    Ok(self.with_criteria(criteria))
  }

  /// Patch an active criterion's name, description, or kind and reconcile
  /// unmined blocks.
  pub fn update_criterion(&self, id: Uuid, patch: &CriterionPatch) -> Result<Self> {
    self.replace_criterion(id, |c| c.patched(patch))
  }

  /// Archive a criterion. Irreversible; its completions stay where they are.
  pub fn archive_criterion(&self, id: Uuid, now: &Moment) -> Result<Self> {
    self.replace_criterion(id, |c| c.archived(now.instant))
  }

  fn replace_criterion(
    &self,
    id: Uuid,
    f: impl FnOnce(&Criterion) -> Result<Criterion>,
  ) -> Result<Self> {
    let index = self
      .config
      .criteria
      .iter()
      .position(|c| c.id == id)
      .ok_or(Error::CriterionNotFound(id))?;

    let mut criteria = self.config.criteria.clone();
    criteria[index] = f(&criteria[index])?;
    Ok(self.with_criteria(criteria))
  }

  fn with_criteria(&self, criteria: Vec<Criterion>) -> Self {
    let next = Self {
      config: ChainConfig { criteria, ..self.config.clone() },
      ..self.clone()
    };
    next.reconciled()
  }

  // ── Reconciliation ────────────────────────────────────────────────────

  /// Bring every unmined block in line with the active criteria: append an
  /// unchecked completion for each active criterion the block lacks, then
  /// recompute its fill. Mined blocks are returned untouched.
  pub fn reconciled(&self) -> Self {
    if !self.is_initialized() {
      return self.clone();
    }

    let active = self.active_criteria();
    let blocks = self
      .blocks
      .iter()
      .map(|block| {
        if block.mined {
          return block.clone();
        }

        let mut completions = block.completions.clone();
        for criterion in &active {
          if block.completion(criterion.id).is_none() {
            completions.push(Completion::unchecked(criterion.id));
          }
        }
        let fill_percentage = calculate_fill(&completions, &active);

        Block { completions, fill_percentage, ..block.clone() }
      })
      .collect();

    Self { blocks, ..self.clone() }
  }

  // ── Toggle ────────────────────────────────────────────────────────────

  /// Flip one completion on the current block and recompute its fill.
  ///
  /// A silent no-op when there is no current block, the current block is
  /// mined, or it carries no completion for `criterion_id`.
  pub fn toggle_completion(&self, criterion_id: Uuid, now: &Moment) -> Self {
    let Some(current) = self.current_block() else {
      return self.clone();
    };
    if current.mined || current.completion(criterion_id).is_none() {
      return self.clone();
    }

    let completions: Vec<Completion> = current
      .completions
      .iter()
      .map(|c| {
        if c.criterion_id == criterion_id { c.toggled(now.instant) } else { c.clone() }
      })
      .collect();
    let fill_percentage = calculate_fill(&completions, &self.active_criteria());

    let updated = Block { completions, fill_percentage, ..current.clone() };
    let blocks = self
      .blocks
      .iter()
      .map(|b| {
        if b.block_number == updated.block_number { updated.clone() } else { b.clone() }
      })
      .collect();

    Self { blocks, ..self.clone() }
  }
}
