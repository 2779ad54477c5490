//! Day rollover: mining elapsed days and appending new ones.
//!
//! A rollover tick is safe to run as often as desired. While the current
//! block's day is still running it does nothing; once the wall-clock date is
//! past that day it mines the stale block, backfills every missing day
//! through the forward horizon, and moves the current block to today.
//! Existing blocks are never removed or renumbered.

use crate::{
  block::Block,
  builder::block_for,
  calendar::{add_days, days_through, is_day_elapsed},
  chain::ChainState,
  clock::Moment,
};

/// What a tick changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover {
  pub state:    ChainState,
  /// Block numbers newly marked mined, in ascending order.
  pub mined:    Vec<u32>,
  /// Block numbers appended by backfill, in ascending order.
  pub appended: Vec<u32>,
  /// The current block after the tick.
  pub current:  Option<u32>,
}

impl ChainState {
  /// Run one rollover tick at `now`. Returns `None` when nothing changed.
  pub fn rollover(&self, now: &Moment) -> Option<Rollover> {
    if !self.is_initialized() {
      return None;
    }
    let current = self.current_block()?;
    let start = self.config.start_date?;

    // A clock behind the current block's day (e.g. stepped back across
    // midnight) leaves everything alone until the wall date catches up.
    let today = now.today();
    if today <= current.date {
      return None;
    }

    let current_number = current.block_number;
    let mut mined = Vec::new();
    let mut blocks: Vec<Block> = self.blocks.clone();

    for block in blocks.iter_mut() {
      let stale =
        block.block_number == current_number || is_day_elapsed(block.date, now);
      if stale && !block.mined {
        block.mined = true;
        mined.push(block.block_number);
      }
    }

    let active = self.active_criteria();
    let horizon = add_days(today, self.config.forward_days);
    let mut appended = Vec::new();
    if let Some(last) = blocks.last().map(|b| b.date)
      && let Some(first_missing) = last.succ_opt()
    {
      for date in days_through(first_missing, horizon) {
        let block = block_for(start, date, &active, now);
        appended.push(block.block_number);
        if block.mined {
          mined.push(block.block_number);
        }
        blocks.push(block);
      }
    }

    let mut state = Self { blocks, ..self.clone() };
    state.current_block = state.block_number_for(today);
    let current = state.current_block;

    if mined.is_empty() && appended.is_empty() && current == self.current_block {
      return None;
    }
    Some(Rollover { state, mined, appended, current })
  }
}
