//! Block sequence builder.

use chrono::NaiveDate;

use crate::{
  block::Block,
  calendar::{day_offset, days_through, is_day_elapsed},
  clock::Moment,
  criterion::Criterion,
};

/// Build one block per calendar day from `start` through `horizon`
/// inclusive.
///
/// Block numbers are day offsets from `start`. A block is mined if its day
/// has already elapsed at `now`. Every block starts with one unchecked
/// completion per entry in `criteria` and a fill of zero; no completion data
/// exists for past days at build time. Returns an empty list when
/// `horizon < start`.
pub fn build_blocks(
  start: NaiveDate,
  criteria: &[Criterion],
  horizon: NaiveDate,
  now: &Moment,
) -> Vec<Block> {
  days_through(start, horizon)
    .map(|date| block_for(start, date, criteria, now))
    .collect()
}

/// A fresh block for `date` in a chain starting at `start`.
pub(crate) fn block_for(
  start: NaiveDate,
  date: NaiveDate,
  criteria: &[Criterion],
  now: &Moment,
) -> Block {
  let number = u32::try_from(day_offset(start, date)).unwrap_or(u32::MAX);
  Block::fresh(number, date, criteria, is_day_elapsed(date, now), now.instant)
}
