//! Blocks: one calendar day's record of criterion completions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::criterion::Criterion;

// ─── Completion ──────────────────────────────────────────────────────────────

/// Whether one criterion was checked off on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
  pub criterion_id: Uuid,
  pub completed:    bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub completed_at: Option<DateTime<Utc>>,
}

impl Completion {
  /// An unchecked completion for `criterion_id`.
  pub fn unchecked(criterion_id: Uuid) -> Self {
    Self { criterion_id, completed: false, completed_at: None }
  }

  /// The same completion with its flag flipped. Checking stamps `at`;
  /// unchecking clears the stamp.
  pub fn toggled(&self, at: DateTime<Utc>) -> Self {
    let completed = !self.completed;
    Self {
      criterion_id: self.criterion_id,
      completed,
      completed_at: completed.then_some(at),
    }
  }
}

// ─── Block ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
  /// Day offset from the chain's start date.
  pub block_number:    u32,
  pub date:            NaiveDate,
  /// When this block was materialised.
  pub timestamp:       DateTime<Utc>,
  pub completions:     Vec<Completion>,
  /// Set once the block's day has fully elapsed; never cleared.
  pub mined:           bool,
  pub fill_percentage: u8,
  pub hash:            String,
}

impl Block {
  /// A fresh block with one unchecked completion per criterion in
  /// `criteria` and a fill of zero.
  pub fn fresh(
    block_number: u32,
    date: NaiveDate,
    criteria: &[Criterion],
    mined: bool,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      block_number,
      date,
      timestamp,
      completions: criteria.iter().map(|c| Completion::unchecked(c.id)).collect(),
      mined,
      fill_percentage: 0,
      hash: block_hash(block_number, date),
    }
  }

  pub fn completion(&self, criterion_id: Uuid) -> Option<&Completion> {
    self.completions.iter().find(|c| c.criterion_id == criterion_id)
  }
}

// ─── Hash ────────────────────────────────────────────────────────────────────

/// Cosmetic checksum of `"{block_number}-{date}"`.
///
/// A 32-bit rolling `h * 31 + c` over the characters, wrapped, then printed as
/// the absolute value in zero-padded lowercase hex. Stable for the same
/// inputs; carries no integrity guarantee.
pub fn block_hash(block_number: u32, date: NaiveDate) -> String {
  let combined = format!("{block_number}-{}", date.format("%Y-%m-%d"));
  let hash = combined.encode_utf16().fold(0i32, |h, c| {
    h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(c))
  });
  format!("{:08x}", i64::from(hash).abs())
}
