//! Read-only analytics over a block run.

use chrono::NaiveDate;
use serde::Serialize;

use crate::block::Block;

/// Summary figures for a run of blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
  pub total_blocks:   usize,
  pub mined_blocks:   usize,
  pub perfect_blocks: usize,
  /// Mean fill over mined blocks, rounded half up; 0 when none are mined.
  pub average_fill:   u8,
}

impl ChainStats {
  /// Stats over the whole run. Only mined blocks count as perfect.
  pub fn of(blocks: &[Block]) -> Self {
    let mut stats = Self::summarise(blocks);
    stats.perfect_blocks = blocks
      .iter()
      .filter(|b| b.mined && b.fill_percentage == 100)
      .count();
    stats
  }

  /// Stats over the last `days` blocks. Any block in the window at 100
  /// counts as perfect, including today's.
  pub fn recent(blocks: &[Block], days: usize) -> Self {
    let window = tail(blocks, days);
    let mut stats = Self::summarise(window);
    stats.perfect_blocks = window.iter().filter(|b| b.fill_percentage == 100).count();
    stats
  }

  fn summarise(blocks: &[Block]) -> Self {
    let mined: Vec<&Block> = blocks.iter().filter(|b| b.mined).collect();
    let sum: usize = mined.iter().map(|b| usize::from(b.fill_percentage)).sum();
    let average_fill = match mined.len() {
      0 => 0,
      n => u8::try_from((2 * sum + n) / (2 * n)).unwrap_or(100),
    };

    Self {
      total_blocks: blocks.len(),
      mined_blocks: mined.len(),
      perfect_blocks: 0,
      average_fill,
    }
  }
}

/// One point of a fill-over-time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillPoint {
  pub block_number:    u32,
  pub date:            NaiveDate,
  pub fill_percentage: u8,
}

/// Fill series for every block, or only the last `limit` when given.
pub fn fill_series(blocks: &[Block], limit: Option<usize>) -> Vec<FillPoint> {
  let window = limit.map_or(blocks, |n| tail(blocks, n));
  window
    .iter()
    .map(|b| FillPoint {
      block_number:    b.block_number,
      date:            b.date,
      fill_percentage: b.fill_percentage,
    })
    .collect()
}

fn tail(blocks: &[Block], n: usize) -> &[Block] {
  &blocks[blocks.len().saturating_sub(n)..]
}
