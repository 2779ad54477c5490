//! Fill percentage.

use crate::{block::Completion, criterion::Criterion};

/// Percentage of `active_criteria` satisfied by `completions`, 0–100.
///
/// Goals are satisfied when checked, prohibitions when left unchecked. A
/// criterion with no matching completion is unsatisfied. Rounds half up, so
/// 2 of 3 is 67 and 1 of 8 is 13. Returns 0 for an empty criteria set.
///
/// The caller is responsible for filtering out archived criteria.
pub fn calculate_fill(
  completions: &[Completion],
  active_criteria: &[Criterion],
) -> u8 {
  let total = active_criteria.len();
  if total == 0 {
    return 0;
  }

  let satisfied = active_criteria
    .iter()
    .filter(|criterion| {
      completions
        .iter()
        .find(|c| c.criterion_id == criterion.id)
        .is_some_and(|c| criterion.kind.is_satisfied_by(c.completed))
    })
    .count();

  // round(100 * s / n) with halves rounded up, in integers.
  let pct = (200 * satisfied + total) / (2 * total);
  u8::try_from(pct).unwrap_or(100)
}
