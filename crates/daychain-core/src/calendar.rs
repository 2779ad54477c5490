//! Calendar-day arithmetic.
//!
//! All block math is done on [`NaiveDate`] so DST transitions and leap years
//! never shift a block boundary. Nothing here adds fixed 24-hour intervals.

use chrono::{NaiveDate, NaiveTime};

use crate::clock::Moment;

/// Whether `date` has fully elapsed as of `now`, i.e. local wall-clock time
/// has reached midnight of the following day. This is the mining rule.
pub fn is_day_elapsed(date: NaiveDate, now: &Moment) -> bool {
  match date.succ_opt() {
    Some(next) => now.local >= next.and_time(NaiveTime::MIN),
    None => false,
  }
}

/// Signed number of calendar days from `start` to `date`.
pub fn day_offset(start: NaiveDate, date: NaiveDate) -> i64 {
  date.signed_duration_since(start).num_days()
}

/// Every calendar day from `start` through `end` inclusive. Empty when
/// `end < start`.
pub fn days_through(
  start: NaiveDate,
  end: NaiveDate,
) -> impl Iterator<Item = NaiveDate> {
  start.iter_days().take_while(move |d| *d <= end)
}

/// `date` moved forward by `days` calendar days, saturating at the last
/// representable date.
pub fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
  date
    .checked_add_days(chrono::Days::new(u64::from(days)))
    .unwrap_or(NaiveDate::MAX)
}
