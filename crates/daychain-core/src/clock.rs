//! Injectable wall clock.
//!
//! Operations never read the system time themselves. Callers capture a
//! [`Moment`] once per tick or user action and pass it down, so a single
//! operation always sees one consistent "now".

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// A captured point in time: the absolute instant plus the local wall-clock
/// reading used for calendar decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
  pub instant: DateTime<Utc>,
  pub local:   NaiveDateTime,
}

impl Moment {
  /// A moment whose local reading is `local`, with the instant taken as the
  /// same wall time in UTC.
  pub fn from_local(local: NaiveDateTime) -> Self {
    Self { instant: local.and_utc(), local }
  }

  /// The local calendar date.
  pub fn today(&self) -> NaiveDate { self.local.date() }
}

/// Source of [`Moment`]s.
pub trait Clock: Send + Sync {
  fn now(&self) -> Moment;
}

/// The host's real clock in its local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Moment {
    let local = Local::now();
    Moment {
      instant: local.with_timezone(&Utc),
      local:   local.naive_local(),
    }
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  local: Mutex<NaiveDateTime>,
}

impl ManualClock {
  pub fn new(local: NaiveDateTime) -> Self { Self { local: Mutex::new(local) } }

  pub fn set(&self, local: NaiveDateTime) {
    *self.local.lock().unwrap_or_else(PoisonError::into_inner) = local;
  }

  pub fn advance(&self, by: TimeDelta) {
    let mut guard = self.local.lock().unwrap_or_else(PoisonError::into_inner);
    *guard += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Moment {
    Moment::from_local(*self.local.lock().unwrap_or_else(PoisonError::into_inner))
  }
}
