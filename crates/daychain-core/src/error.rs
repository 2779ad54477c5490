//! Error types for `daychain-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("chain not found: {0}")]
  ChainNotFound(Uuid),

  #[error("no active chain")]
  NoActiveChain,

  #[error("criterion not found: {0}")]
  CriterionNotFound(Uuid),

  #[error("criterion {0} already exists")]
  DuplicateCriterion(Uuid),

  #[error("criterion {0} is already archived")]
  AlreadyArchived(Uuid),

  #[error("start date {start} is after today ({today})")]
  StartDateInFuture { start: NaiveDate, today: NaiveDate },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
