//! Criteria: the goals and prohibitions a chain tracks.
//!
//! A criterion is never deleted. Archiving is a one-way lifecycle transition
//! that removes it from the active set while leaving every historical
//! completion that references it untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Whether a criterion is satisfied by doing something or by avoiding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionKind {
  /// Satisfied when the completion is checked.
  Goal,
  /// Satisfied when the completion is left unchecked.
  Prohibition,
}

impl CriterionKind {
  /// Whether a completion flag satisfies a criterion of this kind.
  pub fn is_satisfied_by(self, completed: bool) -> bool {
    match self {
      Self::Goal => completed,
      Self::Prohibition => !completed,
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle of a criterion. The only transition is `Active → Archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CriterionStatus {
  #[default]
  Active,
  Archived {
    at: DateTime<Utc>,
  },
}

impl CriterionStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

// ─── Criterion ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
  pub id:          Uuid,
  pub name:        String,
  pub description: String,
  pub kind:        CriterionKind,
  pub created_at:  DateTime<Utc>,
  #[serde(default)]
  pub status:      CriterionStatus,
}

impl Criterion {
  /// A fresh, active criterion with a random id.
  pub fn new(
    name: impl Into<String>,
    description: impl Into<String>,
    kind: CriterionKind,
    created_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      description: description.into(),
      kind,
      created_at,
      status: CriterionStatus::Active,
    }
  }

  pub fn is_active(&self) -> bool { self.status.is_active() }

  /// Apply `patch`, refusing to touch an archived criterion.
  pub(crate) fn patched(&self, patch: &CriterionPatch) -> Result<Self> {
    if !self.is_active() {
      return Err(Error::AlreadyArchived(self.id));
    }
    let mut next = self.clone();
    if let Some(name) = &patch.name {
      next.name = name.clone();
    }
    if let Some(description) = &patch.description {
      next.description = description.clone();
    }
    if let Some(kind) = patch.kind {
      next.kind = kind;
    }
    Ok(next)
  }

  /// The archived form of this criterion.
  pub(crate) fn archived(&self, at: DateTime<Utc>) -> Result<Self> {
    if !self.is_active() {
      return Err(Error::AlreadyArchived(self.id));
    }
    Ok(Self { status: CriterionStatus::Archived { at }, ..self.clone() })
  }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// Partial update for [`crate::chain::ChainState::update_criterion`]. `None`
/// fields are left as they are. Identity and lifecycle are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionPatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub kind:        Option<CriterionKind>,
}

/// The non-archived subset of `criteria`, in registry order.
pub fn active(criteria: &[Criterion]) -> Vec<Criterion> {
  criteria.iter().filter(|c| c.is_active()).cloned().collect()
}
