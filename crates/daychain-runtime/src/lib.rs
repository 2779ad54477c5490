//! Runtime wiring for daychain.
//!
//! [`Tracker`] is the public contract toward a UI collaborator: it owns the
//! multi-chain state, persists every change through a
//! [`daychain_core::persist::StateStore`], and exposes the chain, criteria,
//! toggle, and rollover operations. [`RolloverTask`] drives the tracker's
//! rollover tick on a timer.

pub mod config;
pub mod error;
pub mod schedule;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{Error, Result};
pub use schedule::RolloverTask;
pub use tracker::Tracker;

#[cfg(test)]
mod tests;
