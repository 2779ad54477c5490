//! Core types and state machine for the daychain habit tracker.
//!
//! Every calendar day is a [`block::Block`]. A block fills according to how
//! many criteria were satisfied that day and is mined (frozen) once the day
//! has fully elapsed. This crate is free of I/O: every operation takes the
//! current state by reference and returns a new value.

pub mod block;
pub mod builder;
pub mod calendar;
pub mod chain;
pub mod clock;
pub mod criterion;
pub mod error;
pub mod fill;
pub mod persist;
pub mod rollover;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
