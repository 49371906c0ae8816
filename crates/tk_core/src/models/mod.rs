//! # Models
//!
//! Row types for the events and rounds tables.

pub mod event;
pub mod round;

pub use event::{Event, EventKind, Side};
pub use round::{MatchData, RoundRow};
