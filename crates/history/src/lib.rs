//! Bounded, time-ordered in-memory log of recent samples.
//!
//! [`TimeBoundedLog`] keeps every item inserted within the configured
//! retention span, but never drops below [`MIN_RETAINED`] entries. It answers
//! point lookups ([`TimeBoundedLog::before`]) and windowed aggregates
//! ([`TimeBoundedLog::average_between`], [`TimeBoundedLog::count_between`]).

pub mod error;
pub mod log;

pub use error::{HistoryError, LookupError};
pub use log::{Entry, TimeBoundedLog, MIN_RETAINED};
