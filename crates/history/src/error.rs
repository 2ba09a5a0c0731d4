use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::log::Entry;

/// Recoverable conditions reported by [`TimeBoundedLog`](crate::TimeBoundedLog) queries.
///
/// The internal consistency fault is deliberately absent: it panics instead,
/// and must not be caught and retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("empty log")]
    EmptyLog,

    #[error("wanted time {wanted} before log start {start}")]
    BeforeLogStart {
        wanted: DateTime<Utc>,
        start:  DateTime<Utc>,
    },

    #[error("no values to average between {from} and {to}")]
    EmptyWindow {
        from: DateTime<Utc>,
        to:   DateTime<Utc>,
    },
}

/// Failure of a point lookup, carrying whatever degraded answer exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError<T> {
    /// Nothing retained. `now` is the wall-clock time of the lookup.
    #[error("empty log")]
    EmptyLog { now: DateTime<Utc> },

    /// The wanted time precedes every retained entry; `oldest` is the closest
    /// available answer.
    #[error("wanted time {wanted} before log start {}", .oldest.at)]
    BeforeLogStart {
        wanted: DateTime<Utc>,
        oldest: Entry<T>,
    },
}

impl<T> LookupError<T> {
    /// The payload-free classification of this error.
    pub fn kind(&self) -> HistoryError {
        match self {
            Self::EmptyLog { .. } => HistoryError::EmptyLog,
            Self::BeforeLogStart { wanted, oldest } => HistoryError::BeforeLogStart {
                wanted: *wanted,
                start:  oldest.at,
            },
        }
    }

    /// Best-effort entry returned alongside the error, if any.
    pub fn fallback(&self) -> Option<&Entry<T>> {
        match self {
            Self::EmptyLog { .. } => None,
            Self::BeforeLogStart { oldest, .. } => Some(oldest),
        }
    }

    pub fn into_fallback(self) -> Option<Entry<T>> {
        match self {
            Self::EmptyLog { .. } => None,
            Self::BeforeLogStart { oldest, .. } => Some(oldest),
        }
    }
}

impl<T> From<LookupError<T>> for HistoryError {
    fn from(err: LookupError<T>) -> Self {
        err.kind()
    }
}
