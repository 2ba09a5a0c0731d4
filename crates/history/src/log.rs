use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::error::{HistoryError, LookupError};

/// Eviction never shrinks the log below this many entries.
pub const MIN_RETAINED: usize = 100;

/// A retained item together with the time it was logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<T> {
    pub at:   DateTime<Utc>,
    pub item: T,
}

/// Time-ordered log that forgets entries older than its retention span.
///
/// Callers must insert in strictly increasing time order. Eviction trims
/// from the oldest end while the log holds more than [`MIN_RETAINED`]
/// entries *and* the newest and oldest timestamps are further apart than the
/// retention. Queries scan linearly from oldest to newest.
///
/// All state sits behind one mutex; every method holds it for its entire
/// body, so reads and writes never interleave.
#[derive(Debug)]
pub struct TimeBoundedLog<T> {
    inner: Mutex<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    retention: Duration,
    items:     HashMap<DateTime<Utc>, T>,
    times:     VecDeque<DateTime<Utc>>,
}

impl<T> Inner<T> {
    fn span_exceeds_retention(&self) -> bool {
        let (Some(oldest), Some(newest)) = (self.times.front(), self.times.back()) else {
            return false;
        };
        // A negative span only happens after out-of-order inserts.
        newest
            .signed_duration_since(*oldest)
            .to_std()
            .is_ok_and(|span| span > self.retention)
    }

    fn evict_expired(&mut self) -> usize {
        let mut evicted = 0;
        while self.times.len() > MIN_RETAINED && self.span_exceeds_retention() {
            if let Some(oldest) = self.times.pop_front() {
                self.items.remove(&oldest);
                evicted += 1;
            }
        }
        evicted
    }

    fn item_at(&self, at: &DateTime<Utc>) -> &T {
        match self.items.get(at) {
            Some(item) => item,
            None => self.corrupted(),
        }
    }

    fn entry_at(&self, at: DateTime<Utc>) -> Entry<T>
    where
        T: Clone,
    {
        Entry { at, item: self.item_at(&at).clone() }
    }

    fn check_consistency(&self) {
        if self.times.len() != self.items.len() {
            self.corrupted();
        }
    }

    #[cold]
    fn corrupted(&self) -> ! {
        error!(
            times = self.times.len(),
            items = self.items.len(),
            "history in inconsistent state"
        );
        panic!(
            "history in inconsistent state: {} times, {} items",
            self.times.len(),
            self.items.len()
        );
    }
}

impl<T> TimeBoundedLog<T> {
    pub fn new(retention: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                retention,
                items: HashMap::new(),
                times: VecDeque::new(),
            }),
        }
    }

    /// Replace the retention span. Takes effect on the next [`insert`](Self::insert);
    /// nothing is evicted here.
    pub fn set_retention(&self, retention: Duration) {
        let mut inner = self.inner.lock();
        debug!(old = ?inner.retention, new = ?retention, "history retention updated");
        inner.retention = retention;
    }

    pub fn retention(&self) -> Duration {
        self.inner.lock().retention
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.inner.lock().times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().times.is_empty()
    }

    /// Append `item` logged at `at`, then evict expired entries.
    ///
    /// # Panics
    ///
    /// Panics if the timestamp index and the item map disagree in length
    /// after the append, which happens when `at` was already present. The
    /// log is unusable afterwards; the panic must not be caught and retried.
    pub fn insert(&self, at: DateTime<Utc>, item: T) {
        let mut inner = self.inner.lock();

        if let Some(newest) = inner.times.back() {
            if at < *newest {
                warn!(%at, %newest, "history insert out of time order");
            }
        }

        inner.times.push_back(at);
        inner.items.insert(at, item);
        inner.check_consistency();

        let evicted = inner.evict_expired();
        if evicted > 0 {
            trace!(evicted, retained = inner.times.len(), "evicted expired history entries");
        }
    }

    /// Number of entries logged at `t` with `start <= t < end`.
    pub fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
        let inner = self.inner.lock();
        inner
            .times
            .iter()
            .take_while(|t| **t < end)
            .filter(|t| **t >= start)
            .count()
    }

    /// Average of the entries logged strictly between `from` and `to`.
    ///
    /// `zero` seeds the accumulator, `sum` folds each matching item into it and
    /// `divide` turns the total and match count into the average.
    pub fn average_between<S, D>(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        zero: T,
        mut sum: S,
        divide: D,
    ) -> Result<T, HistoryError>
    where
        S: FnMut(T, &T) -> T,
        D: FnOnce(T, usize) -> T,
    {
        let inner = self.inner.lock();

        let (total, count) = inner
            .times
            .iter()
            .filter(|t| **t > from)
            .take_while(|t| **t < to)
            .fold((zero, 0usize), |(acc, n), t| (sum(acc, inner.item_at(t)), n + 1));

        if count == 0 {
            return Err(HistoryError::EmptyWindow { from, to });
        }
        Ok(divide(total, count))
    }
}

impl<T: Clone> TimeBoundedLog<T> {
    /// The latest entry logged at or before `wanted`.
    ///
    /// When `wanted` precedes the whole log the error still carries the
    /// oldest entry as a fallback answer.
    pub fn before(&self, wanted: DateTime<Utc>) -> Result<Entry<T>, LookupError<T>> {
        let inner = self.inner.lock();

        let Some(&oldest) = inner.times.front() else {
            return Err(LookupError::EmptyLog { now: Utc::now() });
        };

        if wanted < oldest {
            return Err(LookupError::BeforeLogStart {
                wanted,
                oldest: inner.entry_at(oldest),
            });
        }

        let at = inner
            .times
            .iter()
            .take_while(|t| **t <= wanted)
            .last()
            .copied()
            .unwrap_or(oldest);

        Ok(inner.entry_at(at))
    }

    pub fn oldest(&self) -> Option<Entry<T>> {
        let inner = self.inner.lock();
        inner.times.front().map(|at| inner.entry_at(*at))
    }

    pub fn newest(&self) -> Option<Entry<T>> {
        let inner = self.inner.lock();
        inner.times.back().map(|at| inner.entry_at(*at))
    }
}

impl<T> Default for TimeBoundedLog<T> {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
