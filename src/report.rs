//! Periodic window summaries computed from the sample history.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use histmon_config::ReportConfig;
use histmon_core::{MonError, Result, SystemSnapshot};
use histmon_history::{Entry, HistoryError, LookupError, TimeBoundedLog};
use histmon_system::units::{format_bytes, format_rate};
use tokio::sync::watch;
use tokio::time::{self, Instant, Interval};
use tracing::{debug, info, warn};

pub type SampleLog = TimeBoundedLog<SystemSnapshot>;

/// Aggregates over one trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Samples with `window start <= t <= now`.
    pub samples:  usize,
    /// Mean snapshot over samples strictly inside the window.
    pub average:  SystemSnapshot,
    /// Latest sample at or before the window start, if any was retained.
    pub baseline: Option<Entry<SystemSnapshot>>,
}

/// Summarise the samples logged during the `window` leading up to `now`.
pub fn summarize(history: &SampleLog, window: Duration, now: DateTime<Utc>) -> Result<Summary> {
    let span = TimeDelta::from_std(window)
        .map_err(|e| MonError::Config(format!("report window out of range: {e}")))?;
    let from = now
        .checked_sub_signed(span)
        .ok_or_else(|| MonError::Config(format!("report window {window:?} out of range")))?;
    // Both window queries exclude their upper bound; include samples stamped `now`.
    let to = now
        .checked_add_signed(TimeDelta::microseconds(1))
        .ok_or_else(|| MonError::Config(format!("report time {now} out of range")))?;

    let samples = history.count_between(from, to);
    let average = history.average_between(
        from,
        to,
        SystemSnapshot::zero(),
        SystemSnapshot::sum,
        SystemSnapshot::divide,
    )?;

    let baseline = match history.before(from) {
        Ok(entry) => Some(entry),
        Err(LookupError::EmptyLog { .. }) => None,
        Err(err @ LookupError::BeforeLogStart { .. }) => {
            debug!("history does not reach back to window start: {err}");
            err.into_fallback()
        }
    };

    Ok(Summary { samples, average, baseline })
}

fn ticker(every: Duration) -> Interval {
    time::interval_at(Instant::now() + every, every)
}

/// Log a [`Summary`] every `config.every()` until the config sender drops.
pub async fn run(history: Arc<SampleLog>, mut config: watch::Receiver<ReportConfig>) {
    let mut current = config.borrow_and_update().clone();
    let mut ticks = ticker(current.every());

    loop {
        tokio::select! {
            _ = ticks.tick() => log_summary(&history, current.window()),
            changed = config.changed() => {
                if changed.is_err() {
                    break; // sender dropped
                }
                current = config.borrow_and_update().clone();
                ticks = ticker(current.every());
                info!(every = ?current.every(), window = ?current.window(), "report schedule updated");
            }
        }
    }
}

fn log_summary(history: &SampleLog, window: Duration) {
    match summarize(history, window, Utc::now()) {
        Ok(summary) => {
            let avg = &summary.average;
            let cpu_trend = summary
                .baseline
                .as_ref()
                .map(|b| avg.cpu_average - b.item.cpu_average)
                .unwrap_or_default();
            info!(
                samples   = summary.samples,
                retained  = history.len(),
                cpu       = %format!("{:.1}%", avg.cpu_average),
                cpu_trend = %format!("{cpu_trend:+.1}"),
                ram       = %format!("{} ({:.0}%)", format_bytes(avg.ram_used), avg.ram_fraction() * 100.0),
                rx        = %format_rate(avg.net_rx),
                tx        = %format_rate(avg.net_tx),
                "window summary"
            );
        }
        Err(MonError::History(HistoryError::EmptyWindow { .. })) => {
            debug!("no samples in report window yet");
        }
        Err(e) => warn!("report failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn cpu(load: f32) -> SystemSnapshot {
        SystemSnapshot { cpu_average: load, ram_total: 100, ..SystemSnapshot::zero() }
    }

    fn filled(points: &[(i64, f32)]) -> SampleLog {
        let log = SampleLog::new(Duration::from_secs(3_600));
        for &(secs, load) in points {
            log.insert(at(secs), cpu(load));
        }
        log
    }

    #[test]
    fn summary_covers_trailing_window() {
        let log = filled(&[(0, 90.0), (50, 10.0), (55, 20.0), (60, 30.0)]);
        let summary = summarize(&log, Duration::from_secs(10), at(60)).unwrap();

        assert_eq!(summary.samples, 3);
        assert_eq!(summary.average.cpu_average, 25.0);
        assert_eq!(summary.average.ram_total, 100);
        assert_eq!(summary.baseline, Some(Entry { at: at(50), item: cpu(10.0) }));
    }

    #[test]
    fn baseline_falls_back_to_oldest_sample() {
        let log = filled(&[(50, 10.0), (55, 20.0)]);
        let summary = summarize(&log, Duration::from_secs(30), at(60)).unwrap();

        assert_eq!(summary.samples, 2);
        assert_eq!(summary.average.cpu_average, 15.0);
        assert_eq!(summary.baseline.map(|b| b.at), Some(at(50)));
    }

    #[test]
    fn empty_history_is_an_empty_window() {
        let log = SampleLog::default();
        let err = summarize(&log, Duration::from_secs(30), at(60)).unwrap_err();
        assert!(matches!(
            err,
            MonError::History(HistoryError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn window_reaching_past_date_range_is_a_config_error() {
        let log = filled(&[(50, 10.0)]);
        let window = histmon_config::parse("[report]\nwindow_secs = 10000000000000\n")
            .unwrap()
            .report
            .window();

        let err = summarize(&log, window, Utc::now()).unwrap_err();
        assert!(matches!(err, MonError::Config(ref msg) if msg.contains("out of range")));
    }

    #[tokio::test]
    async fn run_stops_when_config_sender_drops() {
        let history = Arc::new(filled(&[(0, 1.0)]));
        let (tx, rx) = watch::channel(ReportConfig::default());
        let handle = tokio::spawn(run(Arc::clone(&history), rx));

        time::sleep(Duration::from_millis(20)).await;
        drop(tx);
        handle.await.unwrap();
    }
}
