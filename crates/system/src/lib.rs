pub mod cpu;
pub mod units;

use chrono::{DateTime, TimeDelta, Utc};
use histmon_core::state::SystemSnapshot;
use std::time::Duration;
use sysinfo::{Networks, System};
use tokio::sync::mpsc;
use tokio::time;

/// A snapshot stamped with the wall-clock time it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at:       DateTime<Utc>,
    pub snapshot: SystemSnapshot,
}

/// Spawn a background Tokio task that polls system stats every `interval`
/// and forwards timestamped [`Sample`]s through the returned channel.
///
/// Sample timestamps are strictly increasing even if the wall clock stalls
/// or steps backwards. The task stops automatically when the receiver is
/// dropped.
pub fn spawn_sampler(interval: Duration) -> mpsc::Receiver<Sample> {
    let (tx, rx) = mpsc::channel(4);
    let interval_secs = interval.as_secs_f64();

    tokio::spawn(async move {
        let mut sys      = System::new_all();
        let mut networks = Networks::new_with_refreshed_list();
        let mut ticker   = time::interval(interval);
        let mut last: Option<DateTime<Utc>> = None;

        loop {
            ticker.tick().await;
            sys.refresh_all();
            networks.refresh(false); // false = keep existing interfaces list

            let at = next_timestamp(last, Utc::now());
            last = Some(at);

            let sample = Sample {
                at,
                snapshot: take_snapshot(&sys, &networks, interval_secs),
            };

            if tx.send(sample).await.is_err() {
                tracing::debug!("sample receiver dropped; sampler exiting");
                break;
            }
        }
    });

    rx
}

/// `now`, unless that would not come strictly after `last`, in which case
/// one microsecond past `last`.
fn next_timestamp(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match last {
        Some(prev) if now <= prev => {
            tracing::warn!(%prev, %now, "wall clock did not advance; nudging sample time");
            prev + TimeDelta::microseconds(1)
        }
        _ => now,
    }
}

fn take_snapshot(sys: &System, networks: &Networks, interval_secs: f64) -> SystemSnapshot {
    let cpu_average = cpu::average_usage(sys.cpus().iter().map(|c| c.cpu_usage()));

    // `received()` / `transmitted()` are deltas since the last refresh.
    // Dividing by the interval gives bytes/second.
    let raw_rx: u64 = networks.iter().map(|(_, d)| d.received()).sum();
    let raw_tx: u64 = networks.iter().map(|(_, d)| d.transmitted()).sum();

    SystemSnapshot {
        cpu_average,
        ram_used:  sys.used_memory(),
        ram_total: sys.total_memory(),
        net_rx:    (raw_rx as f64 / interval_secs) as u64,
        net_tx:    (raw_tx as f64 / interval_secs) as u64,
    }
}
