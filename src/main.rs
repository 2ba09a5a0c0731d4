//! histmon: samples system resource usage into a bounded, time-ordered
//! history and logs trailing-window summaries.
//!
//! Run with:  `RUST_LOG=info histmon [path/to/histmon.toml]`

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use histmon_config::{ConfigWatcher, HistmonConfig, ReportConfig};
use histmon_system::Sample;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use report::SampleLog;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("histmon v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(histmon_config::default_path);
    let mut config = histmon_config::load(&config_path)?;

    let history = Arc::new(SampleLog::new(config.history.retention()));
    let (report_tx, report_rx) = watch::channel(config.report.clone());
    let reporter = tokio::spawn(report::run(Arc::clone(&history), report_rx));

    let mut samples = histmon_system::spawn_sampler(config.sampler.interval());
    let (watcher, mut reloads) = ConfigWatcher::spawn(&config_path);
    let mut last_at: Option<DateTime<Utc>> = None;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(sample) = samples.recv() => record(&history, &mut last_at, sample),
            Some(next) = reloads.recv() => {
                if let Some(sampler) = apply_reload(&history, &report_tx, &config, &next) {
                    samples = sampler;
                }
                config = next;
            }
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
            else => break,
        }
    }

    drop(report_tx);
    reporter.await?;
    info!(
        retained = history.len(),
        config = %watcher.path().display(),
        "histmon stopped"
    );
    Ok(())
}

/// Insert a sample, dropping any that would break the history's time order.
fn record(history: &SampleLog, last_at: &mut Option<DateTime<Utc>>, sample: Sample) {
    if last_at.is_some_and(|last| sample.at <= last) {
        warn!(at = %sample.at, "dropping sample that is not newer than the last one");
        return;
    }
    *last_at = Some(sample.at);
    history.insert(sample.at, sample.snapshot);
}

/// Push changed settings to the running components. Returns a fresh sampler
/// channel when the sampling interval changed.
fn apply_reload(
    history: &SampleLog,
    report: &watch::Sender<ReportConfig>,
    old: &HistmonConfig,
    new: &HistmonConfig,
) -> Option<mpsc::Receiver<Sample>> {
    if old.history != new.history {
        info!(retention = ?new.history.retention(), "history retention changed");
        history.set_retention(new.history.retention());
    }
    if old.report != new.report {
        report.send_replace(new.report.clone());
    }
    (old.sampler != new.sampler).then(|| {
        info!(interval = ?new.sampler.interval(), "restarting sampler");
        histmon_system::spawn_sampler(new.sampler.interval())
    })
}
