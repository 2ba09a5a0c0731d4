use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure parsed from `histmon.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HistmonConfig {
    pub sampler: SamplerConfig,
    pub history: HistoryConfig,
    pub report:  ReportConfig,
}

/// How often system resources are sampled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Sampling period in milliseconds.
    pub interval_ms: u64,
}

impl SamplerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// Sample history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum span between the oldest and newest retained sample, in seconds.
    /// The history always keeps at least its minimum entry count regardless.
    pub retention_secs: u64,
}

impl HistoryConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { retention_secs: 300 } // 5 min
    }
}

/// Periodic summary logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Seconds between two reports.
    pub every_secs: u64,
    /// Trailing window, in seconds, that each report averages over.
    pub window_secs: u64,
}

impl ReportConfig {
    pub fn every(&self) -> Duration {
        Duration::from_secs(self.every_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            every_secs:  10,
            window_secs: 60,
        }
    }
}
