pub mod schema;
pub mod watcher;

pub use schema::{HistmonConfig, HistoryConfig, ReportConfig, SamplerConfig};
pub use watcher::ConfigWatcher;

use histmon_core::{MonError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `HistmonConfig::default()`
/// if the file doesn't exist so the monitor always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<HistmonConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(HistmonConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| MonError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse and validate configuration from TOML text.
pub fn parse(raw: &str) -> Result<HistmonConfig> {
    let config: HistmonConfig =
        toml::from_str(raw).map_err(|e| MonError::Config(format!("TOML parse error: {e}")))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &HistmonConfig) -> Result<()> {
    let zeroes = [
        ("sampler.interval_ms", config.sampler.interval_ms),
        ("report.every_secs", config.report.every_secs),
        ("report.window_secs", config.report.window_secs),
    ];
    match zeroes.iter().find(|(_, v)| *v == 0) {
        Some((key, _)) => Err(MonError::Config(format!("'{key}' must be greater than zero"))),
        None => Ok(()),
    }
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("histmon").join("histmon.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, HistmonConfig::default());
        assert_eq!(config.sampler.interval(), Duration::from_secs(1));
        assert_eq!(config.history.retention(), Duration::from_secs(300));
        assert_eq!(config.report.window(), Duration::from_secs(60));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse("[history]\nretention_secs = 30\n").unwrap();
        assert_eq!(config.history.retention(), Duration::from_secs(30));
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = parse("[sampler]\ninterval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("sampler.interval_ms"));
    }

    #[test]
    fn zero_retention_is_allowed() {
        let config = parse("[history]\nretention_secs = 0\n").unwrap();
        assert_eq!(config.history.retention(), Duration::ZERO);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = parse("[report\nevery_secs = 3").unwrap_err();
        assert!(matches!(err, MonError::Config(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, HistmonConfig::default());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("histmon.toml");
        std::fs::write(&path, "[report]\nevery_secs = 5\nwindow_secs = 15\n").unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.report.every(), Duration::from_secs(5));
        assert_eq!(config.report.window(), Duration::from_secs(15));
    }
}
