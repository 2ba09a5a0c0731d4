use histmon_history::HistoryError;
use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum MonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("history query failed: {0}")]
    History(#[from] HistoryError),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = MonError> = std::result::Result<T, E>;
