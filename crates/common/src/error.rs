use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient data: need at least {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Duplicate bar timestamp: {0}")]
    DuplicateTimestamp(DateTime<Utc>),

    #[error("Notification error: {0}")]
    Notify(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
