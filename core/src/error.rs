use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;

/// Failure of the external record source during a refresh cycle.
/// Never fatal: the cycle completes as failed and polling continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    #[error("Record source unavailable: {0}")]
    Unavailable(String),

    #[error("Record source returned an unreadable payload: {0}")]
    Malformed(String),
}
