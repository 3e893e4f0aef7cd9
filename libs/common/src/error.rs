use thiserror::Error;

/// Logging bootstrap errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Logging already initialized: {0}")]
    Init(String),
}

pub type Result<T> = std::result::Result<T, LoggingError>;
