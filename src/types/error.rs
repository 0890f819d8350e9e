use thiserror::Error;

/// readlog error types
#[derive(Error, Debug)]
pub enum ReadlogError {
    /// Candidate entry rejected before reaching storage
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage backend failed or holds an unusable value
    #[error("storage error: {0}")]
    Storage(String),

    /// Failed to encode/decode JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Background service went away before replying
    #[error("channel error: {0}")]
    Channel(String),
}

/// Result type alias for readlog
pub type Result<T> = std::result::Result<T, ReadlogError>;
