use thiserror::Error;

/// Application-wide error types for vacancy ingestion.
#[derive(Error, Debug)]
pub enum AppError {
    /// The vacancy API answered with something other than a usable 200.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration file missing, unreadable, or incomplete.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Snapshot document could not be written.
    #[error("Snapshot error: {0}")]
    SnapshotError(String),
}

impl AppError {
    /// Returns true if the error came from talking to the vacancy API.
    ///
    /// The orchestrator skips the affected company for these instead of
    /// aborting the run.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::SerializationError(_)
        )
    }
}
