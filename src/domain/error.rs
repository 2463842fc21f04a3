use thiserror::Error;

/// Failure of a single call to an external price, news or sentiment source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// Network failure, timeout, rate limit or non-success status.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// The source answered with something we could not interpret.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store write failed: {0}")]
    StoreWrite(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.to_string())
    }
}
