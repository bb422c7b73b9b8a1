//! Error types for the room availability Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while answering an availability lookup.
#[derive(Error, Debug)]
pub enum Error {
    /// The invocation carried no usable date parameter
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// The store has no record for the requested date
    #[error("No availability record found for date {0}")]
    RecordNotFound(String),

    /// The store could not be reached or failed the read
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored item does not have the shape of an availability record
    #[error("Invalid availability record: {0}")]
    InvalidRecord(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingParameter(_) => 400,
            Error::RecordNotFound(_) => 404,
            Error::StoreUnavailable(_) => 503,
            _ => 500,
        }
    }

    /// Whether the caller should receive this error as a response envelope
    /// rather than as a failed invocation.
    pub fn is_client_visible(&self) -> bool {
        matches!(self, Error::MissingParameter(_) | Error::RecordNotFound(_))
    }
}
