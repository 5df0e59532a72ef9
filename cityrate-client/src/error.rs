//! Error types for the client
//!
//! Transport failures, non-success statuses and unreadable bodies are all
//! "the request failed" as far as views are concerned; the variants exist
//! for logging.

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the service or the connection broke
    #[error("Network error: {0}")]
    Network(String),

    /// Service answered with a non-success status
    #[error("Request failed with status {0}")]
    Status(u16),

    /// Body was empty or not the expected JSON
    #[error("Malformed response: {0}")]
    Parse(String),

    /// Login identifier rejected by the service
    #[error("{0}")]
    InvalidUser(String),

    /// A submission for the same target is still in flight
    #[error("A submission is already in progress")]
    Busy,

    /// Voting queue has no cities left
    #[error("No cities left to vote on")]
    EmptyQueue,

    /// View data has not loaded (or failed to load)
    #[error("Data is not loaded")]
    NotReady,

    /// Action requires a logged-in user
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Unknown city: {0}")]
    UnknownCity(String),

    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// Action is not available in the current state
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// cityrate-common error
    #[error(transparent)]
    Common(#[from] cityrate_common::Error),
}

impl ClientError {
    /// True for failures of the request itself (as opposed to local state)
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Status(_) | ClientError::Parse(_)
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
