//! Component error taxonomy
//!
//! Errors stay local to the component that hit them; none of these are fatal.
//! Application plumbing (config, terminal setup) uses `anyhow` instead.

use thiserror::Error;

/// Failure reported by the boat data service
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    /// The request never produced a response (connect, timeout, ...)
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with an error; the message is user-facing
    #[error("{0}")]
    Rejected(String),

    /// The response body could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Read-side failure: recorded for display, retried only by the next
/// filter change or refresh
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("unknown boat type: {0:?}")]
    UnknownBoatType(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Write-side failure: surfaced to the user, unsaved edits are kept
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SaveError {
    #[error("{0}")]
    Rejected(String),

    #[error("edit references unknown boat {0:?}")]
    UnknownRecord(String),

    #[error("nothing to save")]
    Empty,
}

impl From<ServiceError> for SaveError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected(message) => SaveError::Rejected(message),
            other => SaveError::Rejected(other.to_string()),
        }
    }
}

/// Geolocation outcome other than a position
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("geolocation is not supported")]
    Unsupported,

    #[error("geolocation permission denied")]
    Denied,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}
