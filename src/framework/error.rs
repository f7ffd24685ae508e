//! # Errors
//!
//! Fetch failures are values: they travel inside [`FetchState`](super::FetchState) and
//! never end a feed. That is why [`FetchError`] is `Clone` and `PartialEq`.

/// Failure of a single request against an external source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),
    #[error("Could not decode response: {0}")]
    Decode(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Custom(String),
}

impl From<String> for FetchError {
    fn from(msg: String) -> Self {
        FetchError::Custom(msg)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Decode(error.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout(error.to_string())
        } else if error.is_builder() {
            FetchError::InvalidUrl(error.to_string())
        } else if error.is_decode() {
            FetchError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

/// Errors raised while managing the lifecycle of a table pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Composition task failed: {0}")]
    TaskFailed(String),
}
