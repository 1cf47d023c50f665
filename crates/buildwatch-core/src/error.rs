//! Error types for BuildWatch.

use thiserror::Error;

/// Failure talking to the CI server while fetching a job snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("CI server returned status {status}")]
    Status { status: u16 },

    #[error("malformed payload: {0}")]
    Parse(String),
}

/// The notification sink rejected or failed to deliver a message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("rejected by sink: {0}")]
    Rejected(String),
}

/// A build-trigger request was not accepted.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("status code {status}")]
    Rejected { status: u16 },

    #[error("request failed: {0}")]
    Request(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}
