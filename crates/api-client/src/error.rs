use thiserror::Error;

/// Failures raised while constructing the client or moving bytes to and from
/// the remote API.
///
/// Remote business failures are deliberately absent: the client folds those
/// into the normalized [`ApiResponse`](crate::ApiResponse) instead of raising,
/// so callers inspect a `status` field rather than match on error variants.
/// Only `Configuration` is ever surfaced out of the crate.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing or invalid credential: {0}")]
    Configuration(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Could not reach the API: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Buckets a transport-layer failure into the timeout, connection, or
    /// protocol category. The configured bound is threaded in because
    /// `reqwest::Error` does not carry it.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(timeout_secs)
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
