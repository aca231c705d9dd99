//! Typed errors for remote API calls.
//!
//! The pipeline's retry loops match on these to decide whether a failure
//! warrants rotating to the next credential.

use thiserror::Error;

/// Result type for remote API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by a remote API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// Quota exhausted or access forbidden for the active credential
    #[error("quota exceeded (status {status}): {message}")]
    Quota { status: u16, message: String },

    /// Network-level failure (connect, timeout, TLS)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other non-success HTTP status
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Whether this failure should trigger credential rotation and a retry
    /// of the same logical step.
    ///
    /// Decode failures are not rotation-worthy: a fresh credential would
    /// receive the same malformed body.
    pub fn should_rotate(&self) -> bool {
        !matches!(self, ApiError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_worthiness() {
        let quota = ApiError::Quota {
            status: 403,
            message: "quotaExceeded".to_string(),
        };
        assert!(quota.should_rotate());

        let status = ApiError::Status {
            status: 500,
            message: "backend error".to_string(),
        };
        assert!(status.should_rotate());

        let decode =
            ApiError::Decode(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(!decode.should_rotate());
    }
}
