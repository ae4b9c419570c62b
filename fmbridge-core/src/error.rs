//! Error types for bridge operations.

/// The main error type for bridge operations.
///
/// The capability variants (`NotEnabled` through `Backend`) form the closed
/// set of reasons the on-device generation capability can fail with. They
/// are surfaced to callers unchanged and never retried by the session
/// itself; the layers in `fmbridge-layer` may act on `is_retryable`.
#[derive(Debug, thiserror::Error)]
pub enum FmError {
    /// Apple Intelligence is switched off on this device
    #[error("Apple Intelligence is not enabled on this device")]
    NotEnabled,

    /// The device hardware does not support the on-device model
    #[error("this device is not eligible for Apple Intelligence")]
    NotEligible,

    /// Model assets are still being downloaded
    #[error("the on-device model is still downloading")]
    ModelDownloading,

    /// The prompt or reply was rejected by the safety guardrails
    #[error("content rejected by safety guardrails: {0}")]
    ContentFiltered(String),

    /// The caller abandoned the request
    #[error("request cancelled")]
    Cancelled,

    /// A deadline elapsed before the capability produced a result
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Any other failure reported by the generation backend
    #[error("generation backend error: {0}")]
    Backend(String),

    /// The request was malformed before it reached the capability
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The backend does not implement the requested operation
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Serialization/deserialization errors at the host boundary
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Streaming transport errors
    #[error("stream error: {0}")]
    Stream(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl FmError {
    /// Create a content filter error
    pub fn content_filtered(msg: impl Into<String>) -> Self {
        Self::ContentFiltered(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check if this is a retryable error
    ///
    /// The session never retries; this drives the operational layers
    /// (readiness polling, deadline wrappers) stacked around a backend.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FmError::ModelDownloading | FmError::Timeout(_))
    }
}

impl From<String> for FmError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for FmError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_covers_downloading_and_timeout() {
        assert!(FmError::ModelDownloading.is_retryable());
        assert!(FmError::timeout("5s elapsed").is_retryable());
        assert!(!FmError::NotEligible.is_retryable());
        assert!(!FmError::backend("boom").is_retryable());
    }

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            FmError::NotEligible.to_string(),
            "this device is not eligible for Apple Intelligence"
        );
        assert_eq!(
            FmError::backend("device_not_eligible").to_string(),
            "generation backend error: device_not_eligible"
        );
    }
}
