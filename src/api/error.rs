//! Error types for the library API.

use llm::error::LLMError;
use thiserror::Error;

/// Marker prepended to every failure the client reports as a plain string.
pub const ERROR_SENTINEL: &str = "⚠️ Error:";

/// Failures that can occur while calling a model backend.
///
/// These never cross the public string-returning boundary: `call_model`
/// collapses them into a sentinel-prefixed message so callers always
/// receive a displayable string.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Missing or invalid credential, unsupported backend selection, or an
    /// otherwise unusable request (e.g. an empty prompt).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure: unreachable server, DNS, timeout.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The provider answered, but with an error or an unusable response.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl ClientError {
    /// Render this error as the sentinel-prefixed string handed to callers.
    pub fn to_sentinel_string(&self) -> String {
        format!("{} {}", ERROR_SENTINEL, self)
    }
}

/// True if a string returned by the client marks a failed call.
pub fn is_error_sentinel(s: &str) -> bool {
    s.starts_with(ERROR_SENTINEL)
}

impl From<LLMError> for ClientError {
    fn from(e: LLMError) -> Self {
        match e {
            LLMError::HttpError(msg) => ClientError::Connectivity(msg),
            LLMError::AuthError(msg) => ClientError::Configuration(msg),
            LLMError::InvalidRequest(msg) => ClientError::Configuration(msg),
            other => ClientError::Provider(other.to_string()),
        }
    }
}
