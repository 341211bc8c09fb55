//! Error types shared across mtlab crates.
//!
//! `EngineError` lives here rather than in `mtlab-engines` so the lab engine
//! can downcast it and decide on retries without string matching.

use thiserror::Error;

/// Errors from translation engines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No API key was configured for an engine that needs one.
    #[error("API key missing for engine '{0}'")]
    MissingApiKey(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The engine answered without any translated text.
    #[error("engine returned an empty translation")]
    EmptyResponse,
}

impl EngineError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            EngineError::MissingApiKey(_)
                | EngineError::AuthenticationFailed(_)
                | EngineError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            EngineError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Why an enhanced metric could not be computed for a pair.
///
/// These never reach callers of [`crate::scoring::score`]; a failing metric
/// is simply left out of the score card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("reference has no tokens")]
    EmptyReference,

    #[error("candidate has no tokens")]
    EmptyCandidate,

    #[error("{metric} produced a non-finite value")]
    NonFinite { metric: &'static str },
}
