//! Error type for the Anthropic client.

use thiserror::Error;

/// Failures of a single Messages API call. None of them is retried.
#[derive(Debug, Error)]
pub enum AnthropicError {
    /// HTTP 429. `retry_after_ms` is reported for the operator only.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Any other non-success status (401 bad key, 500 internal error, ...).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Transport failure or an undecodable response body.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response carried no text block.
    #[error("model {model} returned no text content")]
    EmptyResponse { model: String },
}
