//! Error types for the completion client.

use thiserror::Error;

/// Result type alias for completion operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Errors that can occur while talking to a completion provider.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Provider not configured (no API key).
    #[error("completion provider not configured: missing API key")]
    ProviderNotConfigured,

    /// API request failed with a non-success status.
    #[error("API request failed ({status}): {message}")]
    ApiRequest { status: u16, message: String },

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (connect, timeout, body decode).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
