//! Error types for the Sanity client.

use thiserror::Error;

/// Result type for Sanity client operations.
pub type Result<T> = std::result::Result<T, SanityError>;

#[derive(Debug, Error)]
pub enum SanityError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the API
    #[error("Sanity API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The mutation succeeded but returned no document
    #[error("Mutation returned no document for {0}")]
    MissingDocument(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
