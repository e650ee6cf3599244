use thiserror::Error;

pub type Result<T> = std::result::Result<T, AirtableError>;

#[derive(Debug, Error)]
pub enum AirtableError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Airtable API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Create call returned an empty `records` array
    #[error("Airtable returned no record for table {0}")]
    EmptyResponse(String),
}
