use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscordError>;

#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Discord webhook returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Discord webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Every attempt failed; carries the last failure.
    #[error("Discord webhook gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<DiscordError>,
    },
}
