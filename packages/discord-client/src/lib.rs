//! Discord webhook client.
//!
//! Posts embeds to an incoming webhook URL. Non-success responses and
//! transport failures are retried according to a [`RetryPolicy`], honoring the
//! `Retry-After` header Discord sends when rate limiting.
//!
//! # Example
//!
//! ```rust,ignore
//! use discord_client::{DiscordWebhook, Embed, WebhookMessage};
//!
//! let webhook = DiscordWebhook::new("https://discord.com/api/webhooks/...")?;
//! let embed = Embed::new("New Gallery Submission", 3447003).field("Submitter", "Ada", true);
//! webhook.execute(&WebhookMessage::with_embed("@here", embed)).await?;
//! ```

pub mod error;
pub mod retry;
pub mod types;

pub use error::{DiscordError, Result};
pub use retry::RetryPolicy;
pub use types::{Embed, EmbedField, EmbedFooter, WebhookMessage};

use std::time::Duration;

use reqwest::{header::RETRY_AFTER, Client};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: Client,
    url: String,
    policy: RetryPolicy,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, None)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post a message, retrying up to `policy.max_attempts` times.
    pub async fn execute(&self, message: &WebhookMessage) -> Result<()> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<DiscordError> = None;

        for attempt in 1..=max_attempts {
            let delay = match self.client.post(&self.url).json(message).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(attempt, "Discord webhook delivered");
                    return Ok(());
                }
                Ok(response) => {
                    let status = response.status();
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .map(|value| value.to_str().unwrap_or_default().to_string());
                    let body = response.text().await.unwrap_or_default();
                    warn!(attempt, status = status.as_u16(), retry_after = ?retry_after, "Discord webhook rejected message");

                    last_error = Some(DiscordError::Status {
                        status: status.as_u16(),
                        message: body,
                    });
                    self.policy.after_status(attempt, retry_after.as_deref())
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Discord webhook request failed");
                    last_error = Some(DiscordError::Transport(e));
                    self.policy.after_transport_error(attempt)
                }
            };

            if attempt < max_attempts && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let last = last_error.unwrap_or(DiscordError::Status {
            status: 0,
            message: "no attempt made".to_string(),
        });
        Err(DiscordError::Exhausted {
            attempts: max_attempts,
            last: Box::new(last),
        })
    }
}
