use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub sanity_project_id: String,
    pub sanity_dataset: String,
    pub sanity_api_token: String,
    pub sanity_api_version: String,
    pub airtable_base_id: String,
    pub airtable_api_token: String,
    pub discord_webhook_submissions: Option<String>,
    pub discord_webhook_introductions: Option<String>,
    pub discord_webhook_events: Option<String>,
    pub review_api_token: Option<String>,
    pub build_hook_url: Option<String>,
    pub http_timeout: Duration,
    pub request_timeout: Duration,
    /// Per-call budget for the non-critical integrations after a write.
    pub fan_out_timeout: Duration,
    pub confirmation_code_prefix: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let seconds = |key: &str, default: &str| -> Result<Duration> {
            let value = get(key).unwrap_or_else(|| default.to_string());
            let secs = value
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", key))?;
            Ok(Duration::from_secs(secs))
        };

        let request_timeout = seconds("REQUEST_TIMEOUT_SECS", "30")?;
        let fan_out_timeout = seconds("FAN_OUT_TIMEOUT_SECS", "8")?;
        if fan_out_timeout >= request_timeout {
            anyhow::bail!(
                "FAN_OUT_TIMEOUT_SECS ({}) must be below REQUEST_TIMEOUT_SECS ({})",
                fan_out_timeout.as_secs(),
                request_timeout.as_secs()
            );
        }

        Ok(Self {
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            sanity_project_id: require("SANITY_PROJECT_ID")?,
            sanity_dataset: get("SANITY_DATASET").unwrap_or_else(|| "production".to_string()),
            sanity_api_token: require("SANITY_API_TOKEN")?,
            sanity_api_version: get("SANITY_API_VERSION")
                .unwrap_or_else(|| "2023-12-01".to_string()),
            airtable_base_id: require("AIRTABLE_BASE_ID")?,
            airtable_api_token: require("AIRTABLE_API_TOKEN")?,
            discord_webhook_submissions: get("DISCORD_WEBHOOK_SUBMISSIONS")
                .or_else(|| get("DISCORD_WEBHOOK_URL")),
            discord_webhook_introductions: get("DISCORD_WEBHOOK_INTRODUCTIONS"),
            discord_webhook_events: get("DISCORD_WEBHOOK_EVENTS"),
            review_api_token: get("REVIEW_API_TOKEN"),
            build_hook_url: get("BUILD_HOOK_URL"),
            http_timeout: seconds("HTTP_TIMEOUT_SECS", "10")?,
            request_timeout,
            fan_out_timeout,
            confirmation_code_prefix: get("CONFIRMATION_CODE_PREFIX")
                .unwrap_or_else(|| "DSG".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("SANITY_PROJECT_ID", "proj"),
        ("SANITY_API_TOKEN", "sk"),
        ("AIRTABLE_BASE_ID", "app"),
        ("AIRTABLE_API_TOKEN", "pat"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.sanity_dataset, "production");
        assert_eq!(config.sanity_api_version, "2023-12-01");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.fan_out_timeout, Duration::from_secs(8));
        assert_eq!(config.confirmation_code_prefix, "DSG");
        assert!(config.discord_webhook_submissions.is_none());
        assert!(config.review_api_token.is_none());
        assert!(config.build_hook_url.is_none());
    }

    #[test]
    fn missing_required_value_names_the_variable() {
        let err = Config::from_lookup(lookup(&[("SANITY_PROJECT_ID", "proj")])).unwrap_err();
        assert!(err.to_string().contains("SANITY_API_TOKEN"));
    }

    #[test]
    fn legacy_discord_variable_is_a_fallback() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DISCORD_WEBHOOK_URL", "https://discord.test/legacy"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.discord_webhook_submissions.as_deref(),
            Some("https://discord.test/legacy")
        );

        pairs.push(("DISCORD_WEBHOOK_SUBMISSIONS", "https://discord.test/submissions"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.discord_webhook_submissions.as_deref(),
            Some("https://discord.test/submissions")
        );
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("REVIEW_API_TOKEN", "  "));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert!(config.review_api_token.is_none());
    }

    #[test]
    fn fan_out_budget_must_leave_room_in_the_request() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("REQUEST_TIMEOUT_SECS", "10"));
        pairs.push(("FAN_OUT_TIMEOUT_SECS", "10"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("FAN_OUT_TIMEOUT_SECS"));

        pairs.pop();
        pairs.push(("FAN_OUT_TIMEOUT_SECS", "4"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.fan_out_timeout, Duration::from_secs(4));
    }
}
