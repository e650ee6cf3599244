//! Server dependencies for domain activities (using traits for testability)
//!
//! This module provides the central dependency container used by every
//! domain. All external systems sit behind trait abstractions so tests can
//! swap in the doubles from `test_dependencies`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use airtable_client::{field_equals, AirtableClient, AirtableOptions, Direction, ListOptions};
use anyhow::{Context, Result};
use async_trait::async_trait;
use discord_client::{DiscordWebhook, WebhookMessage};
use sanity_client::{SanityClient, SanityOptions};
use serde_json::{Map, Value};
use tracing::debug;

use crate::common::{Integration, IntegrationError, ReviewAuthorizer};
use crate::config::Config;
use crate::kernel::{
    BaseNotifier, BaseRebuildTrigger, BaseRecordStore, BaseRelationalSync, CrmRecord,
    DocumentQuery, NotificationChannel,
};

// =============================================================================
// SanityClient Adapter (implements BaseRecordStore trait)
// =============================================================================

pub struct SanityRecordStore(pub SanityClient);

impl SanityRecordStore {
    pub fn new(client: SanityClient) -> Self {
        Self(client)
    }
}

/// Render a `DocumentQuery` as GROQ plus its `$param` bindings.
///
/// Drafts are excluded; field names come from code, values travel as params.
pub fn render_groq(query: &DocumentQuery) -> (String, Vec<(String, Value)>) {
    let mut clauses = vec![
        "_type == $type".to_string(),
        "!(_id in path(\"drafts.**\"))".to_string(),
    ];
    let mut params = vec![("type".to_string(), Value::String(query.doc_type.clone()))];

    for (index, (field, value)) in query.filters.iter().enumerate() {
        let name = format!("p{}", index);
        clauses.push(format!("{} == ${}", field, name));
        params.push((name, value.clone()));
    }

    let mut groq = format!("*[{}]", clauses.join(" && "));
    if let Some(field) = &query.newest_first_by {
        groq.push_str(&format!(" | order({} desc)", field));
    }
    if let Some(limit) = query.limit {
        groq.push_str(&format!(" [0...{}]", limit));
    }
    if !query.projections.is_empty() {
        let fields: Vec<String> = query
            .projections
            .iter()
            .map(|(name, expression)| format!("\"{}\": {}", name, expression))
            .collect();
        groq.push_str(&format!(" {{..., {}}}", fields.join(", ")));
    }
    (groq, params)
}

#[async_trait]
impl BaseRecordStore for SanityRecordStore {
    async fn create_document(&self, document: Value) -> Result<Value> {
        Ok(self.0.create(document).await?)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Value>> {
        Ok(self.0.get_document(id).await?)
    }

    async fn patch_document(
        &self,
        id: &str,
        set: Map<String, Value>,
        unset: Vec<String>,
    ) -> Result<Value> {
        let set = (!set.is_empty()).then_some(Value::Object(set));
        Ok(self.0.patch(id, set, unset).await?)
    }

    async fn query_documents(&self, query: &DocumentQuery) -> Result<Vec<Value>> {
        let (groq, params) = render_groq(query);
        debug!(groq = %groq, "Querying record store");
        Ok(self.0.query(&groq, params).await?)
    }
}

// =============================================================================
// AirtableClient Adapter (implements BaseRelationalSync trait)
// =============================================================================

pub struct AirtableSync(pub AirtableClient);

impl AirtableSync {
    pub fn new(client: AirtableClient) -> Self {
        Self(client)
    }
}

fn to_crm_record(record: airtable_client::Record) -> CrmRecord {
    CrmRecord {
        id: record.id,
        fields: record.fields,
    }
}

#[async_trait]
impl BaseRelationalSync for AirtableSync {
    async fn find_records(&self, table: &str, column: &str, value: &str) -> Result<Vec<CrmRecord>> {
        let options = ListOptions {
            filter_by_formula: Some(field_equals(column, value)),
            ..Default::default()
        };
        let records = self.0.list_records(table, &options).await?;
        Ok(records.into_iter().map(to_crm_record).collect())
    }

    async fn list_records(&self, table: &str, newest_first_by: Option<&str>) -> Result<Vec<CrmRecord>> {
        let options = ListOptions {
            sort: newest_first_by.map(|column| (column.to_string(), Direction::Desc)),
            ..Default::default()
        };
        let records = self.0.list_records(table, &options).await?;
        Ok(records.into_iter().map(to_crm_record).collect())
    }

    async fn create_record(&self, table: &str, fields: Map<String, Value>) -> Result<CrmRecord> {
        Ok(to_crm_record(self.0.create_record(table, fields).await?))
    }

    async fn update_record(
        &self,
        table: &str,
        record_id: &str,
        fields: Map<String, Value>,
    ) -> Result<CrmRecord> {
        Ok(to_crm_record(
            self.0.update_record(table, record_id, fields).await?,
        ))
    }
}

// =============================================================================
// Discord Adapter (implements BaseNotifier trait)
// =============================================================================

/// One optional webhook per channel; missing channels are no-ops.
#[derive(Default)]
pub struct DiscordNotifier {
    submissions: Option<DiscordWebhook>,
    introductions: Option<DiscordWebhook>,
    events: Option<DiscordWebhook>,
}

impl DiscordNotifier {
    pub fn new(
        submissions: Option<DiscordWebhook>,
        introductions: Option<DiscordWebhook>,
        events: Option<DiscordWebhook>,
    ) -> Self {
        Self {
            submissions,
            introductions,
            events,
        }
    }

    fn webhook(&self, channel: NotificationChannel) -> Option<&DiscordWebhook> {
        match channel {
            NotificationChannel::Submissions => self.submissions.as_ref(),
            NotificationChannel::Introductions => self.introductions.as_ref(),
            NotificationChannel::Events => self.events.as_ref(),
        }
    }
}

#[async_trait]
impl BaseNotifier for DiscordNotifier {
    async fn send(&self, channel: NotificationChannel, message: &WebhookMessage) -> Result<()> {
        match self.webhook(channel) {
            Some(webhook) => Ok(webhook.execute(message).await?),
            None => {
                debug!(?channel, "Discord webhook not configured, skipping notification");
                Ok(())
            }
        }
    }

    fn is_configured(&self, channel: NotificationChannel) -> bool {
        self.webhook(channel).is_some()
    }
}

// =============================================================================
// Build Hook (implements BaseRebuildTrigger trait)
// =============================================================================

/// POSTs an empty body to a static-host build hook URL.
pub struct BuildHookTrigger {
    client: reqwest::Client,
    url: String,
}

impl BuildHookTrigger {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl BaseRebuildTrigger for BuildHookTrigger {
    async fn trigger(&self) -> Result<()> {
        let response = self.client.post(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Build hook returned {}", status);
        }
        debug!("Build hook triggered");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Used when no build hook is configured.
pub struct NoopRebuildTrigger;

#[async_trait]
impl BaseRebuildTrigger for NoopRebuildTrigger {
    async fn trigger(&self) -> Result<()> {
        debug!("Build hook not configured, skipping rebuild");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Fan-out budget when none is configured.
pub const DEFAULT_FAN_OUT_TIMEOUT: Duration = Duration::from_secs(8);

/// Dependencies accessible to every domain activity
#[derive(Clone)]
pub struct ServerDeps {
    pub record_store: Arc<dyn BaseRecordStore>,
    pub crm: Arc<dyn BaseRelationalSync>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub rebuild: Arc<dyn BaseRebuildTrigger>,
    pub review_auth: ReviewAuthorizer,
    /// Prefix of submission confirmation codes (`DSG` by default).
    pub submission_code_prefix: String,
    /// Upper bound on each non-critical integration call.
    pub fan_out_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        record_store: Arc<dyn BaseRecordStore>,
        crm: Arc<dyn BaseRelationalSync>,
        notifier: Arc<dyn BaseNotifier>,
        rebuild: Arc<dyn BaseRebuildTrigger>,
        review_auth: ReviewAuthorizer,
        submission_code_prefix: String,
    ) -> Self {
        Self {
            record_store,
            crm,
            notifier,
            rebuild,
            review_auth,
            submission_code_prefix,
            fan_out_timeout: DEFAULT_FAN_OUT_TIMEOUT,
        }
    }

    pub fn with_fan_out_timeout(mut self, timeout: Duration) -> Self {
        self.fan_out_timeout = timeout;
        self
    }

    /// Run a non-critical integration call within the fan-out budget.
    ///
    /// Failures and overruns come back as `IntegrationError` values.
    pub async fn best_effort<T, F>(
        &self,
        integration: Integration,
        call: F,
    ) -> Result<T, IntegrationError>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.fan_out_timeout, call).await {
            Ok(result) => result.map_err(|e| IntegrationError::new(integration, e)),
            Err(_) => Err(IntegrationError::new(
                integration,
                anyhow::anyhow!("timed out after {:?}", self.fan_out_timeout),
            )),
        }
    }

    /// Construct the production adapters from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Some(config.http_timeout);

        let sanity = SanityClient::new(SanityOptions {
            project_id: config.sanity_project_id.clone(),
            dataset: config.sanity_dataset.clone(),
            api_version: config.sanity_api_version.clone(),
            token: Some(config.sanity_api_token.clone()),
            timeout,
        })
        .context("Failed to create Sanity client")?;

        let airtable = AirtableClient::new(AirtableOptions {
            base_id: config.airtable_base_id.clone(),
            token: config.airtable_api_token.clone(),
            timeout,
        })
        .context("Failed to create Airtable client")?;

        let webhook = |url: &Option<String>| -> Result<Option<DiscordWebhook>> {
            url.as_ref()
                .map(|url| DiscordWebhook::with_timeout(url.clone(), timeout))
                .transpose()
                .context("Failed to create Discord webhook client")
        };
        let notifier = DiscordNotifier::new(
            webhook(&config.discord_webhook_submissions)?,
            webhook(&config.discord_webhook_introductions)?,
            webhook(&config.discord_webhook_events)?,
        );

        let rebuild: Arc<dyn BaseRebuildTrigger> = match &config.build_hook_url {
            Some(url) => Arc::new(
                BuildHookTrigger::new(url.clone(), config.http_timeout)
                    .context("Failed to create build hook client")?,
            ),
            None => Arc::new(NoopRebuildTrigger),
        };

        Ok(Self::new(
            Arc::new(SanityRecordStore::new(sanity)),
            Arc::new(AirtableSync::new(airtable)),
            Arc::new(notifier),
            rebuild,
            ReviewAuthorizer::new(config.review_api_token.clone()),
            config.confirmation_code_prefix.clone(),
        )
        .with_fan_out_timeout(config.fan_out_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;
    use serde_json::json;

    #[test]
    fn groq_binds_filter_values_as_params() {
        let query = DocumentQuery::of_type("gallerySubmission")
            .filter("status", "approved")
            .newest_first("submittedAt");
        let (groq, params) = render_groq(&query);

        assert_eq!(
            groq,
            "*[_type == $type && !(_id in path(\"drafts.**\")) && status == $p0] | order(submittedAt desc)"
        );
        assert_eq!(
            params,
            vec![
                ("type".to_string(), json!("gallerySubmission")),
                ("p0".to_string(), json!("approved")),
            ]
        );
    }

    #[test]
    fn groq_applies_limit_slice() {
        let query = DocumentQuery::of_type("gallerySubmission")
            .filter("confirmationCode", "DSG-00000000")
            .limit(1);
        let (groq, _) = render_groq(&query);
        assert!(groq.ends_with("confirmationCode == $p0] [0...1]"));
    }

    #[test]
    fn groq_appends_projections_after_the_slice() {
        let query = DocumentQuery::of_type("gallerySubmission")
            .newest_first("submittedAt")
            .project("screenshot", "screenshot.asset->url");
        let (groq, _) = render_groq(&query);
        assert!(groq.ends_with(
            "| order(submittedAt desc) {..., \"screenshot\": screenshot.asset->url}"
        ));
    }

    #[tokio::test]
    async fn unconfigured_channels_are_noops() {
        let notifier = DiscordNotifier::default();
        assert!(!notifier.is_configured(NotificationChannel::Events));
        notifier
            .send(NotificationChannel::Events, &WebhookMessage::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn best_effort_cuts_off_slow_calls() {
        let deps = TestDependencies::new()
            .server_deps()
            .with_fan_out_timeout(Duration::from_millis(20));

        let err = deps
            .best_effort(Integration::Notification, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(err.integration, Integration::Notification);
        assert!(err.source.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn best_effort_tags_failures_with_the_integration() {
        let deps = TestDependencies::new().server_deps();
        let err = deps
            .best_effort(Integration::Crm, async {
                Err::<(), _>(anyhow::anyhow!("422"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.integration, Integration::Crm);
    }
}
