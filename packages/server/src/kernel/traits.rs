// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Submission rules live in the domain functions that call these traits.
//
// Naming convention: Base* for trait names (e.g., BaseRecordStore, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;
use discord_client::WebhookMessage;
use serde_json::{Map, Value};

// =============================================================================
// Record Store Trait (document database, system of record for submissions)
// =============================================================================

/// Equality-filtered listing of one document type.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub doc_type: String,
    /// `field == value` clauses, all of which must hold.
    pub filters: Vec<(String, Value)>,
    /// Sort descending on this field.
    pub newest_first_by: Option<String>,
    pub limit: Option<usize>,
    /// Extra computed fields, `name` ← GROQ expression.
    pub projections: Vec<(String, String)>,
}

impl DocumentQuery {
    pub fn of_type(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            filters: Vec::new(),
            newest_first_by: None,
            limit: None,
            projections: Vec::new(),
        }
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn newest_first(mut self, field: impl Into<String>) -> Self {
        self.newest_first_by = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add a computed field, e.g. a dereferenced asset URL. Stores that
    /// cannot evaluate the expression return the document as stored.
    pub fn project(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.projections.push((name.into(), expression.into()));
        self
    }

    /// Whether a published document satisfies the type and every filter.
    pub fn matches(&self, document: &Value) -> bool {
        let is_draft = document
            .get("_id")
            .and_then(Value::as_str)
            .map_or(true, |id| id.starts_with("drafts."));
        if is_draft {
            return false;
        }
        if document.get("_type").and_then(Value::as_str) != Some(self.doc_type.as_str()) {
            return false;
        }
        self.filters
            .iter()
            .all(|(field, value)| document.get(field) == Some(value))
    }
}

#[async_trait]
pub trait BaseRecordStore: Send + Sync {
    /// Create a document; the store assigns `_id` and returns the stored document.
    async fn create_document(&self, document: Value) -> Result<Value>;

    /// Fetch a document by id, `None` when absent.
    async fn get_document(&self, id: &str) -> Result<Option<Value>>;

    /// Set the given fields and remove the `unset` ones, returning the stored document.
    async fn patch_document(
        &self,
        id: &str,
        set: Map<String, Value>,
        unset: Vec<String>,
    ) -> Result<Value>;

    /// Published documents matching the query.
    async fn query_documents(&self, query: &DocumentQuery) -> Result<Vec<Value>>;
}

// =============================================================================
// Relational Sync Trait (tabular CRM mirror)
// =============================================================================

/// One CRM row.
#[derive(Debug, Clone, PartialEq)]
pub struct CrmRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl CrmRecord {
    /// Text value of a column; absent or non-text cells read as "".
    pub fn text(&self, column: &str) -> String {
        self.fields
            .get(column)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn record_id(&self) -> &str {
        match self {
            UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => id,
        }
    }
}

#[async_trait]
pub trait BaseRelationalSync: Send + Sync {
    /// Rows whose `column` equals `value`.
    async fn find_records(&self, table: &str, column: &str, value: &str) -> Result<Vec<CrmRecord>>;

    /// Every row of a table, optionally sorted descending on a column.
    async fn list_records(&self, table: &str, newest_first_by: Option<&str>) -> Result<Vec<CrmRecord>>;

    async fn create_record(&self, table: &str, fields: Map<String, Value>) -> Result<CrmRecord>;

    async fn update_record(
        &self,
        table: &str,
        record_id: &str,
        fields: Map<String, Value>,
    ) -> Result<CrmRecord>;

    /// Patch the first row whose `key_column` matches the value in `fields`,
    /// or create a new row when none does. A blank key never matches.
    async fn upsert_record(
        &self,
        table: &str,
        key_column: &str,
        fields: Map<String, Value>,
    ) -> Result<UpsertOutcome> {
        let key = fields
            .get(key_column)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("upsert key column {} missing", key_column))?
            .trim()
            .to_string();
        if key.is_empty() {
            let created = self.create_record(table, fields).await?;
            return Ok(UpsertOutcome::Created(created.id));
        }

        let existing = self.find_records(table, key_column, &key).await?;
        match existing.into_iter().next() {
            Some(record) => {
                let updated = self.update_record(table, &record.id, fields).await?;
                Ok(UpsertOutcome::Updated(updated.id))
            }
            None => {
                let created = self.create_record(table, fields).await?;
                Ok(UpsertOutcome::Created(created.id))
            }
        }
    }
}

// =============================================================================
// Notification Trait (chat webhooks)
// =============================================================================

/// Chat channel a message is meant for. Each maps to its own webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    Submissions,
    Introductions,
    Events,
}

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Post a message. An unconfigured channel is a successful no-op.
    async fn send(&self, channel: NotificationChannel, message: &WebhookMessage) -> Result<()>;

    fn is_configured(&self, channel: NotificationChannel) -> bool;
}

// =============================================================================
// Rebuild Trigger Trait (static site republish)
// =============================================================================

#[async_trait]
pub trait BaseRebuildTrigger: Send + Sync {
    /// Fire the one-shot republish signal.
    async fn trigger(&self) -> Result<()>;

    fn is_configured(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_matches_published_documents_of_type() {
        let query = DocumentQuery::of_type("gallerySubmission").filter("status", "approved");

        assert!(query.matches(&json!({"_id": "a", "_type": "gallerySubmission", "status": "approved"})));
        assert!(!query.matches(&json!({"_id": "a", "_type": "gallerySubmission", "status": "submitted"})));
        assert!(!query.matches(&json!({"_id": "a", "_type": "designStyle", "status": "approved"})));
        assert!(!query.matches(&json!({"_id": "drafts.a", "_type": "gallerySubmission", "status": "approved"})));
    }

    #[tokio::test]
    async fn blank_upsert_key_always_creates() {
        let crm = crate::kernel::MockRelationalSync::new();
        let mut fields = Map::new();
        fields.insert("Email".to_string(), json!(""));

        crm.upsert_record("Submissions", "Email", fields.clone())
            .await
            .unwrap();
        let second = crm
            .upsert_record("Submissions", "Email", fields)
            .await
            .unwrap();

        assert!(matches!(second, UpsertOutcome::Created(_)));
        assert_eq!(crm.records("Submissions").len(), 2);
        assert!(!crm
            .calls()
            .iter()
            .any(|call| matches!(call, crate::kernel::CrmCall::Find { .. })));
    }
}
