// TestDependencies - in-memory implementations for testing
//
// Provides doubles for every external system that can be injected into
// ServerDeps. Each double records its calls so tests can assert on side effects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use discord_client::WebhookMessage;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    BaseNotifier, BaseRebuildTrigger, BaseRecordStore, BaseRelationalSync, CrmRecord,
    DocumentQuery, NotificationChannel, ServerDeps,
};
use crate::common::ReviewAuthorizer;

/// Review secret accepted by deps built from `TestDependencies`.
pub const TEST_REVIEW_TOKEN: &str = "test-review-token";

/// Fan-out budget for deps built from `TestDependencies`.
pub const TEST_FAN_OUT_TIMEOUT: Duration = Duration::from_millis(250);

/// Sleep for a configured number of milliseconds, if any.
async fn hang(delay_ms: &AtomicU64) {
    let ms = delay_ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

// =============================================================================
// Mock Record Store
// =============================================================================

/// Arguments captured from a patch call
#[derive(Debug, Clone)]
pub struct PatchCall {
    pub id: String,
    pub set: Map<String, Value>,
    pub unset: Vec<String>,
}

#[derive(Default)]
pub struct MockRecordStore {
    documents: Mutex<Vec<Value>>,
    create_calls: AtomicUsize,
    patch_calls: Mutex<Vec<PatchCall>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document as if it had been created elsewhere (e.g. in the studio).
    pub fn insert(&self, document: Value) {
        self.documents.lock().unwrap().push(document);
    }

    pub fn document(&self, id: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|doc| doc.get("_id").and_then(Value::as_str) == Some(id))
            .cloned()
    }

    pub fn documents(&self) -> Vec<Value> {
        self.documents.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn patch_calls(&self) -> Vec<PatchCall> {
        self.patch_calls.lock().unwrap().clone()
    }

    /// Number of calls that wrote to the store.
    pub fn write_count(&self) -> usize {
        self.create_calls() + self.patch_calls.lock().unwrap().len()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BaseRecordStore for MockRecordStore {
    async fn create_document(&self, mut document: Value) -> Result<Value> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("mock record store: write rejected");
        }

        let now = Utc::now().to_rfc3339();
        if let Some(object) = document.as_object_mut() {
            object.insert("_id".into(), Value::String(Uuid::new_v4().to_string()));
            object.insert("_createdAt".into(), Value::String(now.clone()));
            object.insert("_updatedAt".into(), Value::String(now));
            object.insert("_rev".into(), Value::String(Uuid::new_v4().simple().to_string()));
        }
        self.documents.lock().unwrap().push(document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Value>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("mock record store: read rejected");
        }
        Ok(self.document(id))
    }

    async fn patch_document(
        &self,
        id: &str,
        set: Map<String, Value>,
        unset: Vec<String>,
    ) -> Result<Value> {
        self.patch_calls.lock().unwrap().push(PatchCall {
            id: id.to_string(),
            set: set.clone(),
            unset: unset.clone(),
        });
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("mock record store: write rejected");
        }

        let mut documents = self.documents.lock().unwrap();
        let document = documents
            .iter_mut()
            .find(|doc| doc.get("_id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| anyhow::anyhow!("Document {} not found", id))?;

        if let Some(object) = document.as_object_mut() {
            for (key, value) in set {
                object.insert(key, value);
            }
            for key in unset {
                object.remove(&key);
            }
            object.insert("_updatedAt".into(), Value::String(Utc::now().to_rfc3339()));
        }
        Ok(document.clone())
    }

    async fn query_documents(&self, query: &DocumentQuery) -> Result<Vec<Value>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("mock record store: read rejected");
        }

        let mut matches: Vec<Value> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|doc| query.matches(doc))
            .cloned()
            .collect();

        if let Some(field) = &query.newest_first_by {
            let key = |doc: &Value| doc.get(field).and_then(Value::as_str).unwrap_or("").to_string();
            matches.sort_by(|a, b| key(b).cmp(&key(a)));
        }
        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }
}

// =============================================================================
// Mock Relational Sync (CRM)
// =============================================================================

/// A call made against the CRM double
#[derive(Debug, Clone, PartialEq)]
pub enum CrmCall {
    Find { table: String, column: String, value: String },
    List { table: String },
    Create { table: String },
    Update { table: String, record_id: String },
}

#[derive(Default)]
pub struct MockRelationalSync {
    tables: Mutex<HashMap<String, Vec<CrmRecord>>>,
    calls: Mutex<Vec<CrmCall>>,
    fail: AtomicBool,
}

impl MockRelationalSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self, table: &str) -> Vec<CrmRecord> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<CrmCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: CrmCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mock crm: request rejected");
        }
        Ok(())
    }
}

#[async_trait]
impl BaseRelationalSync for MockRelationalSync {
    async fn find_records(&self, table: &str, column: &str, value: &str) -> Result<Vec<CrmRecord>> {
        self.record(CrmCall::Find {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        })?;
        Ok(self
            .records(table)
            .into_iter()
            .filter(|r| r.fields.get(column).and_then(Value::as_str) == Some(value))
            .collect())
    }

    async fn list_records(
        &self,
        table: &str,
        newest_first_by: Option<&str>,
    ) -> Result<Vec<CrmRecord>> {
        self.record(CrmCall::List {
            table: table.to_string(),
        })?;
        let mut records = self.records(table);
        if let Some(column) = newest_first_by {
            let key = |r: &CrmRecord| {
                r.fields
                    .get(column)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            records.sort_by(|a, b| key(b).cmp(&key(a)));
        }
        Ok(records)
    }

    async fn create_record(&self, table: &str, fields: Map<String, Value>) -> Result<CrmRecord> {
        self.record(CrmCall::Create {
            table: table.to_string(),
        })?;
        let record = CrmRecord {
            id: format!("rec{}", Uuid::new_v4().simple()),
            fields,
        };
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        table: &str,
        record_id: &str,
        fields: Map<String, Value>,
    ) -> Result<CrmRecord> {
        self.record(CrmCall::Update {
            table: table.to_string(),
            record_id: record_id.to_string(),
        })?;
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| anyhow::anyhow!("Record {} not found", record_id))?;
        for (key, value) in fields {
            record.fields.insert(key, value);
        }
        Ok(record.clone())
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

pub struct MockNotifier {
    sent: Mutex<Vec<(NotificationChannel, WebhookMessage)>>,
    always_fail: AtomicBool,
    delay_ms: AtomicU64,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            always_fail: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
        }
    }

    /// Every attempted message, including ones that failed.
    pub fn sent(&self) -> Vec<(NotificationChannel, WebhookMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, channel: NotificationChannel) -> Vec<WebhookMessage> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn set_always_fail(&self, fail: bool) {
        self.always_fail.store(fail, Ordering::SeqCst);
    }

    /// Make every send hang this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn send(&self, channel: NotificationChannel, message: &WebhookMessage) -> Result<()> {
        self.sent.lock().unwrap().push((channel, message.clone()));
        hang(&self.delay_ms).await;
        if self.always_fail.load(Ordering::SeqCst) {
            anyhow::bail!("mock notifier: webhook unavailable");
        }
        Ok(())
    }

    fn is_configured(&self, _channel: NotificationChannel) -> bool {
        true
    }
}

// =============================================================================
// Mock Rebuild Trigger
// =============================================================================

#[derive(Default)]
pub struct MockRebuildTrigger {
    calls: AtomicUsize,
    fail: AtomicBool,
    delay_ms: AtomicU64,
}

impl MockRebuildTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl BaseRebuildTrigger for MockRebuildTrigger {
    async fn trigger(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        hang(&self.delay_ms).await;
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mock build hook: 503");
        }
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of doubles plus the `ServerDeps` wired to them.
#[derive(Clone)]
pub struct TestDependencies {
    pub record_store: Arc<MockRecordStore>,
    pub crm: Arc<MockRelationalSync>,
    pub notifier: Arc<MockNotifier>,
    pub rebuild: Arc<MockRebuildTrigger>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            record_store: Arc::new(MockRecordStore::new()),
            crm: Arc::new(MockRelationalSync::new()),
            notifier: Arc::new(MockNotifier::new()),
            rebuild: Arc::new(MockRebuildTrigger::new()),
        }
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.record_store.clone(),
            self.crm.clone(),
            self.notifier.clone(),
            self.rebuild.clone(),
            ReviewAuthorizer::new(Some(TEST_REVIEW_TOKEN.to_string())),
            "DSG".to_string(),
        )
        .with_fan_out_timeout(TEST_FAN_OUT_TIMEOUT)
    }

    /// Total calls made to the non-critical integrations.
    pub fn fan_out_calls(&self) -> usize {
        self.crm.call_count() + self.notifier.call_count() + self.rebuild.call_count()
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
