//! Record store webhook ingestion into the CRM mirror.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use server_core::domains::submissions::activities::{ingest_webhook, IngestOutcome, SkipReason};
use server_core::kernel::UpsertOutcome;
use test_context::test_context;

use crate::common::*;

#[test_context(TestHarness)]
#[tokio::test]
async fn test_other_document_types_are_skipped(ctx: &TestHarness) {
    let payload = json!({"document": {"_id": "style-1", "_type": "designStyle"}});

    let outcome = ingest_webhook(payload.clone(), &ctx.deps).await;
    assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::NotASubmission)));

    let response = ctx.post("/webhooks/sanity", &payload).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["message"], "Skipped: not a gallery submission");
    assert_eq!(ctx.mocks.crm.call_count(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_drafts_and_documents_without_id_are_skipped(ctx: &TestHarness) {
    let draft = submission_document("drafts.doc1", "submitted", "g@h.com");
    let mut no_id = submission_document("doc1", "submitted", "g@h.com");
    no_id.as_object_mut().unwrap().remove("_id");

    for payload in [json!({"document": draft}), no_id] {
        let outcome = ingest_webhook(payload.clone(), &ctx.deps).await;
        assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::Unpublished)));

        let response = ctx.post("/webhooks/sanity", &payload).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], "Skipped: draft or unpublished document");
    }
    assert_eq!(ctx.mocks.crm.call_count(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_published_submission_is_upserted_by_email(ctx: &TestHarness) {
    let first = submission_document("doc1", "submitted", "g@h.com");
    let outcome = ingest_webhook(json!({ "document": first }), &ctx.deps).await;
    assert!(matches!(outcome, IngestOutcome::Synced(UpsertOutcome::Created(_))));

    // Bare documents are accepted too, and land on the same row
    let second = submission_document("doc1", "approved", "g@h.com");
    let response = ctx.post("/webhooks/sanity", &second).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Synced to CRM");

    let rows = ctx.mocks.crm.records("Submissions");
    assert_eq!(rows.len(), 1);
    assert_eq!(response.body["recordId"], json!(rows[0].id));
    assert_eq!(rows[0].fields["Status"], "approved");
    assert_eq!(rows[0].fields["Sanity ID"], "doc1");
    assert_eq!(rows[0].fields["Reviewed At"], "");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_documents_without_email_keep_separate_rows(ctx: &TestHarness) {
    for id in ["docA", "docB"] {
        let mut document = submission_document(id, "submitted", "");
        document.as_object_mut().unwrap().remove("submitterEmail");
        let outcome = ingest_webhook(json!({ "document": document }), &ctx.deps).await;
        assert!(matches!(outcome, IngestOutcome::Synced(UpsertOutcome::Created(_))));
    }

    // A later change to docA lands on docA's row
    let document = submission_document("docA", "approved", "");
    let outcome = ingest_webhook(document, &ctx.deps).await;
    assert!(matches!(outcome, IngestOutcome::Synced(UpsertOutcome::Updated(_))));

    let rows = ctx.mocks.crm.records("Submissions");
    let mut rows: Vec<(String, String)> = rows
        .iter()
        .map(|r| (r.text("Sanity ID"), r.text("Status")))
        .collect();
    rows.sort();
    assert_eq!(
        rows,
        vec![
            ("docA".to_string(), "approved".to_string()),
            ("docB".to_string(), "submitted".to_string()),
        ]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_crm_failure_is_reported_with_200(ctx: &TestHarness) {
    ctx.mocks.crm.set_fail(true);
    let payload = json!({"document": submission_document("doc1", "submitted", "g@h.com")});

    let response = ctx.post("/webhooks/sanity", &payload).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "CRM sync failed");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_malformed_payload_is_acknowledged(ctx: &TestHarness) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/sanity")
        .header("content-type", "application/json")
        .body(Body::from("<xml/>"))
        .unwrap();

    let response = ctx.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "Invalid payload");
    assert_eq!(ctx.mocks.crm.call_count(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_webhook_never_notifies_or_rebuilds(ctx: &TestHarness) {
    let payload = submission_document("doc1", "approved", "g@h.com");
    ctx.post("/webhooks/sanity", &payload).await;

    assert_eq!(ctx.mocks.notifier.call_count(), 0);
    assert_eq!(ctx.mocks.rebuild.call_count(), 0);
    assert_eq!(ctx.mocks.record_store.write_count(), 0);
}
