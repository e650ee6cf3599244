use axum::{body::Bytes, extract::Extension, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::domains::submissions::activities::{ingest_webhook, IngestOutcome, SkipReason};
use crate::server::app::AppState;

/// POST /webhooks/sanity
///
/// Always 200 so the CMS does not keep redelivering; the body says what happened.
pub async fn sanity_webhook_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Json<Value> {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Webhook payload is not JSON");
            return Json(json!({ "success": false, "message": "Invalid payload" }));
        }
    };

    let body = match ingest_webhook(payload, &state.deps).await {
        IngestOutcome::Skipped(SkipReason::NotASubmission) => json!({
            "success": true,
            "message": "Skipped: not a gallery submission",
        }),
        IngestOutcome::Skipped(SkipReason::Unpublished) => json!({
            "success": true,
            "message": "Skipped: draft or unpublished document",
        }),
        IngestOutcome::Synced(outcome) => json!({
            "success": true,
            "message": "Synced to CRM",
            "recordId": outcome.record_id(),
        }),
        IngestOutcome::SyncFailed(failure) => json!({
            "success": false,
            "message": "CRM sync failed",
            "error": failure.to_string(),
        }),
    };
    Json(body)
}
