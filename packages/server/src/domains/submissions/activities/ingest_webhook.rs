//! Ingest record store change notifications into the CRM mirror

use serde_json::Value;
use tracing::{debug, info, warn};

use super::fan_out;
use crate::common::{Integration, IntegrationError};
use crate::domains::submissions::models::{Submission, SUBMISSION_DOC_TYPE};
use crate::kernel::{ServerDeps, UpsertOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotASubmission,
    /// Draft revision or no `_id` at all
    Unpublished,
}

#[derive(Debug)]
pub enum IngestOutcome {
    Skipped(SkipReason),
    Synced(UpsertOutcome),
    SyncFailed(IntegrationError),
}

/// Accept either `{"document": {...}}` or the bare document.
fn unwrap_document(payload: Value) -> Value {
    match payload {
        Value::Object(mut object) if object.get("document").map_or(false, Value::is_object) => {
            object.remove("document").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Mirror a changed submission into the CRM.
///
/// Never fails the caller: skips and sync errors are reported as outcomes.
pub async fn ingest_webhook(payload: Value, deps: &ServerDeps) -> IngestOutcome {
    let document = unwrap_document(payload);

    if document.get("_type").and_then(Value::as_str) != Some(SUBMISSION_DOC_TYPE) {
        debug!("Webhook skipped: not a gallery submission");
        return IngestOutcome::Skipped(SkipReason::NotASubmission);
    }

    let published = document
        .get("_id")
        .and_then(Value::as_str)
        .map_or(false, |id| !id.is_empty() && !id.starts_with("drafts."));
    if !published {
        debug!("Webhook skipped: draft or unpublished document");
        return IngestOutcome::Skipped(SkipReason::Unpublished);
    }

    let submission = match Submission::from_document(document) {
        Ok(Some(submission)) => submission,
        Ok(None) => return IngestOutcome::Skipped(SkipReason::NotASubmission),
        Err(e) => {
            let failure = IntegrationError::new(Integration::Crm, e);
            warn!(error = %failure, "Webhook document could not be mapped");
            return IngestOutcome::SyncFailed(failure);
        }
    };

    match fan_out::sync_mirror(&submission, deps).await {
        Ok(outcome) => {
            info!(
                submission_id = %submission.id,
                record_id = %outcome.record_id(),
                "Webhook synced to CRM"
            );
            IngestOutcome::Synced(outcome)
        }
        Err(failure) => {
            warn!(submission_id = %submission.id, error = %failure, "Webhook CRM sync failed");
            IngestOutcome::SyncFailed(failure)
        }
    }
}
