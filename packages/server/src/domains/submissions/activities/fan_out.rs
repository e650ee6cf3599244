//! Best-effort propagation after the authoritative write.
//!
//! Each step returns its failure as a value and is cut off at the fan-out
//! budget. Callers run them with `tokio::join!` so no step can cancel or block
//! another, then log the report.

use tracing::{debug, warn};

use crate::common::{Integration, IntegrationError};
use crate::domains::submissions::mirror::{mirror_fields, mirror_key_column, SUBMISSIONS_TABLE};
use crate::domains::submissions::models::Submission;
use crate::domains::submissions::notifications::{build_message, NotificationKind};
use crate::kernel::{NotificationChannel, ServerDeps, UpsertOutcome};

/// Outcome of every fan-out step; `None` means the step did not apply.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub crm: Option<Result<(), IntegrationError>>,
    pub notification: Option<Result<(), IntegrationError>>,
    pub rebuild: Option<Result<(), IntegrationError>>,
}

impl FanOutReport {
    pub fn failures(&self) -> impl Iterator<Item = &IntegrationError> {
        [&self.crm, &self.notification, &self.rebuild]
            .into_iter()
            .filter_map(|step| step.as_ref().and_then(|r| r.as_ref().err()))
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Log each failed step at warn. Nothing is propagated.
    pub fn log(&self, submission_id: &str) {
        for failure in self.failures() {
            warn!(
                submission_id = %submission_id,
                integration = %failure.integration,
                error = %failure.source,
                "Non-critical integration failed"
            );
        }
    }
}

/// Upsert the CRM mirror row, keyed by submitter email or, without one, by document id.
pub async fn sync_mirror(
    submission: &Submission,
    deps: &ServerDeps,
) -> Result<UpsertOutcome, IntegrationError> {
    let outcome = deps
        .best_effort(
            Integration::Crm,
            deps.crm.upsert_record(
                SUBMISSIONS_TABLE,
                mirror_key_column(submission),
                mirror_fields(submission),
            ),
        )
        .await?;

    debug!(
        submission_id = %submission.id,
        record_id = %outcome.record_id(),
        created = matches!(outcome, UpsertOutcome::Created(_)),
        "CRM mirror synced"
    );
    Ok(outcome)
}

pub async fn notify(
    submission: &Submission,
    kind: NotificationKind,
    deps: &ServerDeps,
) -> Result<(), IntegrationError> {
    let message = build_message(submission, kind);
    deps.best_effort(
        Integration::Notification,
        deps.notifier.send(NotificationChannel::Submissions, &message),
    )
    .await
}

pub async fn rebuild(deps: &ServerDeps) -> Result<(), IntegrationError> {
    deps.best_effort(Integration::RebuildHook, deps.rebuild.trigger())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collects_only_failures() {
        let report = FanOutReport {
            crm: Some(Ok(())),
            notification: Some(Err(IntegrationError::new(
                Integration::Notification,
                anyhow::anyhow!("429"),
            ))),
            rebuild: None,
        };

        let failures: Vec<_> = report.failures().map(|f| f.integration).collect();
        assert_eq!(failures, vec![Integration::Notification]);
        assert!(!report.is_clean());
        assert!(FanOutReport::default().is_clean());
    }
}
