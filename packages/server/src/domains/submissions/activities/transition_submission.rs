//! Transition submission activity - moderation status changes

use chrono::Utc;
use tracing::{error, info};

use super::fan_out::{self, FanOutReport};
use crate::common::{ServiceError, ValidationError};
use crate::domains::submissions::data::StatusUpdate;
use crate::domains::submissions::models::{Submission, SubmissionStatus};
use crate::domains::submissions::notifications::NotificationKind;
use crate::kernel::ServerDeps;

#[derive(Debug)]
pub enum TransitionOutcome {
    /// Same status and notes as stored; nothing was written or sent.
    Unchanged(Submission),
    Updated {
        submission: Submission,
        fan_out: FanOutReport,
    },
}

struct ValidatedUpdate {
    id: String,
    status: SubmissionStatus,
    notes: String,
}

fn validate(update: StatusUpdate) -> Result<ValidatedUpdate, ValidationError> {
    let id = update.submission_id.filter(|v| !v.trim().is_empty());
    let status = update.status.filter(|v| !v.trim().is_empty());

    let (id, status) = match (id, status) {
        (Some(id), Some(status)) => (id, status),
        (id, status) => {
            let mut missing = Vec::new();
            if id.is_none() {
                missing.push("submissionId");
            }
            if status.is_none() {
                missing.push("status");
            }
            return Err(ValidationError::MissingFields(missing));
        }
    };

    let status: SubmissionStatus = status.trim().parse()?;
    // Notes only exist on reviewed statuses.
    let notes = if status.is_reviewed() {
        update.review_notes.unwrap_or_default()
    } else {
        String::new()
    };

    Ok(ValidatedUpdate {
        id: id.trim().to_string(),
        status,
        notes,
    })
}

/// Apply a moderation decision.
///
/// Authorization happens before anything else is looked at. A repeat of the
/// stored status and notes is a no-op. After the write, the CRM mirror, the
/// chat notification and the site rebuild run concurrently and only log.
pub async fn transition_submission(
    authorization: Option<&str>,
    update: StatusUpdate,
    deps: &ServerDeps,
) -> Result<TransitionOutcome, ServiceError> {
    deps.review_auth.authorize(authorization)?;
    let update = validate(update)?;

    let current = Submission::find_by_id(&update.id, deps.record_store.as_ref())
        .await
        .map_err(|e| ServiceError::fetch("submission", e))?
        .ok_or_else(|| ServiceError::NotFound {
            entity: "submission",
            id: update.id.clone(),
        })?;

    if !current.status.can_transition_to(update.status) {
        return Err(ValidationError::IllegalTransition {
            from: current.status.to_string(),
            to: update.status.to_string(),
        }
        .into());
    }

    if current.status == update.status && current.notes_or_empty() == update.notes {
        info!(submission_id = %current.id, status = %current.status, "Transition is a no-op");
        return Ok(TransitionOutcome::Unchanged(current));
    }

    let updated = Submission::update_status(
        &update.id,
        update.status,
        &update.notes,
        Utc::now(),
        deps.record_store.as_ref(),
    )
    .await
    .map_err(|e| {
        error!(submission_id = %update.id, error = %e, "Failed to persist status change");
        ServiceError::persistence("submission", e)
    })?;

    info!(
        submission_id = %updated.id,
        from = %current.status,
        to = %updated.status,
        "Submission status changed"
    );

    let kind = NotificationKind::for_transition(updated.status);
    let (crm, notification, rebuild) = tokio::join!(
        fan_out::sync_mirror(&updated, deps),
        async {
            match kind {
                Some(kind) => Some(fan_out::notify(&updated, kind, deps).await),
                None => None,
            }
        },
        fan_out::rebuild(deps),
    );
    let fan_out = FanOutReport {
        crm: Some(crm.map(|_| ())),
        notification,
        rebuild: Some(rebuild),
    };
    fan_out.log(&updated.id);

    Ok(TransitionOutcome::Updated {
        submission: updated,
        fan_out,
    })
}
