//! Create submission activity - public form intake

use chrono::Utc;
use tracing::{error, info};

use super::fan_out::{self, FanOutReport};
use crate::common::{generate_code, ServiceError, ValidationError};
use crate::domains::submissions::data::NewSubmission;
use crate::domains::submissions::models::{Reference, Submission, SubmissionStatus};
use crate::domains::submissions::notifications::NotificationKind;
use crate::kernel::ServerDeps;

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check every required field, reporting all missing ones together.
pub fn validate(input: &NewSubmission) -> Result<Submission, ValidationError> {
    let required = [
        ("submitterName", present(&input.submitter_name)),
        ("submitterEmail", present(&input.submitter_email)),
        ("url", present(&input.url)),
        ("description", present(&input.description)),
    ];
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let [name, email, url, description] = required.map(|(_, value)| value.unwrap_or_default());
    Ok(Submission {
        submitter_name: name,
        submitter_email: email,
        url,
        description,
        design_style: present(&input.design_style).map(Reference::to),
        ..Default::default()
    })
}

/// Accept a new submission.
///
/// The record store write is the only step that can fail the request; the
/// CRM mirror and the chat notification run afterwards and only log.
pub async fn create_submission(
    input: NewSubmission,
    deps: &ServerDeps,
) -> Result<Submission, ServiceError> {
    let mut submission = validate(&input)?;
    submission.confirmation_code = generate_code(&deps.submission_code_prefix);
    submission.status = SubmissionStatus::Submitted;
    submission.submitted_at = Some(Utc::now());

    let created = submission
        .insert(deps.record_store.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to store submission");
            ServiceError::persistence("submission", e)
        })?;

    info!(
        submission_id = %created.id,
        confirmation_code = %created.confirmation_code,
        "Submission created"
    );

    let (crm, notification) = tokio::join!(
        fan_out::sync_mirror(&created, deps),
        fan_out::notify(&created, NotificationKind::Submitted, deps),
    );
    let report = FanOutReport {
        crm: Some(crm.map(|_| ())),
        notification: Some(notification),
        rebuild: None,
    };
    report.log(&created.id);

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counts_as_missing() {
        let input = NewSubmission {
            submitter_name: Some("  ".into()),
            submitter_email: Some("a@b.com".into()),
            url: None,
            description: Some("d".into()),
            design_style: None,
        };
        assert_eq!(
            validate(&input),
            Err(ValidationError::MissingFields(vec!["submitterName", "url"]))
        );
    }

    #[test]
    fn valid_input_is_trimmed() {
        let input = NewSubmission {
            submitter_name: Some(" Ada ".into()),
            submitter_email: Some("ada@example.com".into()),
            url: Some("https://x.example".into()),
            description: Some("tokens".into()),
            design_style: Some("minimal".into()),
        };
        let submission = validate(&input).unwrap();
        assert_eq!(submission.submitter_name, "Ada");
        assert_eq!(submission.design_style, Some(Reference::to("minimal")));
    }
}
