use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::submissions::models::{Submission, SubmissionStatus};

/// Public submission form body
///
/// Every field is optional on the wire so validation can report all the
/// missing ones at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub submitter_name: Option<String>,
    pub submitter_email: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    /// Id of a `designStyle` document
    pub design_style: Option<String>,
}

/// Moderation request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub submission_id: Option<String>,
    pub status: Option<String>,
    pub review_notes: Option<String>,
}

/// Returned to the submitter after a successful create
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub id: String,
    pub status: SubmissionStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub confirmation_code: String,
}

impl From<&Submission> for SubmissionReceipt {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id.clone(),
            status: submission.status,
            submitted_at: submission.submitted_at,
            confirmation_code: submission.confirmation_code.clone(),
        }
    }
}

/// Gallery listing entry. Contact details and review notes stay private.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSubmission {
    pub id: String,
    pub submitter_name: String,
    pub url: String,
    pub description: String,
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl From<Submission> for PublicSubmission {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            submitter_name: submission.submitter_name,
            url: submission.url,
            description: submission.description,
            submitted_at: submission.submitted_at,
            design_style: submission.design_style.map(|style| style.id),
            screenshot: submission.screenshot,
        }
    }
}

/// What a submitter sees when tracking by confirmation code
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSubmission {
    pub confirmation_code: String,
    pub status: SubmissionStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
}

impl From<Submission> for TrackedSubmission {
    fn from(submission: Submission) -> Self {
        Self {
            confirmation_code: submission.confirmation_code,
            status: submission.status,
            submitted_at: submission.submitted_at,
            reviewed_at: submission.reviewed_at,
            review_notes: submission.review_notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::submissions::models::Reference;

    #[test]
    fn public_projection_hides_contact_and_review_details() {
        let submission = Submission {
            id: "doc1".into(),
            submitter_name: "Ada".into(),
            submitter_email: "ada@example.com".into(),
            review_notes: Some("internal".into()),
            status: SubmissionStatus::Approved,
            design_style: Some(Reference::to("minimal")),
            ..Default::default()
        };
        let value = serde_json::to_value(PublicSubmission::from(submission)).unwrap();

        assert_eq!(value["id"], "doc1");
        assert_eq!(value["designStyle"], "minimal");
        assert!(value.get("submitterEmail").is_none());
        assert!(value.get("reviewNotes").is_none());
        assert!(value.get("status").is_none());
    }
}
