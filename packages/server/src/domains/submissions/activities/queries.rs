//! Submission query activities
//!
//! Reads go straight to the record store; there is no cached fallback.

use tracing::{error, info};

use crate::common::ServiceError;
use crate::domains::submissions::data::{PublicSubmission, TrackedSubmission};
use crate::domains::submissions::models::Submission;
use crate::kernel::ServerDeps;

fn fetch_failed(e: anyhow::Error) -> ServiceError {
    error!(error = %e, "Failed to read submissions");
    ServiceError::fetch("submissions", e)
}

/// Approved submissions for the public gallery, newest first
pub async fn list_approved(deps: &ServerDeps) -> Result<Vec<PublicSubmission>, ServiceError> {
    let submissions = Submission::find_approved(deps.record_store.as_ref())
        .await
        .map_err(fetch_failed)?;
    Ok(submissions.into_iter().map(PublicSubmission::from).collect())
}

/// Every submission with full detail, for moderators
pub async fn list_for_review(
    authorization: Option<&str>,
    deps: &ServerDeps,
) -> Result<Vec<Submission>, ServiceError> {
    deps.review_auth.authorize(authorization)?;
    let submissions = Submission::find_all(deps.record_store.as_ref())
        .await
        .map_err(fetch_failed)?;
    info!(count = submissions.len(), "Listed submissions for review");
    Ok(submissions)
}

/// Look a submission up by its confirmation code
pub async fn track_submission(
    code: &str,
    deps: &ServerDeps,
) -> Result<TrackedSubmission, ServiceError> {
    let code = code.trim().to_ascii_uppercase();
    Submission::find_by_code(&code, deps.record_store.as_ref())
        .await
        .map_err(fetch_failed)?
        .map(TrackedSubmission::from)
        .ok_or(ServiceError::NotFound {
            entity: "submission",
            id: code,
        })
}
