use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use super::error::{authorization, parse_json};
use crate::common::ServiceError;
use crate::domains::submissions::activities::{
    create_submission, list_approved, list_for_review, track_submission, transition_submission,
    TransitionOutcome,
};
use crate::domains::submissions::{NewSubmission, StatusUpdate, SubmissionReceipt};
use crate::server::app::AppState;

/// POST /submissions
pub async fn create_submission_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let input: NewSubmission = parse_json(&body)?;
    let created = create_submission(input, &state.deps).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "submission": SubmissionReceipt::from(&created),
        })),
    ))
}

/// GET /submissions
pub async fn list_submissions_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Value>, ServiceError> {
    let submissions = list_approved(&state.deps).await?;
    Ok(Json(json!({ "submissions": submissions })))
}

/// GET /submissions/review
pub async fn review_submissions_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError> {
    let submissions = list_for_review(authorization(&headers), &state.deps).await?;
    Ok(Json(json!({ "submissions": submissions })))
}

/// PUT /submissions/status
pub async fn update_status_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let auth = authorization(&headers);
    let update: StatusUpdate = match parse_json(&body) {
        Ok(update) => update,
        Err(e) => {
            // A bad token still wins over a bad body
            state.deps.review_auth.authorize(auth)?;
            return Err(e.into());
        }
    };

    match transition_submission(auth, update, &state.deps).await? {
        TransitionOutcome::Unchanged(_) => Ok(Json(json!({
            "success": true,
            "message": "No changes",
        }))),
        TransitionOutcome::Updated { submission, .. } => Ok(Json(json!({
            "success": true,
            "submission": submission,
        }))),
    }
}

/// GET /submissions/track/:code
pub async fn track_submission_handler(
    Extension(state): Extension<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    let submission = track_submission(&code, &state.deps).await?;
    Ok(Json(json!({
        "success": true,
        "submission": submission,
    })))
}
