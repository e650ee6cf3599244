//! Member query activities

use tracing::{error, info};

use crate::common::ServiceError;
use crate::domains::members::models::Member;
use crate::kernel::ServerDeps;

/// Every member, newest first. Requires the review bearer token.
pub async fn list_members(
    authorization: Option<&str>,
    deps: &ServerDeps,
) -> Result<Vec<Member>, ServiceError> {
    deps.review_auth.authorize(authorization)?;

    let members = Member::find_all(deps.crm.as_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to retrieve members");
        ServiceError::fetch("members", e)
    })?;

    info!(count = members.len(), "Listed members");
    Ok(members)
}
