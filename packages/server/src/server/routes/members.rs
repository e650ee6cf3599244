use axum::{body::Bytes, extract::Extension, http::HeaderMap, Json};
use serde_json::{json, Value};

use super::error::{authorization, parse_json};
use crate::common::ServiceError;
use crate::domains::members::activities::{list_members, register_member, MemberApplication};
use crate::server::app::AppState;

/// POST /members
pub async fn register_member_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let application: MemberApplication = parse_json(&body)?;
    let member = register_member(application, &state.deps).await?;

    Ok(Json(json!({
        "success": true,
        "memberId": member.member_id,
        "message": "Welcome to the Design Gallery community!",
    })))
}

/// GET /members
pub async fn list_members_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError> {
    let members = list_members(authorization(&headers), &state.deps).await?;
    Ok(Json(json!({
        "success": true,
        "count": members.len(),
        "members": members,
    })))
}
