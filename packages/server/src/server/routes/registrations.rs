use axum::{body::Bytes, extract::Extension, http::HeaderMap, Json};
use serde_json::{json, Value};

use super::error::{authorization, parse_json};
use crate::common::ServiceError;
use crate::domains::registrations::activities::{
    list_registrations, register_for_event, EventRegistrationRequest,
};
use crate::server::app::AppState;

/// POST /event-registrations
pub async fn register_event_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    let request: EventRegistrationRequest = parse_json(&body)?;
    let registration = register_for_event(request, &state.deps).await?;

    Ok(Json(json!({
        "success": true,
        "registrationNumber": registration.registration_number,
        "message": "Your event registration has been confirmed! Please save your registration number.",
    })))
}

/// GET /event-registrations
pub async fn list_registrations_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError> {
    let registrations = list_registrations(authorization(&headers), &state.deps).await?;
    Ok(Json(json!({
        "success": true,
        "count": registrations.len(),
        "registrations": registrations,
    })))
}
