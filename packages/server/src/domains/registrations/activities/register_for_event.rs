use chrono::Utc;
use discord_client::{Embed, WebhookMessage};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::common::{
    format_timestamp, generate_code, Integration, ServiceError, ValidationError,
    EVENT_REGISTRATION_PREFIX,
};
use crate::domains::registrations::models::EventRegistration;
use crate::kernel::{NotificationChannel, ServerDeps};

pub const COLOR_EVENT_REGISTRATION: u32 = 15844367;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistrationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub event_name: Option<String>,
    pub phone: Option<String>,
    pub event_date: Option<String>,
    pub notes: Option<String>,
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn announcement(registration: &EventRegistration) -> WebhookMessage {
    let phone = if registration.phone.is_empty() {
        "Not provided"
    } else {
        &registration.phone
    };
    let embed = Embed::new("New Event Registration!", COLOR_EVENT_REGISTRATION)
        .description("Someone just registered for an event.")
        .field("Event Name", &registration.event_name, false)
        .field("Registrant", &registration.name, true)
        .field("Email", &registration.email, true)
        .field("Contact", phone, true)
        .field(
            "Registration Number",
            format!("`{}`", registration.registration_number),
            true,
        )
        .footer("Design Gallery - Event Registration System")
        .timestamp(format_timestamp(&Utc::now()));

    WebhookMessage::with_embed("**New event registration!**", embed)
}

/// Register someone for an event. The CRM row is the record.
pub async fn register_for_event(
    request: EventRegistrationRequest,
    deps: &ServerDeps,
) -> Result<EventRegistration, ServiceError> {
    let registration = EventRegistration {
        registration_number: generate_code(EVENT_REGISTRATION_PREFIX),
        status: "confirmed".to_string(),
        name: text(request.name),
        email: text(request.email),
        event_name: text(request.event_name),
        phone: text(request.phone),
        event_date: text(request.event_date),
        notes: text(request.notes),
        registered_date: format_timestamp(&Utc::now()),
        ..Default::default()
    };

    let mut missing = Vec::new();
    if registration.name.is_empty() {
        missing.push("name");
    }
    if registration.email.is_empty() {
        missing.push("email");
    }
    if registration.event_name.is_empty() {
        missing.push("eventName");
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing).into());
    }

    let created = registration
        .insert(deps.crm.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create event registration");
            ServiceError::persistence("event registration", e)
        })?;

    info!(
        registration_number = %created.registration_number,
        event = %created.event_name,
        "Event registration confirmed"
    );

    let message = announcement(&created);
    if let Err(failure) = deps
        .best_effort(
            Integration::Notification,
            deps.notifier.send(NotificationChannel::Events, &message),
        )
        .await
    {
        warn!(
            registration_number = %created.registration_number,
            error = %failure,
            "Event registration not announced"
        );
    }

    Ok(created)
}

/// Every registration, newest first. Requires the review bearer token.
pub async fn list_registrations(
    authorization: Option<&str>,
    deps: &ServerDeps,
) -> Result<Vec<EventRegistration>, ServiceError> {
    deps.review_auth.authorize(authorization)?;
    EventRegistration::find_all(deps.crm.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to retrieve event registrations");
            ServiceError::fetch("event registrations", e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn every_missing_field_is_reported_before_any_write() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();

        let err = register_for_event(
            EventRegistrationRequest {
                email: Some("a@b.com".into()),
                ..Default::default()
            },
            &deps,
        )
        .await
        .unwrap_err();

        match err {
            ServiceError::Validation(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["name", "eventName"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(test_deps.crm.call_count(), 0);
    }

    #[test]
    fn announcement_uses_events_color() {
        let registration = EventRegistration {
            registration_number: "EVT-12345678".into(),
            event_name: "Token Talk".into(),
            ..Default::default()
        };
        let message = announcement(&registration);
        assert_eq!(message.embeds[0].color, COLOR_EVENT_REGISTRATION);
        assert_eq!(message.embeds[0].field_value("Contact"), Some("Not provided"));
    }
}
