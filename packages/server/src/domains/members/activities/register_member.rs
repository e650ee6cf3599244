//! Register member activity - community sign-up with an introductions post

use chrono::Utc;
use discord_client::{Embed, WebhookMessage};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::common::{
    format_timestamp, generate_code, Integration, ServiceError, ValidationError, MEMBER_PREFIX,
};
use crate::domains::members::models::Member;
use crate::kernel::{NotificationChannel, ServerDeps};

pub const COLOR_NEW_MEMBER: u32 = 5763719;

/// Sign-up form body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberApplication {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub interests: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

fn introduction(member: &Member) -> WebhookMessage {
    let embed = Embed::new("New Member Joined!", COLOR_NEW_MEMBER)
        .description("Welcome a new member to the Design Gallery community!")
        .field("Name", &member.name, true)
        .field("Email", &member.email, true)
        .field("Interests", or_placeholder(&member.interests, "Not specified"), false)
        .field("Role/Title", or_placeholder(&member.role, "Not specified"), true)
        .field("Website", or_placeholder(&member.website, "Not provided"), true)
        .field("Member ID", format!("`{}`", member.member_id), true)
        .footer("Design Gallery - Community")
        .timestamp(format_timestamp(&Utc::now()));

    WebhookMessage::with_embed("**Welcome our newest member!** Say hi!", embed)
}

/// Register a new member.
///
/// The CRM row is the record, so failing to create it fails the request.
/// The introductions post is best-effort.
pub async fn register_member(
    application: MemberApplication,
    deps: &ServerDeps,
) -> Result<Member, ServiceError> {
    let name = text(&application.name);
    let email = text(&application.email);

    let missing: Vec<&'static str> = [("name", &name), ("email", &email)]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing).into());
    }

    let member = Member {
        member_id: generate_code(MEMBER_PREFIX),
        status: "active".to_string(),
        name,
        email,
        role: text(&application.role),
        interests: text(&application.interests),
        website: text(&application.website),
        bio: text(&application.bio),
        joined_date: format_timestamp(&Utc::now()),
        ..Default::default()
    };

    let created = member.insert(deps.crm.as_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to create member record");
        ServiceError::persistence("member", e)
    })?;

    info!(member_id = %created.member_id, record_id = %created.id, "Member registered");

    let message = introduction(&created);
    if let Err(failure) = deps
        .best_effort(
            Integration::Notification,
            deps.notifier.send(NotificationChannel::Introductions, &message),
        )
        .await
    {
        warn!(member_id = %created.member_id, error = %failure, "Member introduction not posted");
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn introduction_fills_placeholders() {
        let member = Member {
            member_id: "MBR-0000ABCD".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            ..Default::default()
        };
        let message = introduction(&member);
        let embed = &message.embeds[0];

        assert_eq!(embed.color, COLOR_NEW_MEMBER);
        assert_eq!(embed.field_value("Interests"), Some("Not specified"));
        assert_eq!(embed.field_value("Website"), Some("Not provided"));
        assert_eq!(embed.field_value("Member ID"), Some("`MBR-0000ABCD`"));
    }
}
