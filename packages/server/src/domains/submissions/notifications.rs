//! Chat messages for submission lifecycle events.

use chrono::Utc;
use discord_client::{Embed, WebhookMessage};

use super::models::{Submission, SubmissionStatus};
use crate::common::format_timestamp;

pub const COLOR_SUBMITTED: u32 = 3447003;
pub const COLOR_APPROVED: u32 = 3066993;
pub const COLOR_REJECTED: u32 = 15158332;

/// Discord caps embed field values at 1024 characters.
const FIELD_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Submitted,
    Approved,
    Rejected,
}

impl NotificationKind {
    /// Kind announced after a transition into `status`, if any.
    pub fn for_transition(status: SubmissionStatus) -> Option<Self> {
        match status {
            SubmissionStatus::Approved => Some(NotificationKind::Approved),
            SubmissionStatus::Rejected => Some(NotificationKind::Rejected),
            _ => None,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            NotificationKind::Submitted => "New Design System Submission",
            NotificationKind::Approved => "Submission Approved",
            NotificationKind::Rejected => "Submission Rejected",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            NotificationKind::Submitted => COLOR_SUBMITTED,
            NotificationKind::Approved => COLOR_APPROVED,
            NotificationKind::Rejected => COLOR_REJECTED,
        }
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= FIELD_LIMIT {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(FIELD_LIMIT - 3).collect();
    clipped.push_str("...");
    clipped
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

pub fn build_message(submission: &Submission, kind: NotificationKind) -> WebhookMessage {
    let mut embed = Embed::new(kind.title(), kind.color())
        .field("Submitter", or_dash(&submission.submitter_name), true)
        .field("Confirmation Code", or_dash(&submission.confirmation_code), true)
        .field("Status", submission.status.as_str(), true)
        .field("URL", or_dash(&submission.url), false);

    match kind {
        NotificationKind::Submitted => {
            embed = embed.field("Description", truncate(or_dash(&submission.description)), false);
        }
        NotificationKind::Approved | NotificationKind::Rejected => {
            let notes = submission.notes_or_empty();
            if !notes.trim().is_empty() {
                embed = embed.field("Review Notes", truncate(notes), false);
            }
        }
    }

    let embed = embed
        .footer("Design Gallery")
        .timestamp(format_timestamp(&Utc::now()));

    WebhookMessage {
        content: None,
        embeds: vec![embed],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        Submission {
            id: "doc1".into(),
            confirmation_code: "DSG-DEADBEEF".into(),
            submitter_name: "Ada".into(),
            submitter_email: "ada@example.com".into(),
            url: "https://design.example".into(),
            description: "x".repeat(2000),
            status: SubmissionStatus::Approved,
            review_notes: Some("Lovely tokens".into()),
            ..Default::default()
        }
    }

    #[test]
    fn only_approved_and_rejected_transitions_notify() {
        assert_eq!(
            NotificationKind::for_transition(SubmissionStatus::Approved),
            Some(NotificationKind::Approved)
        );
        assert_eq!(
            NotificationKind::for_transition(SubmissionStatus::Rejected),
            Some(NotificationKind::Rejected)
        );
        assert_eq!(NotificationKind::for_transition(SubmissionStatus::UnderReview), None);
        assert_eq!(NotificationKind::for_transition(SubmissionStatus::ChangesRequested), None);
    }

    #[test]
    fn approved_embed_carries_color_and_notes() {
        let message = build_message(&submission(), NotificationKind::Approved);
        let embed = &message.embeds[0];

        assert_eq!(embed.color, COLOR_APPROVED);
        assert_eq!(embed.field_value("Confirmation Code"), Some("DSG-DEADBEEF"));
        assert_eq!(embed.field_value("Review Notes"), Some("Lovely tokens"));
        assert_eq!(embed.field_value("Description"), None);
        assert!(embed.field_value("Email").is_none());
    }

    #[test]
    fn submitted_embed_truncates_long_descriptions() {
        let message = build_message(&submission(), NotificationKind::Submitted);
        let embed = &message.embeds[0];

        assert_eq!(embed.color, COLOR_SUBMITTED);
        let description = embed.field_value("Description").unwrap();
        assert_eq!(description.chars().count(), FIELD_LIMIT);
        assert!(description.ends_with("..."));
    }
}
