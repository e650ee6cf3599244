//! Submission → CRM row mapping.
//!
//! Bump `MIRROR_SCHEMA_VERSION` whenever a column is added, renamed or
//! dropped so the CRM base can be migrated alongside.

use serde_json::{Map, Value};

use super::models::Submission;
use crate::common::format_timestamp;

pub const MIRROR_SCHEMA_VERSION: u32 = 1;

pub const SUBMISSIONS_TABLE: &str = "Submissions";

/// Upsert key: at most one live row per submitter email.
pub const MIRROR_KEY_COLUMN: &str = "Email";

/// Upsert key for documents without a submitter email.
pub const MIRROR_FALLBACK_KEY_COLUMN: &str = "Sanity ID";

/// Column the mirror row of `submission` is matched on.
pub fn mirror_key_column(submission: &Submission) -> &'static str {
    if submission.submitter_email.trim().is_empty() {
        MIRROR_FALLBACK_KEY_COLUMN
    } else {
        MIRROR_KEY_COLUMN
    }
}

pub struct MirrorColumn {
    pub column: &'static str,
    pub value: fn(&Submission) -> String,
}

pub static MIRROR_COLUMNS: &[MirrorColumn] = &[
    MirrorColumn {
        column: "Submitter Name",
        value: |s| s.submitter_name.clone(),
    },
    MirrorColumn {
        column: MIRROR_KEY_COLUMN,
        value: |s| s.submitter_email.clone(),
    },
    MirrorColumn {
        column: "URL",
        value: |s| s.url.clone(),
    },
    MirrorColumn {
        column: "Description",
        value: |s| s.description.clone(),
    },
    MirrorColumn {
        column: "Status",
        value: |s| s.status.as_str().to_string(),
    },
    MirrorColumn {
        column: MIRROR_FALLBACK_KEY_COLUMN,
        value: |s| s.id.clone(),
    },
    MirrorColumn {
        column: "Submitted At",
        value: |s| s.submitted_at.as_ref().map(format_timestamp).unwrap_or_default(),
    },
    MirrorColumn {
        column: "Confirmation Code",
        value: |s| s.confirmation_code.clone(),
    },
    MirrorColumn {
        column: "Review Notes",
        value: |s| s.review_notes.clone().unwrap_or_default(),
    },
    MirrorColumn {
        column: "Reviewed At",
        value: |s| s.reviewed_at.as_ref().map(format_timestamp).unwrap_or_default(),
    },
];

/// Every mirror column, absent values as "".
pub fn mirror_fields(submission: &Submission) -> Map<String, Value> {
    MIRROR_COLUMNS
        .iter()
        .map(|c| (c.column.to_string(), Value::String((c.value)(submission))))
        .collect()
}
