//! Test data fixtures.

use serde_json::{json, Value};

/// A complete, valid submission form body
pub fn submission_form() -> Value {
    json!({
        "submitterName": "A",
        "submitterEmail": "a@b.com",
        "url": "http://x",
        "description": "d"
    })
}

/// A published submission document as the record store would hold it
pub fn submission_document(id: &str, status: &str, email: &str) -> Value {
    json!({
        "_id": id,
        "_type": "gallerySubmission",
        "confirmationCode": format!("DSG-{:0>8}", id.len()),
        "submitterName": "Grace",
        "submitterEmail": email,
        "url": "https://tokens.example",
        "description": "A design system",
        "status": status,
        "submittedAt": "2024-05-01T12:00:00.000Z"
    })
}

pub fn status_update(id: &str, status: &str, notes: Option<&str>) -> Value {
    match notes {
        Some(notes) => json!({"submissionId": id, "status": status, "reviewNotes": notes}),
        None => json!({"submissionId": id, "status": status}),
    }
}
