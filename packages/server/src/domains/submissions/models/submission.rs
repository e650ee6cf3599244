use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::common::{format_timestamp, ValidationError};
use crate::kernel::{BaseRecordStore, DocumentQuery};

/// `_type` of submission documents in the record store.
pub const SUBMISSION_DOC_TYPE: &str = "gallerySubmission";

/// Resolves the screenshot image to its CDN URL in listings.
const SCREENSHOT_URL: &str = "screenshot.asset->url";

/// Moderation state of a submission.
///
/// `submitted` → `under-review` → {`approved`, `changes-requested`, `rejected`}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    #[default]
    Submitted,
    UnderReview,
    Approved,
    ChangesRequested,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::UnderReview => "under-review",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::ChangesRequested => "changes-requested",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    /// Statuses that carry review notes and a review timestamp.
    pub fn is_reviewed(&self) -> bool {
        !matches!(
            self,
            SubmissionStatus::Submitted | SubmissionStatus::UnderReview
        )
    }

    /// Nothing moves back to `submitted`; every other move is a permitted override.
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        next != SubmissionStatus::Submitted || *self == SubmissionStatus::Submitted
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(SubmissionStatus::Submitted),
            "under-review" => Ok(SubmissionStatus::UnderReview),
            "approved" => Ok(SubmissionStatus::Approved),
            "changes-requested" => Ok(SubmissionStatus::ChangesRequested),
            "rejected" => Ok(SubmissionStatus::Rejected),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Weak link to a `designStyle` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type", default = "reference_type")]
    pub ref_type: String,
    #[serde(rename = "_ref")]
    pub id: String,
}

fn reference_type() -> String {
    "reference".to_string()
}

impl Reference {
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            ref_type: reference_type(),
            id: id.into(),
        }
    }
}

/// Submission model - record store persistence layer
///
/// Documents edited in the studio may lack fields, so everything but the
/// status falls back to an empty value when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub confirmation_code: String,
    pub submitter_name: String,
    pub submitter_email: String,
    pub url: String,
    pub description: String,
    pub status: SubmissionStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_style: Option<Reference>,
    /// Screenshot URL, present only when the store projected it.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "asset_url"
    )]
    pub screenshot: Option<String>,
}

/// Projected URLs arrive as strings; unresolved image objects read as absent.
fn asset_url<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).map(str::to_string))
}

impl Submission {
    /// Parse a stored document. Returns `None` for other document types.
    pub fn from_document(document: Value) -> Result<Option<Self>> {
        if document.get("_type").and_then(Value::as_str) != Some(SUBMISSION_DOC_TYPE) {
            return Ok(None);
        }
        let submission = serde_json::from_value(document).context("Malformed submission document")?;
        Ok(Some(submission))
    }

    /// Review notes as compared for idempotency: absent reads as "".
    pub fn notes_or_empty(&self) -> &str {
        self.review_notes.as_deref().unwrap_or("")
    }

    fn to_document(&self) -> Result<Value> {
        let mut document = serde_json::to_value(self)?;
        if let Some(object) = document.as_object_mut() {
            object.insert("_type".into(), Value::String(SUBMISSION_DOC_TYPE.into()));
        }
        Ok(document)
    }

    fn from_stored(document: Value) -> Result<Self> {
        Self::from_document(document)?
            .ok_or_else(|| anyhow::anyhow!("Record store returned a non-submission document"))
    }

    /// Find submission by record id
    pub async fn find_by_id(id: &str, store: &dyn BaseRecordStore) -> Result<Option<Self>> {
        match store.get_document(id).await? {
            Some(document) => Self::from_document(document),
            None => Ok(None),
        }
    }

    /// Find submission by confirmation code
    pub async fn find_by_code(code: &str, store: &dyn BaseRecordStore) -> Result<Option<Self>> {
        let query = DocumentQuery::of_type(SUBMISSION_DOC_TYPE)
            .filter("confirmationCode", code)
            .limit(1);
        match store.query_documents(&query).await?.into_iter().next() {
            Some(document) => Self::from_document(document),
            None => Ok(None),
        }
    }

    /// Approved submissions, newest first
    pub async fn find_approved(store: &dyn BaseRecordStore) -> Result<Vec<Self>> {
        let query = DocumentQuery::of_type(SUBMISSION_DOC_TYPE)
            .filter("status", SubmissionStatus::Approved.as_str())
            .newest_first("submittedAt")
            .project("screenshot", SCREENSHOT_URL);
        Self::parse_all(store.query_documents(&query).await?)
    }

    /// Every published submission, newest first
    pub async fn find_all(store: &dyn BaseRecordStore) -> Result<Vec<Self>> {
        let query = DocumentQuery::of_type(SUBMISSION_DOC_TYPE)
            .newest_first("submittedAt")
            .project("screenshot", SCREENSHOT_URL);
        Self::parse_all(store.query_documents(&query).await?)
    }

    fn parse_all(documents: Vec<Value>) -> Result<Vec<Self>> {
        documents
            .into_iter()
            .map(|document| serde_json::from_value(document).map_err(Into::into))
            .collect()
    }

    /// Create the document; the returned copy carries the store-assigned id.
    pub async fn insert(&self, store: &dyn BaseRecordStore) -> Result<Self> {
        let stored = store.create_document(self.to_document()?).await?;
        Self::from_stored(stored)
    }

    /// Write a new status. Reviewed statuses record notes and a review time,
    /// the others drop both.
    pub async fn update_status(
        id: &str,
        status: SubmissionStatus,
        review_notes: &str,
        reviewed_at: DateTime<Utc>,
        store: &dyn BaseRecordStore,
    ) -> Result<Self> {
        let mut set = Map::new();
        set.insert("status".into(), Value::String(status.as_str().into()));

        let mut unset = Vec::new();
        if status.is_reviewed() {
            set.insert("reviewNotes".into(), Value::String(review_notes.to_string()));
            set.insert(
                "reviewedAt".into(),
                Value::String(format_timestamp(&reviewed_at)),
            );
        } else {
            unset.push("reviewNotes".to_string());
            unset.push("reviewedAt".to_string());
        }

        let stored = store.patch_document(id, set, unset).await?;
        Self::from_stored(stored)
    }
}
