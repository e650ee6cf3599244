//! Submissions domain - the design-system submission lifecycle
//!
//! The record store is the system of record. Every successful change fans out
//! to the CRM mirror, the submissions chat channel and (for moderation) the
//! site rebuild hook, all best-effort.

pub mod activities;
pub mod data;
pub mod mirror;
pub mod models;
pub mod notifications;

// Re-export commonly used types
pub use data::{NewSubmission, PublicSubmission, StatusUpdate, SubmissionReceipt, TrackedSubmission};
pub use models::{Submission, SubmissionStatus};
