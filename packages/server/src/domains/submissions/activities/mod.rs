//! Submission domain activities - business logic functions
//!
//! Activities take request data plus `&ServerDeps` and return domain results.
//! HTTP handlers call them directly.

mod create_submission;
pub mod fan_out;
mod ingest_webhook;
mod queries;
mod transition_submission;

pub use create_submission::create_submission;
pub use fan_out::FanOutReport;
pub use ingest_webhook::{ingest_webhook, IngestOutcome, SkipReason};
pub use queries::{list_approved, list_for_review, track_submission};
pub use transition_submission::{transition_submission, TransitionOutcome};
