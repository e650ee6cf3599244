pub mod submission;

pub use submission::{
    NewSubmission, PublicSubmission, StatusUpdate, SubmissionReceipt, TrackedSubmission,
};
