pub mod submission;

pub use submission::{
    Reference, Submission, SubmissionStatus, SUBMISSION_DOC_TYPE,
};
