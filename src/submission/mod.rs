pub mod outcome;
pub mod submitter;

pub use outcome::{OutcomeKind, SubmissionOutcome, SubmitError};
pub use submitter::Submitter;
