use serde::Serialize;
use thiserror::Error;

use crate::drive::DriveError;
use crate::report::{FieldErrors, ImageLocation};
use crate::sheets::SheetsError;

pub const MSG_SUCCESS: &str = "Report submitted successfully!";
pub const MSG_VALIDATION_FAILED: &str = "Validation failed.";
pub const MSG_UPLOAD_FAILED: &str = "Failed to upload file to Google Drive.";
pub const MSG_APPEND_FAILED: &str = "Failed to submit data to Google Sheet.";
pub const MSG_MISCONFIGURED: &str =
    "Server configuration error. Please contact the administrator.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Why a submission ended the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutcomeKind {
    #[default]
    Committed,
    Rejected,
    Misconfigured,
    UploadFailed,
    AppendFailed,
    Unexpected,
}

/// Result returned to the client for one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    #[serde(skip)]
    pub kind: OutcomeKind,
}

impl SubmissionOutcome {
    pub fn committed() -> Self {
        Self {
            success: true,
            message: MSG_SUCCESS.to_string(),
            field_errors: None,
            kind: OutcomeKind::Committed,
        }
    }

    fn failed(kind: OutcomeKind, message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            field_errors: None,
            kind,
        }
    }
}

/// Ways a submission can fail
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Server misconfigured: {0}")]
    Configuration(String),

    #[error("Upload of {} photo failed: {source}", .location.label())]
    Upload {
        location: ImageLocation,
        #[source]
        source: DriveError,
    },

    #[error("Row append failed: {0}")]
    Append(#[source] SheetsError),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl SubmitError {
    /// Classify a failed upload
    pub fn upload(location: ImageLocation, source: DriveError) -> Self {
        if source.is_configuration() {
            SubmitError::Configuration(source.to_string())
        } else {
            SubmitError::Upload { location, source }
        }
    }

    /// Classify a failed row append
    pub fn append(source: SheetsError) -> Self {
        if source.is_configuration() {
            SubmitError::Configuration(source.to_string())
        } else {
            SubmitError::Append(source)
        }
    }
}

impl From<SubmitError> for SubmissionOutcome {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(field_errors) => SubmissionOutcome {
                field_errors: Some(field_errors),
                ..SubmissionOutcome::failed(OutcomeKind::Rejected, MSG_VALIDATION_FAILED)
            },
            SubmitError::Configuration(_) => {
                SubmissionOutcome::failed(OutcomeKind::Misconfigured, MSG_MISCONFIGURED)
            }
            SubmitError::Upload { .. } => {
                SubmissionOutcome::failed(OutcomeKind::UploadFailed, MSG_UPLOAD_FAILED)
            }
            SubmitError::Append(_) => {
                SubmissionOutcome::failed(OutcomeKind::AppendFailed, MSG_APPEND_FAILED)
            }
            SubmitError::Unexpected(_) => {
                SubmissionOutcome::failed(OutcomeKind::Unexpected, MSG_UNEXPECTED)
            }
        }
    }
}
