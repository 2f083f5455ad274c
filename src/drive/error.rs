use thiserror::Error;

use crate::google::AuthError;
use crate::stream::StreamError;

/// Errors that can occur when storing a photo in Google Drive
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriveError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to read upload content: {0}")]
    Content(#[from] StreamError),

    #[error("Drive rejected {name} with status {status}: {detail}")]
    Rejected {
        name: String,
        status: u16,
        detail: String,
    },

    #[error("Network error uploading {0}: {1}")]
    Network(String, String),

    #[error("Unreadable Drive response for {0}: {1}")]
    InvalidResponse(String, String),

    #[cfg(test)]
    #[error("File {0} not found")]
    NotFound(String),
}

impl DriveError {
    /// True when the failure is a server misconfiguration rather than a
    /// transient remote problem
    pub fn is_configuration(&self) -> bool {
        match self {
            DriveError::Configuration(_) => true,
            DriveError::Auth(e) => e.is_configuration(),
            // Unknown or unshared folder, or a service account without access
            DriveError::Rejected { status, .. } => matches!(status, 401 | 403 | 404),
            _ => false,
        }
    }
}
