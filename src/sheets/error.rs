use thiserror::Error;

use crate::google::AuthError;

/// Errors that can occur when reading or appending sheet rows
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Sheets rejected {range} with status {status}: {detail}")]
    Rejected {
        range: String,
        status: u16,
        detail: String,
    },

    #[error("Network error on {0}: {1}")]
    Network(String, String),

    #[error("Unreadable Sheets response for {0}: {1}")]
    InvalidResponse(String, String),
}

impl SheetsError {
    /// True when the failure is a server misconfiguration rather than a
    /// transient remote problem
    pub fn is_configuration(&self) -> bool {
        match self {
            SheetsError::Configuration(_) => true,
            SheetsError::Auth(e) => e.is_configuration(),
            // Unknown spreadsheet, unknown tab name, or no access to it
            SheetsError::Rejected { status, .. } => matches!(status, 400 | 401 | 403 | 404),
            _ => false,
        }
    }
}
