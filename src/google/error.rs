use thiserror::Error;

/// Errors obtaining a Google access token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// The credentials cannot be used as configured (malformed private key)
    #[error("Invalid service account credentials: {0}")]
    InvalidCredentials(String),

    /// The token endpoint refused the assertion
    #[error("Token request rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The token endpoint could not be reached or answered unexpectedly
    #[error("Token request failed: {0}")]
    Request(String),
}

impl AuthError {
    /// True when an administrator has to fix the credentials
    pub fn is_configuration(&self) -> bool {
        match self {
            AuthError::InvalidCredentials(_) => true,
            AuthError::Rejected { status, .. } => matches!(status, 400 | 401 | 403),
            AuthError::Request(_) => false,
        }
    }
}
