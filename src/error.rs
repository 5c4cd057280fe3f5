//! Error types for slackgate

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Slack API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the Slack Web API client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Rate limited by Slack. Retry after {0:?}")]
    RateLimited(Duration),

    #[error("Slack API error: {0}")]
    Slack(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Errors surfaced by the invitation workflow.
///
/// Precondition and verification variants carry messages suitable for user
/// display. `Rejected` keeps the underlying API error for diagnostics; the
/// HTTP layer must not forward it verbatim to untrusted output.
#[derive(Debug, Error)]
pub enum InviteError {
    #[error("Missing email")]
    MissingEmail,

    #[error("Missing first name")]
    MissingFirstName,

    #[error("Missing last name")]
    MissingLastName,

    #[error("You need to accept the code of conduct")]
    MissingCoc,

    #[error("Error validating captcha. Did you click it?")]
    VerificationUnavailable,

    #[error("Invalid captcha")]
    VerificationRejected,

    #[error("Invitation failed: {0}")]
    Rejected(#[source] ApiError),
}

impl InviteError {
    /// Whether this failure is a caller-side precondition or verification
    /// problem, as opposed to an upstream rejection.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, InviteError::Rejected(_))
    }
}
