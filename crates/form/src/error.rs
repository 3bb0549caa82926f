//! Error types for form construction and submission.

use formpost_api::TransportError;
use formpost_types::ResponseBody;
use thiserror::Error;

/// Raised when a form cannot be built.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Transport error: {0}")]
    Client(#[from] TransportError),
}

/// Raised when a submission does not succeed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The endpoint answered with a non-success status. The decoded body is
    /// also installed into the form's error bag.
    #[error("submission rejected: {0}")]
    Rejected(ResponseBody),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
}

impl SubmitError {
    /// The decoded response body when the endpoint rejected the submission.
    pub fn rejection(&self) -> Option<&ResponseBody> {
        match self {
            SubmitError::Rejected(body) => Some(body),
            _ => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, SubmitError::Rejected(_))
    }
}
