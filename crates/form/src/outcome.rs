//! Pure classification of a submission response.

use formpost_api::RawResponse;
use formpost_types::{GENERAL_ERROR_KEY, ResponseBody};
use formpost_util::http::decode_response_body;

use crate::ErrorBag;

/// What a finished submission means for the form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The endpoint accepted the data.
    Success(ResponseBody),
    /// The endpoint rejected the data; `errors` is the bag to install.
    Failure { body: ResponseBody, errors: ErrorBag },
}

impl SubmitOutcome {
    /// Decode a response and classify it by status.
    ///
    /// Decoding never fails: bodies that are not JSON are kept as text.
    pub fn from_response(response: &RawResponse) -> Self {
        let body = decode_response_body(response.body(), Some(response.status().as_u16()));
        if response.is_success() {
            return SubmitOutcome::Success(body);
        }

        let errors = errors_from_body(&body);
        SubmitOutcome::Failure { body, errors }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success(_))
    }

    pub fn body(&self) -> &ResponseBody {
        match self {
            SubmitOutcome::Success(body) | SubmitOutcome::Failure { body, .. } => body,
        }
    }
}

/// Build the error bag for a failed submission.
///
/// Text bodies become a single message under the general key.
pub fn errors_from_body(body: &ResponseBody) -> ErrorBag {
    let mut errors = ErrorBag::new();
    match body {
        ResponseBody::Json(payload) => errors.set_from_json(payload),
        ResponseBody::Text(text) => errors.set([(GENERAL_ERROR_KEY, text.as_str())]),
    }
    errors
}
