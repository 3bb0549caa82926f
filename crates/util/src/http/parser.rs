//! # Response Decoding
//!
//! Helpers for turning raw HTTP response text into a [`ResponseBody`]:
//! JSON when the payload parses, verbatim text otherwise.

use formpost_types::ResponseBody;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Maximum number of characters kept in body previews attached to errors and logs.
pub const BODY_PREVIEW_LIMIT: usize = 200;

/// Decode a response body, preferring JSON and falling back to plain text.
///
/// The fallback is purely a format decision and does not depend on the
/// response status. A parse failure is logged at debug level and never
/// surfaced to the caller.
///
/// # Example
/// ```rust
/// use formpost_types::ResponseBody;
/// use formpost_util::http::decode_response_body;
///
/// let body = decode_response_body(r#"{"message":"OK"}"#, Some(200));
/// assert!(body.is_json());
///
/// let body = decode_response_body("Success", Some(200));
/// assert_eq!(body, ResponseBody::Text("Success".to_string()));
/// ```
pub fn decode_response_body(text: &str, status: Option<u16>) -> ResponseBody {
    match parse_response_json_strict(text, status) {
        Ok(value) => ResponseBody::Json(value),
        Err(error) => {
            debug!(
                status = status.unwrap_or_default(),
                body_preview = %error.body_preview(),
                "response body is not JSON; decoding as text"
            );
            ResponseBody::Text(text.to_string())
        }
    }
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// Any parsing error is decorated with the originating HTTP status code plus
/// a truncated preview of the response body.
///
/// # Errors
/// Returns a [`JsonParseError`] describing the parse failure. The message
/// includes the original serde error and up to [`BODY_PREVIEW_LIMIT`]
/// characters of the response body with whitespace collapsed.
pub fn parse_response_json_strict(text: &str, status: Option<u16>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, BODY_PREVIEW_LIMIT);

        JsonParseError::new(status_note, error, preview)
    })
}

/// Collapse whitespace and cap the length of a response body for logging.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}
