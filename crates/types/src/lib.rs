use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error key used when a failure response carries no field-keyed errors.
pub const GENERAL_ERROR_KEY: &str = "general";

/// Content type sent with every submission unless explicitly overridden.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Header name paired with [`JSON_CONTENT_TYPE`].
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Field values of a form, keyed by field name in insertion order.
pub type FieldSet = IndexMap<String, Value>;

/// Decoded response payload.
///
/// Bodies are decoded as JSON first; anything that fails to parse is kept
/// verbatim as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Returns the JSON payload when the body decoded as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Returns the raw text when the body was not valid JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    /// Convert into a JSON value, wrapping text as a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{value}"),
            ResponseBody::Text(text) => f.write_str(text),
        }
    }
}

/// Options recognised at form construction.
///
/// Options are read once; the form never re-reads them after it is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FormOptions {
    /// Restore the construction-time field values after a successful submission.
    pub reset_on_success: bool,
    /// Extra request headers merged over the default `Content-Type`.
    #[serde(deserialize_with = "deserialize_header_map")]
    pub headers: IndexMap<String, String>,
    /// Base used to resolve relative target URLs such as `/contact`.
    pub base_url: Option<String>,
}

impl FormOptions {
    pub fn with_reset_on_success(mut self, reset_on_success: bool) -> Self {
        self.reset_on_success = reset_on_success;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Accepts header values written as strings, numbers or booleans.
fn deserialize_header_map<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let maybe_map = Option::<IndexMap<String, Value>>::deserialize(deserializer)?;
    let mut headers = IndexMap::new();
    for (name, value) in maybe_map.unwrap_or_default() {
        let rendered = match value {
            Value::String(text) => text,
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "header '{name}' must be a string, number or boolean; got {other}"
                )));
            }
        };
        headers.insert(name, rendered);
    }
    Ok(headers)
}
