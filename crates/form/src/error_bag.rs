//! Per-field validation messages returned by a form endpoint.

use formpost_types::GENERAL_ERROR_KEY;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Messages assigned to one field: a single message or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMessages {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessages {
    fn into_vec(self) -> Vec<String> {
        match self {
            ErrorMessages::One(message) => vec![message],
            ErrorMessages::Many(messages) => messages,
        }
    }
}

impl From<&str> for ErrorMessages {
    fn from(message: &str) -> Self {
        ErrorMessages::One(message.to_string())
    }
}

impl From<String> for ErrorMessages {
    fn from(message: String) -> Self {
        ErrorMessages::One(message)
    }
}

impl From<Vec<String>> for ErrorMessages {
    fn from(messages: Vec<String>) -> Self {
        ErrorMessages::Many(messages)
    }
}

impl From<Vec<&str>> for ErrorMessages {
    fn from(messages: Vec<&str>) -> Self {
        ErrorMessages::Many(messages.into_iter().map(str::to_string).collect())
    }
}

/// Field name to ordered error messages.
///
/// Every entry holds a list; single messages are wrapped when assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorBag {
    errors: IndexMap<String, Vec<String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of messages across every field.
    pub fn count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages for `field`, or an empty slice when it has none.
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Replace every entry with `errors`. This is never a merge.
    pub fn set<I, K, M>(&mut self, errors: I)
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: Into<ErrorMessages>,
    {
        self.errors = errors
            .into_iter()
            .map(|(field, messages)| (field.into(), messages.into().into_vec()))
            .collect();
    }

    /// Replace every entry from a decoded JSON error payload.
    ///
    /// Objects map field names to a message or a list of messages; list
    /// items that are not strings keep their JSON text. A bare string, number,
    /// boolean or array is filed under the general key. `null` leaves the bag
    /// empty.
    pub fn set_from_json(&mut self, payload: &Value) {
        self.errors = match payload {
            Value::Object(map) => map
                .iter()
                .filter_map(|(field, value)| json_messages(value).map(|messages| (field.clone(), messages)))
                .collect(),
            Value::Null => IndexMap::new(),
            Value::String(message) => IndexMap::from([(GENERAL_ERROR_KEY.to_string(), vec![message.clone()])]),
            other => IndexMap::from([(GENERAL_ERROR_KEY.to_string(), vec![other.to_string()])]),
        };
    }

    /// Remove one field's messages, or everything when `field` is `None`.
    pub fn clear(&mut self, field: Option<&str>) {
        match field {
            Some(field) => self.clear_field(field),
            None => self.clear_all(),
        }
    }

    pub fn clear_field(&mut self, field: &str) {
        self.errors.shift_remove(field);
    }

    pub fn clear_all(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

fn json_messages(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => None,
        Value::String(message) => Some(vec![message.clone()]),
        Value::Array(items) => Some(items.iter().map(json_message).collect()),
        other => Some(vec![other.to_string()]),
    }
}

fn json_message(value: &Value) -> String {
    match value {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_wraps_single_messages() {
        let mut bag = ErrorBag::new();
        bag.set([("name", "Something went wrong!")]);

        assert!(bag.has("name"));
        assert_eq!(bag.first("name"), Some("Something went wrong!"));
        assert_eq!(bag.get("name"), ["Something went wrong!".to_string()]);
        assert_eq!(bag.count(), 1);
    }

    #[test]
    fn set_replaces_instead_of_merging() {
        let mut bag = ErrorBag::new();
        bag.set([("name", vec!["too short", "taken"])]);
        bag.set([("email", "invalid")]);

        assert!(!bag.has("name"));
        assert_eq!(bag.count(), 1);
    }

    #[test]
    fn count_sums_messages_across_fields() {
        let mut bag = ErrorBag::new();
        bag.set([
            ("name", ErrorMessages::from(vec!["required", "too short"])),
            ("email", ErrorMessages::from("invalid")),
        ]);
        assert_eq!(bag.count(), 3);
    }

    #[test]
    fn missing_fields_are_empty_not_errors() {
        let bag = ErrorBag::new();
        assert!(!bag.has("name"));
        assert!(bag.get("name").is_empty());
        assert_eq!(bag.first("name"), None);
        assert_eq!(bag.count(), 0);
    }

    #[test]
    fn clear_all_and_single_field() {
        let mut bag = ErrorBag::new();
        bag.set([("name", "Something went wrong!")]);
        bag.clear(None);
        assert_eq!(bag.count(), 0);

        bag.set([("name", "Something went wrong!"), ("email", "invalid")]);
        bag.clear(Some("name"));
        assert!(!bag.has("name"));
        assert!(bag.has("email"));
        assert_eq!(bag.count(), 1);
    }

    #[test]
    fn set_from_json_object() {
        let mut bag = ErrorBag::new();
        bag.set_from_json(&json!({
            "name": ["Name is required."],
            "email": "Email is invalid.",
            "age": [18, "too young"],
            "ignored": null
        }));

        assert_eq!(bag.get("name"), ["Name is required.".to_string()]);
        assert_eq!(bag.first("email"), Some("Email is invalid."));
        assert_eq!(bag.get("age"), ["18".to_string(), "too young".to_string()]);
        assert!(!bag.has("ignored"));
        assert_eq!(bag.count(), 4);
    }

    #[test]
    fn set_from_json_files_non_objects_under_general() {
        let mut bag = ErrorBag::new();
        bag.set_from_json(&json!("Some random error happened"));
        assert_eq!(bag.get(GENERAL_ERROR_KEY), ["Some random error happened".to_string()]);

        bag.set_from_json(&json!(["a", "b"]));
        assert_eq!(bag.get(GENERAL_ERROR_KEY), [r#"["a","b"]"#.to_string()]);

        bag.set_from_json(&json!(500));
        assert_eq!(bag.first(GENERAL_ERROR_KEY), Some("500"));

        bag.set_from_json(&Value::Null);
        assert!(bag.is_empty());
    }

    #[test]
    fn serializes_as_field_map() {
        let mut bag = ErrorBag::new();
        bag.set([("name", "required")]);
        assert_eq!(serde_json::to_value(&bag).unwrap(), json!({"name": ["required"]}));
        let fields: Vec<&str> = bag.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["name"]);
    }
}
