//! The form: live field values, their reset snapshot, the error bag and the
//! submission lifecycle.

use std::fmt;
use std::sync::Arc;

use formpost_api::{FormClient, FormRequest, FormTransport, Method, merge_headers};
use formpost_types::{FieldSet, FormOptions, ResponseBody};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{ErrorBag, FormError, SubmitError, SubmitOutcome};

/// Form state bound to one target URL.
///
/// `original_values` is captured at construction and never changes; it is
/// what [`Form::reset`] restores. The target is kept as given and resolved
/// by the transport when a submission is sent.
pub struct Form {
    url: String,
    fields: FieldSet,
    original_values: FieldSet,
    headers: IndexMap<String, String>,
    options: FormOptions,
    errors: ErrorBag,
    transport: Arc<dyn FormTransport>,
}

impl Form {
    /// Build a form that submits through a default [`FormClient`].
    ///
    /// Relative targets resolve against `options.base_url`, then
    /// `FORMPOST_BASE_URL`, when the form is submitted.
    pub fn new<I, K, V>(url: &str, fields: I, options: FormOptions) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let client = FormClient::new()?.with_base_url(options.base_url.clone());
        Ok(Self::with_transport(url, fields, options, Arc::new(client)))
    }

    /// Build a form that submits through `transport`.
    pub fn with_transport<I, K, V>(
        url: &str,
        fields: I,
        options: FormOptions,
        transport: Arc<dyn FormTransport>,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let fields: FieldSet = fields.into_iter().map(|(name, value)| (name.into(), value.into())).collect();
        let headers = merge_headers(&options.headers);

        Self {
            url: url.to_string(),
            original_values: fields.clone(),
            fields,
            headers,
            options,
            errors: ErrorBag::new(),
            transport,
        }
    }

    /// Current field values.
    pub fn data(&self) -> &FieldSet {
        &self.fields
    }

    pub fn data_mut(&mut self) -> &mut FieldSet {
        &mut self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Assign a field value, adding the field when it is not yet known.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Blank every field and drop all errors. Originals are not restored.
    pub fn clear(&mut self) {
        for value in self.fields.values_mut() {
            *value = Value::String(String::new());
        }
        self.errors.clear_all();
    }

    /// Restore every field to its construction-time value and drop all errors.
    pub fn reset(&mut self) {
        for (name, value) in self.fields.iter_mut() {
            if let Some(original) = self.original_values.get(name) {
                *value = original.clone();
            }
        }
        self.errors.clear_all();
    }

    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorBag {
        &mut self.errors
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers: `Content-Type: application/json` plus configured headers.
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub async fn post(&mut self) -> Result<ResponseBody, SubmitError> {
        self.submit("post").await
    }

    pub async fn put(&mut self) -> Result<ResponseBody, SubmitError> {
        self.submit("put").await
    }

    pub async fn delete(&mut self) -> Result<ResponseBody, SubmitError> {
        self.submit("delete").await
    }

    /// Send the current field values as a JSON body using `method`.
    ///
    /// Errors from the previous submission are cleared first. A success
    /// status resolves with the decoded body and resets the fields when
    /// `reset_on_success` is set. Any other status installs the decoded body
    /// into the error bag and returns [`SubmitError::Rejected`].
    pub async fn submit(&mut self, method: &str) -> Result<ResponseBody, SubmitError> {
        self.errors.clear_all();

        let method = parse_method(method)?;
        let request = FormRequest::new(method.clone(), self.url.clone(), self.headers.clone(), self.body());
        debug!(
            method = %method,
            url = %self.url,
            field_count = self.fields.len(),
            "form submission started"
        );

        let response = self.transport.send(request).await.map_err(|error| {
            warn!(method = %method, url = %self.url, error = %error, "form submission failed");
            error
        })?;

        let status = response.status();
        let outcome = SubmitOutcome::from_response(&response);
        if let SubmitOutcome::Failure { errors, .. } = &outcome {
            warn!(
                method = %method,
                url = %self.url,
                status = %status,
                error_count = errors.count(),
                "form submission rejected"
            );
        } else {
            debug!(method = %method, url = %self.url, status = %status, "form submission accepted");
        }

        self.apply_outcome(outcome)
    }

    /// Apply a classified response to the form state.
    pub fn apply_outcome(&mut self, outcome: SubmitOutcome) -> Result<ResponseBody, SubmitError> {
        match outcome {
            SubmitOutcome::Success(body) => {
                if self.options.reset_on_success {
                    self.reset();
                }
                Ok(body)
            }
            SubmitOutcome::Failure { body, errors } => {
                self.errors = errors;
                Err(SubmitError::Rejected(body))
            }
        }
    }

    fn body(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("url", &self.url)
            .field("fields", &self.fields)
            .field("headers", &self.headers)
            .field("reset_on_success", &self.options.reset_on_success)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

fn parse_method(verb: &str) -> Result<Method, SubmitError> {
    Method::from_bytes(verb.trim().to_ascii_uppercase().as_bytes()).map_err(|_| SubmitError::InvalidMethod(verb.to_string()))
}
