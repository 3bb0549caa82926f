use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use formpost::{
    FieldSet, Form, FormOptions, FormRequest, FormTransport, GENERAL_ERROR_KEY, Method, RawResponse, ResponseBody,
    StatusCode, SubmitError, TargetUrlError, TransportError,
};
use serde_json::json;

/// Answers each request with the next scripted response and records what was sent.
#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<FormRequest>>,
}

impl ScriptedTransport {
    fn answering(responses: impl IntoIterator<Item = RawResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<FormRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl FormTransport for ScriptedTransport {
    async fn send(&self, request: FormRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().expect("requests lock").push(request);
        Ok(self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| RawResponse::new(StatusCode::OK, "")))
    }
}

/// Fails every request the way a client with no base URL fails a relative target.
struct UnresolvableTransport;

#[async_trait]
impl FormTransport for UnresolvableTransport {
    async fn send(&self, request: FormRequest) -> Result<RawResponse, TransportError> {
        Err(TargetUrlError::MissingBase { url: request.url }.into())
    }
}

fn build_form(fields: FieldSet, options: FormOptions, transport: Arc<dyn FormTransport>) -> Form {
    Form::with_transport("http://localhost/", fields, options, transport)
}

fn fields(pairs: &[(&str, &str)]) -> FieldSet {
    pairs.iter().map(|(name, value)| (name.to_string(), json!(value))).collect()
}

#[tokio::test]
async fn post_put_delete_each_send_one_request() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut form = build_form(FieldSet::new(), FormOptions::default(), transport.clone());

    form.post().await.expect("post");
    form.delete().await.expect("delete");
    form.put().await.expect("put");

    let methods: Vec<Method> = transport.requests().into_iter().map(|request| request.method).collect();
    assert_eq!(methods, vec![Method::POST, Method::DELETE, Method::PUT]);
}

#[tokio::test]
async fn request_carries_fields_headers_and_url() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut form = build_form(
        fields(&[("name", "Lasse Rafn"), ("email", "")]),
        FormOptions::default().with_header("X-TEST", "true"),
        transport.clone(),
    );
    form.set_field("email", "lasserafn@gmail.com");

    form.submit("patch").await.expect("submit");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::PATCH);
    assert_eq!(request.url.as_str(), "http://localhost/");
    assert_eq!(request.body, json!({"name": "Lasse Rafn", "email": "lasserafn@gmail.com"}));
    assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some("application/json"));
    assert_eq!(request.headers.get("X-TEST").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn successful_json_submit_returns_body_and_no_errors() {
    let transport = ScriptedTransport::answering([RawResponse::new(StatusCode::OK, r#"{"message":"OK"}"#)]);
    let mut form = build_form(FieldSet::new(), FormOptions::default(), transport);
    form.errors_mut().set([("name", "stale")]);

    let body = form.post().await.expect("successful submit");

    assert_eq!(body, ResponseBody::Json(json!({"message": "OK"})));
    assert_eq!(form.errors().count(), 0);
}

#[tokio::test]
async fn successful_text_submit_returns_text() {
    let transport = ScriptedTransport::answering([RawResponse::new(StatusCode::OK, "Success")]);
    let mut form = build_form(FieldSet::new(), FormOptions::default(), transport);

    let body = form.post().await.expect("successful submit");

    assert_eq!(body, ResponseBody::Text("Success".into()));
    assert_eq!(form.errors().count(), 0);
}

#[tokio::test]
async fn failed_json_submit_rejects_and_sets_errors() {
    let transport = ScriptedTransport::answering([RawResponse::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"name":["Name is required."]}"#,
    )]);
    let mut form = build_form(FieldSet::new(), FormOptions::default(), transport);

    let error = form.post().await.unwrap_err();

    assert_eq!(
        error.rejection(),
        Some(&ResponseBody::Json(json!({"name": ["Name is required."]})))
    );
    assert_eq!(form.errors().get("name").len(), 1);
    assert_eq!(form.errors().count(), 1);
}

#[tokio::test]
async fn failed_text_submit_files_error_under_general() {
    let transport = ScriptedTransport::answering([RawResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Some random error happened",
    )]);
    let mut form = build_form(FieldSet::new(), FormOptions::default(), transport);

    let error = form.post().await.unwrap_err();

    assert_eq!(error.rejection(), Some(&ResponseBody::Text("Some random error happened".into())));
    assert_eq!(form.errors().get(GENERAL_ERROR_KEY), ["Some random error happened".to_string()]);
    assert_eq!(form.errors().count(), 1);
}

#[tokio::test]
async fn next_submission_clears_previous_errors() {
    let transport = ScriptedTransport::answering([
        RawResponse::new(StatusCode::UNPROCESSABLE_ENTITY, r#"{"email":"Email is invalid."}"#),
        RawResponse::new(StatusCode::CREATED, r#"{"id":7}"#),
    ]);
    let mut form = build_form(fields(&[("email", "nope")]), FormOptions::default(), transport);

    assert!(form.post().await.is_err());
    assert!(form.errors().has("email"));

    form.set_field("email", "ada@example.com");
    form.post().await.expect("second submit");
    assert!(!form.errors().has("email"));
    assert_eq!(form.field("email"), Some(&json!("ada@example.com")));
}

#[tokio::test]
async fn reset_on_success_restores_original_values() {
    let transport = ScriptedTransport::answering([RawResponse::new(StatusCode::OK, r#"{"message":"OK"}"#)]);
    let mut form = build_form(
        fields(&[("name", "Lasse Rafn"), ("email", "")]),
        FormOptions::default().with_reset_on_success(true),
        transport,
    );
    form.set_field("name", "John Doe");
    form.set_field("email", "demo@gmail.com");

    form.post().await.expect("successful submit");

    assert_eq!(form.field("name"), Some(&json!("Lasse Rafn")));
    assert_eq!(form.field("email"), Some(&json!("")));
}

#[tokio::test]
async fn failed_submit_keeps_edited_values_even_with_reset_on_success() {
    let transport = ScriptedTransport::answering([RawResponse::new(StatusCode::BAD_REQUEST, "nope")]);
    let mut form = build_form(
        fields(&[("name", "Lasse Rafn")]),
        FormOptions::default().with_reset_on_success(true),
        transport,
    );
    form.set_field("name", "John Doe");

    assert!(form.post().await.is_err());
    assert_eq!(form.field("name"), Some(&json!("John Doe")));
}

#[tokio::test]
async fn relative_targets_are_handed_to_the_transport_unchanged() {
    for target in ["", "/"] {
        let transport = Arc::new(ScriptedTransport::default());
        let initial = fields(&[("name", "Lasse Rafn"), ("email", "")]);
        let mut form = Form::with_transport(target, initial.clone(), FormOptions::default(), transport.clone());
        assert_eq!(form.data(), &initial);

        form.post().await.expect("submit");

        assert_eq!(transport.requests()[0].url, target);
    }
}

#[tokio::test]
async fn transport_error_propagates_without_errors() {
    let mut form = build_form(FieldSet::new(), FormOptions::default(), Arc::new(UnresolvableTransport));
    form.errors_mut().set([("name", "stale")]);

    let error = form.post().await.unwrap_err();

    assert!(matches!(
        error,
        SubmitError::Transport(TransportError::Target(TargetUrlError::MissingBase { .. }))
    ));
    assert!(!error.is_rejected());
    assert_eq!(form.errors().count(), 0);
}

#[tokio::test]
async fn invalid_method_is_reported_before_sending() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut form = build_form(FieldSet::new(), FormOptions::default(), transport.clone());

    let error = form.submit("not a verb").await.unwrap_err();

    assert!(matches!(error, SubmitError::InvalidMethod(ref verb) if verb == "not a verb"));
    assert!(transport.requests().is_empty());
}
