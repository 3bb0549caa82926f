//! Formpost HTTP transport.
//!
//! This crate owns everything that touches the network on behalf of a form:
//!
//! - Describing one submission as a [`FormRequest`]
//! - The [`FormTransport`] seam that turns a request into a [`RawResponse`]
//! - [`FormClient`], the default `reqwest`-backed transport with a cookie
//!   store so ambient credentials ride along with every submission
//! - Merging configured headers over the default `Content-Type`
//! - Resolving relative targets against `FORMPOST_BASE_URL`
//!
//! # Example
//!
//! ```ignore
//! use formpost_api::{FormClient, FormRequest, FormTransport, merge_headers};
//! use indexmap::IndexMap;
//!
//! async fn send() -> Result<(), formpost_api::TransportError> {
//!     let client = FormClient::new()?;
//!     let request = FormRequest::new(
//!         reqwest::Method::POST,
//!         "http://localhost:8080/contact",
//!         merge_headers(&IndexMap::new()),
//!         serde_json::json!({"name": "Ada"}),
//!     );
//!     let response = client.send(request).await?;
//!     println!("status: {}", response.status());
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::Instant;

use async_trait::async_trait;
use formpost_types::{CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE};
use formpost_util::{http::truncate_response_preview, redact_header};
use indexmap::IndexMap;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use reqwest::{Method, StatusCode};

/// Environment variable consulted for the base of relative target URLs.
pub const BASE_URL_ENV: &str = "FORMPOST_BASE_URL";

/// A single form submission.
///
/// `url` is the target exactly as the form was given it; transports that
/// need an absolute URL resolve it with [`resolve_target_url`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    pub method: Method,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Value,
}

impl FormRequest {
    pub fn new(method: Method, url: impl Into<String>, headers: IndexMap<String, String>, body: Value) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body,
        }
    }
}

/// Status and undecoded body text of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    status: StatusCode,
    body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// True for 2xx statuses, matching the `ok` flag of a fetch response.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Failures raised before a response status and body are available.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    #[error(transparent)]
    Target(#[from] TargetUrlError),

    #[error("could not encode the request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Network error: {0}. Hint: check connection/proxy and the target URL.")]
    Network(#[source] reqwest::Error),

    #[error("could not read the response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Errors raised while resolving a form's target URL.
#[derive(Debug, Error, PartialEq)]
pub enum TargetUrlError {
    #[error("invalid target URL '{url}': {reason}")]
    Invalid { url: String, reason: String },

    #[error("relative target URL '{url}' needs a base URL; set baseUrl or FORMPOST_BASE_URL")]
    MissingBase { url: String },

    #[error("target URL must use http or https; got '{scheme}://'")]
    UnsupportedScheme { scheme: String },
}

/// Sends form requests and hands back the raw response.
///
/// Implementations report only transport-level failures as errors; any HTTP
/// status, including 4xx and 5xx, is a successful exchange.
#[async_trait]
pub trait FormTransport: Send + Sync {
    async fn send(&self, request: FormRequest) -> Result<RawResponse, TransportError>;
}

/// Default transport backed by a configured `reqwest::Client`.
///
/// The client keeps a cookie store so cookies set by earlier responses are
/// sent with later submissions. Relative targets are resolved against
/// `base_url`, then `FORMPOST_BASE_URL`, at send time.
#[derive(Debug, Clone)]
pub struct FormClient {
    pub http: Client,
    pub user_agent: String,
    pub base_url: Option<String>,
}

impl FormClient {
    pub fn new() -> Result<Self, TransportError> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            http,
            user_agent: format!("formpost/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            base_url: None,
        })
    }

    /// Wrap an existing client, for hosts that share one connection pool.
    pub fn from_client(http: Client) -> Self {
        Self {
            http,
            user_agent: format!("formpost/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl FormTransport for FormClient {
    async fn send(&self, request: FormRequest) -> Result<RawResponse, TransportError> {
        let start = Instant::now();
        let FormRequest {
            method,
            url,
            headers,
            body,
        } = request;

        debug!(
            method = %method,
            url = %url,
            headers = ?render_headers_for_log(&headers),
            "form request started"
        );

        let url = resolve_target_url(&url, self.base_url.as_deref()).map_err(|error| {
            warn!(method = %method, target = %url, error = %error, "form target rejected");
            error
        })?;
        let header_map = build_header_map(&headers)?;
        let payload = serde_json::to_vec(&body)?;

        let response = self
            .http
            .request(method.clone(), url.clone())
            .header(header::USER_AGENT, &self.user_agent)
            .headers(header_map)
            .body(payload)
            .send()
            .await
            .map_err(|error| {
                warn!(
                    method = %method,
                    url = %url,
                    error = %error,
                    duration_ms = start.elapsed().as_millis(),
                    "form request failed"
                );
                TransportError::Network(error)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(TransportError::Body)?;

        debug!(
            method = %method,
            url = %url,
            status = %status,
            body_preview = %truncate_response_preview(&text, 80),
            duration_ms = start.elapsed().as_millis(),
            "form request completed"
        );

        Ok(RawResponse::new(status, text))
    }
}

/// Merge configured headers over the default `Content-Type: application/json`.
///
/// Configured entries win on a case-insensitive name collision; the default
/// header keeps its leading position in either case.
pub fn merge_headers(configured: &IndexMap<String, String>) -> IndexMap<String, String> {
    let mut merged = IndexMap::new();
    merged.insert(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string());

    for (name, value) in configured {
        let existing = merged.keys().position(|key: &String| key.eq_ignore_ascii_case(name));
        match existing {
            Some(index) => {
                if let Some((key, slot)) = merged.get_index_mut(index) {
                    if key != name {
                        debug!(default = %key, configured = %name, "configured header overrides default");
                    }
                    *slot = value.clone();
                }
            }
            None => {
                merged.insert(name.clone(), value.clone());
            }
        }
    }

    merged
}

/// Resolve a form target into an absolute `http`/`https` URL.
///
/// Absolute targets are used as-is. Relative targets are joined onto
/// `base_url`, or onto `FORMPOST_BASE_URL` when no base is configured.
pub fn resolve_target_url(target: &str, base_url: Option<&str>) -> Result<Url, TargetUrlError> {
    let resolved = match Url::parse(target) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base_url
                .map(str::to_string)
                .or_else(|| env::var(BASE_URL_ENV).ok())
                .filter(|base| !base.trim().is_empty())
                .ok_or_else(|| TargetUrlError::MissingBase { url: target.to_string() })?;
            let base = Url::parse(base.trim()).map_err(|error| TargetUrlError::Invalid {
                url: base.clone(),
                reason: error.to_string(),
            })?;
            base.join(target).map_err(|error| TargetUrlError::Invalid {
                url: target.to_string(),
                reason: error.to_string(),
            })?
        }
        Err(error) => {
            return Err(TargetUrlError::Invalid {
                url: target.to_string(),
                reason: error.to_string(),
            });
        }
    };

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(TargetUrlError::UnsupportedScheme { scheme: other.to_string() }),
    }
}

fn build_header_map(headers: &IndexMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut header_map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|error| TransportError::Header {
            name: name.clone(),
            reason: error.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|error| TransportError::Header {
            name: name.clone(),
            reason: error.to_string(),
        })?;
        header_map.insert(header_name, header_value);
    }
    Ok(header_map)
}

fn render_headers_for_log(headers: &IndexMap<String, String>) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, redact_header(name, value)))
        .collect()
}
