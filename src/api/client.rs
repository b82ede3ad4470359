use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::retry::BackoffPolicy;
use crate::util::validate_http_url;

/// Default backend origin.
pub const DEFAULT_API_ORIGIN: &str = "http://127.0.0.1:5000";

/// Object fields that may wrap a list in backend replies.
pub const LIST_FIELDS: &[&str] = &["data", "items", "all_articles", "all_matches"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The server answered 2xx but with `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Invalid API URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Transport failures may succeed on retry; answers from the server will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// At most three hops; a URL seen twice is a loop.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        if attempt.previous().iter().any(|prev| prev == attempt.url()) {
            return attempt.error("Redirect loop detected");
        }
        attempt.follow()
    })
}

/// HTTP client for the trends backend.
///
/// Cheap to clone; clones share the connection pool and the cookie jar that
/// carries the login session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    origin: Url,
    base: Url,
    pub(crate) backoff: BackoffPolicy,
}

impl ApiClient {
    /// Build a client for the backend at `origin` (e.g. `http://127.0.0.1:5000`).
    ///
    /// A trailing `/api` on the origin is accepted and ignored.
    pub fn new(origin: &str, timeout: Duration) -> Result<Self> {
        let mut origin = validate_http_url(origin)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", origin, e)))?;
        let trimmed = origin
            .path()
            .trim_end_matches('/')
            .trim_end_matches("/api")
            .to_string();
        origin.set_path(&trimmed);
        origin.set_query(None);
        origin.set_fragment(None);

        let mut base = origin.clone();
        base.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(origin.to_string()))?
            .pop_if_empty()
            .push("api");

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(create_redirect_policy())
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            origin,
            base,
            backoff: BackoffPolicy::default(),
        })
    }

    pub fn with_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// `{base}/api/{segments...}` with every segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// A URL on the backend origin outside `/api` (OAuth entry points).
    pub fn origin_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.origin.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.origin.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get(&self, segments: &[&str]) -> Result<Value> {
        self.send::<()>(Method::GET, segments, None).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<Value> {
        self.send(Method::POST, segments, Some(body)).await
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<Value> {
        self.send::<()>(Method::DELETE, segments, None).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Value> {
        let url = self.endpoint(segments)?;
        tracing::debug!(method = %method, url = %url, "API request");
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        read_response(response).await
    }
}

/// Map a backend reply to JSON or an [`ApiError`].
async fn read_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    let body: Option<Value> = if bytes.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(v) => Some(v),
            Err(e) if status.is_success() => return Err(ApiError::Decode(e.to_string())),
            Err(_) => None,
        }
    };

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Server error (status: {})", status.as_u16()));
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body.unwrap_or(Value::Null))
}

/// Decode a value into `T`.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull a list out of a reply that is either a bare array or an object
/// holding the array under one of `fields`.
///
/// Elements that fail to decode are skipped with a warning.
pub fn extract_list<T: DeserializeOwned>(value: Value, fields: &[&str]) -> Result<Vec<T>> {
    let array = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => fields
            .iter()
            .find_map(|f| match map.remove(*f) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| ApiError::Decode(format!("expected one of {:?}", fields)))?,
        other => {
            return Err(ApiError::Decode(format!(
                "expected a list, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = array.len();
    let items: Vec<T> = array
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "Skipping malformed list element");
                None
            }
        })
        .collect();
    if items.len() < total {
        tracing::debug!(kept = items.len(), total, "Decoded list with skipped elements");
    }
    Ok(items)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `success == false` means the server refused; returns its message or `fallback`.
pub(crate) fn rejection(value: &Value, fallback: &str) -> Option<ApiError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback);
        Some(ApiError::Rejected(message.to_string()))
    } else {
        None
    }
}
