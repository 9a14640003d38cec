//! HTTP utilities for the lab content API

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Errors raised while talking to the content API
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The configured base URL or a resource path did not form a valid URL.
    #[error("invalid API URL `{input}`: {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection refused, DNS failure, TLS error, reset while reading...
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API request failed: {status}")]
    Status { status: StatusCode },

    /// The body was not valid JSON, or a record did not match its schema.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse classification of a [`FetchError`], cheap to copy around and compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Config,
    Transport,
    Status(u16),
    Decode,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Client(_) | FetchError::Url { .. } => FailureKind::Config,
            FetchError::Transport(_) => FailureKind::Transport,
            FetchError::Status { status } => FailureKind::Status(status.as_u16()),
            FetchError::Decode(_) => FailureKind::Decode,
        }
    }
}

/// Sanitize response body for logging
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        // Back off to a char boundary so multi-byte bodies don't panic
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for content API calls
#[derive(Clone)]
pub struct LabHttpClient {
    client: Client,
}

impl LabHttpClient {
    /// Create a new HTTP client. Without a connect timeout the stack default applies.
    pub fn new(connect_timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(concat!("labsite/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    /// Make a GET request and decode the JSON body
    pub async fn get(&self, url: Url) -> Result<Value, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(FetchError::Status { status });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Format a fetch error for display to the user
pub fn format_fetch_error(error: &FetchError) -> String {
    match error {
        FetchError::Client(_) => "Could not initialise the HTTP client.".to_string(),
        FetchError::Url { input, .. } => format!("Invalid API URL: {}", input),
        FetchError::Transport(e) if e.is_connect() => {
            "Cannot reach the lab API. Is the backend running?".to_string()
        }
        FetchError::Transport(e) if e.is_timeout() => "The lab API timed out.".to_string(),
        FetchError::Transport(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        FetchError::Status { status } => match status.as_u16() {
            404 => "Resource not found.".to_string(),
            401 | 403 => "The lab API refused the request.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "The lab API is temporarily unavailable.".to_string(),
            code => format!("The lab API answered with status {}.", code),
        },
        FetchError::Decode(_) => "The lab API returned data in an unexpected format.".to_string(),
    }
}
