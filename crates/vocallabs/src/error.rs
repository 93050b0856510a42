//! Upstream failure shapes and their normalization.
//!
//! The API is inconsistent about where it puts the complaint: sometimes a
//! JSON object, sometimes a JSON document encoded as a string, sometimes
//! plain text. [`ErrorShape`] captures what was observed and
//! [`ErrorShape::normalize`] turns it into the single [`NormalizedError`]
//! every caller sees.

use std::time::Duration;

use nodes::{NodeApiError, NodeError};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Body fields probed for a human-readable message, highest priority first.
pub const MESSAGE_FIELDS: [&str; 3] = ["message", "error", "detail"];

/// HTTP code reported when no response was received at all.
pub const TRANSPORT_HTTP_CODE: &str = "500";

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential exchange failed or returned no usable token.
    Authentication,
    /// Token rejected (401) or insufficient privilege (403).
    Authorization,
    /// Malformed request, caught locally or by the API.
    Validation,
    /// Referenced entity does not exist.
    NotFound,
    /// Entity already exists.
    Conflict,
    /// Upstream throttling (429).
    RateLimited,
    /// Upstream 5xx.
    Server,
    /// No response: refused, timed out, DNS, reset.
    Network,
}

/// Classify an upstream status + extracted message.
///
/// The API reports some duplicate-name conflicts as 500s; those are mapped
/// to [`ErrorKind::Conflict`] by message content.
pub fn classify(status: u16, message: &str) -> ErrorKind {
    let lower = message.to_lowercase();
    let duplicate = lower.contains("duplicate");
    match status {
        401 | 403 => ErrorKind::Authorization,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        429 => ErrorKind::RateLimited,
        500..=599 if duplicate || lower.contains("exists") => ErrorKind::Conflict,
        500..=599 => ErrorKind::Server,
        400 if duplicate => ErrorKind::Conflict,
        _ => ErrorKind::Validation,
    }
}

// ---------------------------------------------------------------------------
// NormalizedError
// ---------------------------------------------------------------------------

/// The only structured output of a failure path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NormalizedError {
    pub kind: ErrorKind,
    pub message: String,
    /// Upstream status as a string.
    pub http_code: String,
    /// Server-suggested wait before retrying, when it sent one.
    pub retry_after: Option<Duration>,
}

impl NormalizedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, http_code: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_code: http_code.into(),
            retry_after: None,
        }
    }

    /// A locally detected input problem.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message, "400")
    }

    pub fn authentication(message: impl Into<String>, http_code: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message, http_code)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn status(&self) -> Option<u16> {
        self.http_code.parse().ok()
    }

    /// Whether re-running the same item later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::RateLimited | ErrorKind::Server | ErrorKind::Network
        )
    }
}

impl From<NormalizedError> for NodeApiError {
    fn from(err: NormalizedError) -> Self {
        NodeApiError::new(err.message, err.http_code)
    }
}

impl From<NormalizedError> for NodeError {
    fn from(err: NormalizedError) -> Self {
        if err.is_retryable() {
            NodeError::Retryable(err.into())
        } else {
            NodeError::Fatal(err.into())
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorShape
// ---------------------------------------------------------------------------

/// An error response body as received.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    /// `retry_after` (seconds) or `retry_after_ms` from a JSON object body.
    fn retry_after(&self) -> Option<Duration> {
        let Self::Json(Value::Object(map)) = self else {
            return None;
        };
        map.get("retry_after_ms")
            .and_then(Value::as_u64)
            .map(Duration::from_millis)
            .or_else(|| {
                map.get("retry_after")
                    .and_then(Value::as_f64)
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Other,
}

/// What went wrong on the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorShape {
    /// The API answered with a non-success status.
    Response {
        status: u16,
        body: ResponseBody,
        retry_after: Option<Duration>,
    },
    /// No usable response was received.
    Transport { kind: TransportKind, message: String },
}

impl ErrorShape {
    pub fn response(status: u16, body: ResponseBody) -> Self {
        Self::Response { status, body, retry_after: None }
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else {
            TransportKind::Other
        };
        Self::Transport { kind, message: err.to_string() }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// The most specific human-readable complaint available.
    pub fn message(&self) -> String {
        match self {
            Self::Response { status, body, .. } => body_message(*status, body),
            Self::Transport { kind: TransportKind::Timeout, message } => {
                format!("Request to VocalLabs timed out: {message}")
            }
            Self::Transport { kind: TransportKind::Connect, message } => {
                format!("Could not connect to VocalLabs: {message}")
            }
            Self::Transport { kind: TransportKind::Other, message } => message.clone(),
        }
    }

    pub fn normalize(self) -> NormalizedError {
        let message = self.message();
        match self {
            Self::Response { status, body, retry_after } => NormalizedError {
                kind: classify(status, &message),
                message,
                http_code: status.to_string(),
                retry_after: retry_after.or_else(|| body.retry_after()),
            },
            Self::Transport { .. } => {
                NormalizedError::new(ErrorKind::Network, message, TRANSPORT_HTTP_CODE)
            }
        }
    }
}

fn generic_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

fn body_message(status: u16, body: &ResponseBody) -> String {
    match body {
        ResponseBody::Json(Value::Object(map)) => {
            probe_fields(map).unwrap_or_else(|| Value::Object(map.clone()).to_string())
        }
        ResponseBody::Json(Value::String(text)) | ResponseBody::Text(text) => {
            text_message(status, text)
        }
        ResponseBody::Json(Value::Null) | ResponseBody::Empty => generic_message(status),
        ResponseBody::Json(other) => other.to_string(),
    }
}

/// A string body may itself be an encoded JSON document.
fn text_message(status: u16, text: &str) -> String {
    if text.trim().is_empty() {
        return generic_message(status);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => probe_fields(&map).unwrap_or_else(|| text.to_string()),
        _ => text.to_string(),
    }
}

fn probe_fields(map: &Map<String, Value>) -> Option<String> {
    MESSAGE_FIELDS.iter().find_map(|field| match map.get(*field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // {"error": {"message": "..."}}
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        _ => None,
    })
}
