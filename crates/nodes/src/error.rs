//! Node-level error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error shape the host renders to the end user.
///
/// `message` is shown verbatim; `http_code` is the upstream status as a
/// string (`"400"` for failures detected before any request was sent).
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct NodeApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_code: Option<String>,
}

impl NodeApiError {
    pub fn new(message: impl Into<String>, http_code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_code: Some(http_code.into()),
        }
    }

    /// An error without an associated HTTP status.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_code: None,
        }
    }
}

/// Errors returned by a node's `execute` method.
///
/// Nodes never retry on their own. The variant tells the host's
/// workflow-level retry policy what to do:
/// - `Retryable`: the item may be re-run later (throttling, upstream outage).
/// - `Fatal`: re-running with the same input will fail the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Transient failure; the host may re-try the item.
    #[error("retryable node error: {0}")]
    Retryable(NodeApiError),

    /// Permanent failure; no retry should be attempted.
    #[error("fatal node error: {0}")]
    Fatal(NodeApiError),
}

impl NodeError {
    /// The user-facing error regardless of retry classification.
    pub fn api_error(&self) -> &NodeApiError {
        match self {
            Self::Retryable(e) | Self::Fatal(e) => e,
        }
    }

    pub fn message(&self) -> &str {
        &self.api_error().message
    }

    pub fn http_code(&self) -> Option<&str> {
        self.api_error().http_code.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_the_user_message() {
        let err = NodeError::Fatal(NodeApiError::new("Agent ID required", "400"));
        assert_eq!(err.to_string(), "fatal node error: Agent ID required");
        assert_eq!(err.message(), "Agent ID required");
        assert_eq!(err.http_code(), Some("400"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn api_error_serializes_without_missing_code() {
        let json = serde_json::to_value(NodeApiError::message_only("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "boom" }));
    }
}
