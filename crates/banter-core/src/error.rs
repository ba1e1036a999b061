//! Structured client errors.
//!
//! Every failure that terminates a turn is classified into a
//! [`ClientErrorKind`] so callers can report it consistently. Malformed
//! event lines are not errors at this level: the stream parser skips them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of client errors for consistent error handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Network/transport failure (connect error, stream aborted mid-flight)
    Transport,
    /// In-band error reported by the backend inside the event stream
    Api,
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErrorKind::HttpStatus => write!(f, "http_status"),
            ClientErrorKind::Timeout => write!(f, "timeout"),
            ClientErrorKind::Transport => write!(f, "transport"),
            ClientErrorKind::Api => write!(f, "api"),
        }
    }
}

/// Structured error from the chat client with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientError {
    /// Error category
    pub kind: ClientErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ClientError {
    /// Creates a new client error.
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, extracting a cleaner message from a
    /// JSON error body when one is present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {}", status);
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(detail) = extract_error_detail(&json)
            {
                return Self {
                    kind: ClientErrorKind::HttpStatus,
                    message: format!("HTTP {}: {}", status, detail),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: ClientErrorKind::HttpStatus,
            message,
            details,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Timeout, message)
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Transport, message)
    }

    /// Creates an error for an in-band `{"error": ...}` stream payload.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Api, message)
    }

    /// Classifies a reqwest error into a ClientError.
    pub fn classify_reqwest_error(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            Self::transport(format!("Connection failed: {}", e))
        } else {
            Self::transport(format!("Network error: {}", e))
        }
    }
}

/// Pulls a human-readable message out of known error body shapes:
/// `{"detail": "..."}` and `{"error": {"message": "..."}}`.
fn extract_error_detail(json: &Value) -> Option<&str> {
    if let Some(detail) = json.get("detail").and_then(Value::as_str) {
        return Some(detail);
    }
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_extracts_detail_field() {
        let err = ClientError::http_status(500, r#"{"detail": "model not available"}"#);
        assert_eq!(err.kind, ClientErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 500: model not available");
        assert!(err.details.is_some());
    }

    #[test]
    fn test_http_status_extracts_nested_error_message() {
        let err = ClientError::http_status(429, r#"{"error": {"message": "slow down"}}"#);
        assert_eq!(err.message, "HTTP 429: slow down");
    }

    #[test]
    fn test_http_status_plain_body() {
        let err = ClientError::http_status(502, "bad gateway");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("bad gateway"));
    }

    #[test]
    fn test_http_status_empty_body() {
        let err = ClientError::http_status(404, "");
        assert_eq!(err.message, "HTTP 404");
        assert!(err.details.is_none());
    }
}
