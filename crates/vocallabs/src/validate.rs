//! Pure pre-flight checks run before any network activity.
//!
//! Every check returns a [`ValidationError`] carrying a message that says
//! what was wrong and, where possible, how to get a correct value.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::error::NormalizedError;

/// Longest name accepted for agents and campaigns.
pub const MAX_NAME_LEN: usize = 100;

pub const MAX_PAGE_SIZE: i64 = 100;

const ISO_DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";
const ISO_DATETIME_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{3})?Z?$";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<ValidationError> for NormalizedError {
    fn from(err: ValidationError) -> Self {
        NormalizedError::validation(err.message)
    }
}

pub type Validated<T> = Result<T, ValidationError>;

/// Non-blank string. Returns the value untouched.
pub fn required<'a>(value: &'a str, message: impl Into<String>) -> Validated<&'a str> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(message));
    }
    Ok(value)
}

/// Length in characters, not bytes.
pub fn max_len<'a>(value: &'a str, max: usize, message: impl Into<String>) -> Validated<&'a str> {
    if value.chars().count() > max {
        return Err(ValidationError::new(message));
    }
    Ok(value)
}

pub fn pagination(limit: i64, offset: i64) -> Validated<()> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ValidationError::new(format!(
            "Invalid limit value: {limit}. Limit must be between 1 and {MAX_PAGE_SIZE}."
        )));
    }
    if offset < 0 {
        return Err(ValidationError::new(format!(
            "Invalid offset value: {offset}. Offset cannot be negative."
        )));
    }
    Ok(())
}

/// International format: non-empty and starting with `+`.
pub fn phone_number<'a>(value: &'a str, field: &str) -> Validated<&'a str> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "{field} required. Phone cannot be empty."
        )));
    }
    if !value.starts_with('+') {
        return Err(ValidationError::new(format!(
            "Invalid phone format: {value}. Phone must start with + and country code \
             (+<country code><number>). Example: +919876543210 (India), +1234567890 (US)"
        )));
    }
    Ok(value)
}

/// A JSON field may arrive as structured JSON or as text holding JSON.
pub fn json_value(value: &Value, field: &str) -> Validated<Value> {
    match value {
        Value::String(text) => serde_json::from_str(text)
            .map_err(|e| ValidationError::new(format!("Invalid JSON in {field}: {e}"))),
        other => Ok(other.clone()),
    }
}

/// Absolute `http`/`https` URL.
pub fn http_url(value: &str, field: &str) -> Validated<Url> {
    let url = Url::parse(value.trim())
        .map_err(|_| ValidationError::new(format!("Invalid {field}: {value} (must be valid HTTP/HTTPS)")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ValidationError::new(format!(
            "Invalid {field}: {value} (must be valid HTTP/HTTPS)"
        ))),
    }
}

pub fn websocket_url(value: &str, field: &str) -> Validated<Url> {
    let invalid = || {
        ValidationError::new(format!(
            "Invalid {field}: {value}. Must start with ws:// or wss://"
        ))
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        _ => Err(invalid()),
    }
}

/// `YYYY-MM-DD`.
pub fn iso_date<'a>(value: &'a str, field: &str) -> Validated<&'a str> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "{field} required (format: YYYY-MM-DD)."
        )));
    }
    if !matches(&PATTERN, ISO_DATE_PATTERN, value) {
        return Err(ValidationError::new(format!(
            "Invalid date \"{value}\". Format must be YYYY-MM-DD. Example: 2025-11-08"
        )));
    }
    Ok(value)
}

/// `YYYY-MM-DDTHH:MM:SS`, optional milliseconds and trailing `Z`.
pub fn iso_datetime<'a>(value: &'a str, field: &str) -> Validated<&'a str> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    if !matches(&PATTERN, ISO_DATETIME_PATTERN, value) {
        return Err(ValidationError::new(format!(
            "Invalid {field} format: {value}. Must be ISO8601 UTC (e.g., 2025-10-09T12:05:17.875Z)"
        )));
    }
    Ok(value)
}

fn matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_rejects_blank() {
        assert_eq!(required("abc", "x"), Ok("abc"));
        assert_eq!(required("  ", "Agent ID required").unwrap_err().message, "Agent ID required");
    }

    #[test]
    fn max_len_counts_chars() {
        let name = "é".repeat(100);
        assert!(max_len(&name, MAX_NAME_LEN, "too long").is_ok());
        assert!(max_len(&format!("{name}a"), MAX_NAME_LEN, "too long").is_err());
    }

    #[test]
    fn pagination_bounds() {
        assert!(pagination(1, 0).is_ok());
        assert!(pagination(100, 500).is_ok());
        assert!(pagination(0, 0).unwrap_err().message.contains("Limit must be between 1 and 100"));
        assert!(pagination(101, 0).is_err());
        assert!(pagination(10, -1).unwrap_err().message.contains("Offset cannot be negative"));
    }

    #[test]
    fn phone_requires_plus_prefix() {
        assert!(phone_number("+919876543210", "Phone").is_ok());
        let err = phone_number("919876543210", "Phone").unwrap_err();
        assert!(err.message.contains("+<country code>"));
        assert!(phone_number("", "Phone To").unwrap_err().message.starts_with("Phone To required"));
    }

    #[test]
    fn json_value_parses_strings_and_passes_structures() {
        assert_eq!(json_value(&json!(r#"{"a":1}"#), "Data").unwrap(), json!({ "a": 1 }));
        assert_eq!(json_value(&json!([1, 2]), "Data").unwrap(), json!([1, 2]));
        assert!(json_value(&json!("{not json"), "Update Data")
            .unwrap_err()
            .message
            .starts_with("Invalid JSON in Update Data"));
    }

    #[test]
    fn url_schemes() {
        assert!(http_url("https://example.com/a.mp3", "URL").is_ok());
        assert!(http_url("ftp://example.com/a.mp3", "URL").is_err());
        assert!(http_url("not a url", "URL").is_err());
        assert!(websocket_url("wss://example.com/audio", "WebSocket URL").is_ok());
        assert!(websocket_url("https://example.com/audio", "WebSocket URL").is_err());
    }

    #[test]
    fn dates() {
        assert!(iso_date("2025-11-08", "Start date").is_ok());
        assert!(iso_date("08/11/2025", "Start date").unwrap_err().message.contains("YYYY-MM-DD"));
        assert!(iso_date("", "Start date").is_err());

        assert!(iso_datetime("2025-10-09T12:05:17.875Z", "created_at").is_ok());
        assert!(iso_datetime("2025-10-09T12:05:17", "created_at").is_ok());
        assert!(iso_datetime("2025-10-09 12:05", "created_at").is_err());
    }

    #[test]
    fn converts_to_validation_error() {
        let err: NormalizedError = ValidationError::new("bad").into();
        assert_eq!(err.http_code, "400");
        assert_eq!(err.kind, crate::error::ErrorKind::Validation);
    }
}
