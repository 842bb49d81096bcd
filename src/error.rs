//! Error types for the mytoken client

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for the mytoken client
pub type Result<T> = std::result::Result<T, Error>;

/// Mytoken client errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP error (connection refused, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the mytoken service
    #[error("API error: {0}")]
    Api(ApiError),

    /// Response body did not have the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Human-readable message suitable for display.
    ///
    /// For API errors this extracts the server's `error` /
    /// `error_description` fields; other variants use their `Display` form.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api(api) => api.message(),
            other => other.to_string(),
        }
    }
}

/// An error response from the mytoken service.
///
/// The body is kept verbatim; no interpretation is done here beyond
/// extracting a display string on request.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// The raw JSON error body, unmodified
    pub body: serde_json::Value,
}

/// The error fields mytoken puts in JSON error bodies.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorFields {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ApiError {
    /// Build from a response status and raw body text. Non-JSON bodies
    /// are carried as a JSON string so nothing is lost.
    #[must_use]
    pub fn from_body(status: u16, body: &str) -> Self {
        let body = serde_json::from_str(body)
            .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));
        Self { status, body }
    }

    /// The server-assigned error code (`error` field), if present.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        self.fields().error
    }

    /// Extract a human-readable message from the error body:
    /// "error: description" when both fields are present, the `error`
    /// field alone otherwise, falling back to the raw body.
    #[must_use]
    pub fn message(&self) -> String {
        match self.fields() {
            ApiErrorFields {
                error: Some(e),
                error_description: Some(d),
            } => format!("{e}: {d}"),
            ApiErrorFields {
                error: Some(e),
                error_description: None,
            } => e,
            _ => self.body.to_string(),
        }
    }

    fn fields(&self) -> ApiErrorFields {
        serde_json::from_value(self.body.clone()).unwrap_or_default()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_with_error_and_description() {
        let api = ApiError::from_body(
            400,
            r#"{"error":"invalid_request","error_description":"bad capability"}"#,
        );
        assert_eq!(api.message(), "invalid_request: bad capability");
        assert_eq!(api.error_code().as_deref(), Some("invalid_request"));
    }

    #[test]
    fn message_with_error_only() {
        let api = ApiError::from_body(401, r#"{"error":"invalid_token"}"#);
        assert_eq!(api.message(), "invalid_token");
    }

    #[test]
    fn message_falls_back_to_raw_body() {
        let api = ApiError::from_body(502, "upstream exploded");
        assert_eq!(api.message(), "\"upstream exploded\"");
        assert_eq!(api.status, 502);
    }

    #[test]
    fn body_is_preserved_verbatim() {
        let api = ApiError::from_body(403, r#"{"error":"usage_restricted","extra":42}"#);
        assert_eq!(api.body["extra"], 42);
    }

    #[test]
    fn error_message_delegates_to_api() {
        let err = Error::Api(ApiError::from_body(
            400,
            r#"{"error":"invalid_grant","error_description":"token expired"}"#,
        ));
        assert_eq!(err.message(), "invalid_grant: token expired");
    }
}
