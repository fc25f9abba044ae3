//! Error types for API operations.
//!
//! This module provides the error type shared by every crate in the workspace,
//! including HTTP status code mapping for failed API calls.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Main error type for API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// API is unavailable or returned a server error
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Credentials were missing or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with details
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict error
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Too many requests
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response body could not be decoded (or a payload could not be encoded)
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::ConfigError(_) | Self::Decode(_)
        )
    }

    /// Map a non-success HTTP status and its body to an error.
    ///
    /// When the body is an API error envelope, the first `errors[].message`
    /// becomes the error text; otherwise the raw body is used.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let text = error_message(body);
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(text),
            StatusCode::BAD_REQUEST => Self::BadRequest(text),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::Unauthorized(format!("{status}: {text}"))
            }
            StatusCode::CONFLICT => Self::Conflict(text),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(text),
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                Self::ServiceUnavailable(format!("API temporarily unavailable: {text}"))
            }
            status if status.is_server_error() => {
                Self::ServiceUnavailable(format!("API server error {status}: {text}"))
            }
            _ => Self::HttpError(format!("API error {status}: {text}")),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.errors.into_iter().next())
        .map_or_else(
            || body.to_string(),
            |entry| match entry.code {
                Some(code) => format!("{} (code {code})", entry.message),
                None => entry.message,
            },
        )
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
