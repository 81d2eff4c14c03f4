use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Unauthorized: {}", .detail.as_deref().unwrap_or("token may be expired"))]
    Unauthorized { detail: Option<String> },

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Request failed ({status}): {detail}")]
    Application { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape returned by the API: `{"detail": "..."}`, or a list of
/// validation items for 422 responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Value,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human-readable message out of a structured error body.
    fn parse_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            Value::String(s) => Some(s),
            Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .map(|item| {
                        let msg = item.get("msg").and_then(Value::as_str).unwrap_or("invalid");
                        let field = item
                            .get("loc")
                            .and_then(Value::as_array)
                            .and_then(|loc| loc.last())
                            .map(|v| match v {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            });
                        match field {
                            Some(field) => format!("{}: {}", field, msg),
                            None => msg.to_string(),
                        }
                    })
                    .collect();
                Some(messages.join("; "))
            }
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::parse_detail(body);
        let message = detail
            .clone()
            .unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            401 => ApiError::Unauthorized { detail },
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            422 => ApiError::Validation(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::Server(message),
            code => ApiError::Application {
                status: code,
                detail: message,
            },
        }
    }

    /// HTTP status behind this error, when the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::Validation(_) => Some(422),
            ApiError::RateLimited => Some(429),
            ApiError::Application { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-supplied message, if the error body carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail } => detail.as_deref(),
            ApiError::Forbidden(d)
            | ApiError::NotFound(d)
            | ApiError::Conflict(d)
            | ApiError::Validation(d)
            | ApiError::Server(d) => Some(d),
            ApiError::Application { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
