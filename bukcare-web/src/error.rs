use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of a call to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unable to connect to server. Please check your connection.")]
    NetworkUnreachable,

    #[error("Server error: Expected JSON response but received HTML or plain text")]
    ServerNonJsonResponse,

    #[error("{0}")]
    InvalidResponse(String),

    /// Non-2xx status. `message` comes from the payload when it carries one.
    #[error("{message}")]
    Http {
        status: StatusCode,
        message: String,
        details: Option<Value>,
    },

    /// The backend rejected the bearer token of an authenticated call.
    #[error("Your session has expired. Please sign in again.")]
    AuthRequired,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::AuthRequired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// True for a non-2xx response with the given status whose message contains `needle`.
    pub fn is_http_with(&self, status: StatusCode, needle: &str) -> bool {
        matches!(self, ApiError::Http { status: s, message, .. } if *s == status && message.contains(needle))
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Http { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn from_status(status: StatusCode, payload: &Value) -> Self {
        let message = error_message(payload).unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )
        });

        ApiError::Http {
            status,
            message,
            details: payload.get("details").cloned(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse("Invalid response from server".to_string())
        } else {
            ApiError::NetworkUnreachable
        }
    }
}

/// Picks the most specific message a backend error payload carries:
/// `error`, then `message`, then `detail`, then the first entry of a
/// field-keyed `errors` object.
fn error_message(payload: &Value) -> Option<String> {
    for key in ["error", "message", "detail"] {
        if let Some(text) = payload.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }

    payload
        .get("errors")
        .and_then(Value::as_object)
        .and_then(|errors| errors.values().find_map(first_text))
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
