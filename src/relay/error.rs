//! Error taxonomy and the JSON error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::relay::Relayed;

/// Message used when a failure carries no text of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

const AUTH_FAILED_HINT: &str =
    " (Authentication failed - check if API_ENDPOINT includes the correct authentication code)";
const FORBIDDEN_HINT: &str = " (Access forbidden - verify the authentication code is valid)";

/// Every way a relayed request can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Inbound method was not POST.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No endpoint configured and the policy forbids a fallback.
    #[error("API endpoint is not configured. Please set the API_ENDPOINT environment variable.")]
    NotConfigured,

    /// Upstream answered outside 2xx.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Upstream answered 2xx with a body that is not JSON.
    #[error("Invalid JSON response from API")]
    InvalidJson,

    /// Transport, serialization or anything else unexpected.
    #[error("{0}")]
    Failure(String),
}

impl RelayError {
    /// Build an upstream error, appending the auth hint for 401/403.
    pub fn upstream(status: u16, status_text: &str, auth_hints: bool) -> Self {
        let mut message = format!("API returned {status}: {status_text}");
        if auth_hints {
            match status {
                401 => message.push_str(AUTH_FAILED_HINT),
                403 => message.push_str(FORBIDDEN_HINT),
                _ => {}
            }
        }

        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        RelayError::Upstream { status, message }
    }

    /// Build a generic failure, substituting a fixed message for empty text.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            RelayError::Failure(UNKNOWN_ERROR.to_string())
        } else {
            RelayError::Failure(message)
        }
    }

    /// HTTP status sent back to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Upstream { status, .. } => *status,
            RelayError::NotConfigured | RelayError::InvalidJson | RelayError::Failure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method_not_allowed",
            RelayError::NotConfigured => "not_configured",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::InvalidJson => "invalid_json",
            RelayError::Failure(_) => "failure",
        }
    }
}

impl From<RelayError> for Relayed {
    fn from(err: RelayError) -> Self {
        Relayed {
            status: err.status(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        Relayed::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_hints() {
        let err = RelayError::upstream(401, "Unauthorized", true);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            err.to_string(),
            "API returned 401: Unauthorized (Authentication failed - check if API_ENDPOINT includes the correct authentication code)"
        );

        let err = RelayError::upstream(403, "Forbidden", true);
        assert!(err.to_string().ends_with("(Access forbidden - verify the authentication code is valid)"));

        let err = RelayError::upstream(401, "Unauthorized", false);
        assert_eq!(err.to_string(), "API returned 401: Unauthorized");
    }

    #[test]
    fn test_other_statuses_have_no_hint() {
        let err = RelayError::upstream(502, "Bad Gateway", true);
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "API returned 502: Bad Gateway");
    }

    #[test]
    fn test_empty_failure_message() {
        assert_eq!(RelayError::failure("").to_string(), UNKNOWN_ERROR);
        assert_eq!(RelayError::failure("boom").to_string(), "boom");
    }

    #[test]
    fn test_envelope() {
        let relayed = Relayed::from(RelayError::MethodNotAllowed);
        assert_eq!(relayed.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(relayed.body, json!({ "error": "Method not allowed" }));

        let relayed = Relayed::from(RelayError::InvalidJson);
        assert_eq!(relayed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(relayed.body, json!({ "error": "Invalid JSON response from API" }));
    }
}
