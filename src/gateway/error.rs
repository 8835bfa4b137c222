//! Client-facing error contract.

use serde::Serialize;
use serde_json::Value;

use crate::upstream::UpstreamError;

/// HTTP 400
pub const STATUS_BAD_REQUEST: u16 = 400;

/// HTTP 500
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Operation that produced an error; decides how upstream failures are worded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    Document,
}

/// Error returned to clients as `{ "error": message, "details"?: payload }`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// HTTP status sent to the client
    pub status: u16,

    /// Human-readable message, shown to end users as-is
    pub message: String,

    /// Raw upstream error payload, when there is one and it may be exposed
    pub details: Option<Value>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Invalid client input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(STATUS_BAD_REQUEST, message)
    }

    /// Failure on the gateway or upstream side with no better status
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(STATUS_INTERNAL_ERROR, message)
    }

    /// Credential missing; no upstream call was made
    pub fn not_configured() -> Self {
        Self::internal(UpstreamError::NotConfigured.to_string())
    }

    /// Translate an upstream failure for the given operation.
    ///
    /// Status errors mirror the upstream status. Document errors prefer the
    /// upstream's own `message`; search errors always use the generic wording.
    pub fn from_upstream(err: UpstreamError, op: Operation, expose_details: bool) -> Self {
        match err {
            UpstreamError::NotConfigured => Self::not_configured(),
            UpstreamError::Network(message) => Self::internal(message),
            UpstreamError::InvalidFormat(_) => Self::internal(err.to_string()),
            UpstreamError::Status { status, .. } => {
                let message = match op {
                    Operation::Document => err
                        .upstream_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| err.to_string()),
                    Operation::Search => err.to_string(),
                };
                let details = match err {
                    UpstreamError::Status { body, .. } if expose_details => body,
                    _ => None,
                };
                Self {
                    status,
                    message,
                    details,
                }
            }
        }
    }

    /// JSON body sent to the client
    pub fn body(&self) -> Value {
        serde_json::to_value(ErrorBody {
            error: &self.message,
            details: self.details.as_ref(),
        })
        .unwrap_or_else(|_| serde_json::json!({ "error": self.message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn not_found() -> UpstreamError {
        UpstreamError::Status {
            status: 404,
            body: Some(json!({"message": "not found"})),
        }
    }

    #[test]
    fn test_not_configured() {
        let err = ApiError::from_upstream(UpstreamError::NotConfigured, Operation::Search, true);
        assert_eq!(err.status, 500);
        assert_eq!(err.body(), json!({"error": "API token not configured"}));
    }

    #[test]
    fn test_document_status_uses_upstream_message() {
        let err = ApiError::from_upstream(not_found(), Operation::Document, true);
        assert_eq!(err.status, 404);
        assert_eq!(
            err.body(),
            json!({"error": "not found", "details": {"message": "not found"}})
        );
    }

    #[test]
    fn test_search_status_uses_generic_message() {
        let err = ApiError::from_upstream(not_found(), Operation::Search, true);
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Request failed with status code 404");
        assert_eq!(err.details, Some(json!({"message": "not found"})));
    }

    #[test]
    fn test_details_can_be_hidden() {
        let err = ApiError::from_upstream(not_found(), Operation::Document, false);
        assert_eq!(err.status, 404);
        assert_eq!(err.body(), json!({"error": "not found"}));
    }

    #[test]
    fn test_status_without_body() {
        let err = ApiError::from_upstream(
            UpstreamError::Status {
                status: 503,
                body: None,
            },
            Operation::Document,
            true,
        );
        assert_eq!(err.status, 503);
        assert_eq!(
            err.body(),
            json!({"error": "Request failed with status code 503"})
        );
    }

    #[test]
    fn test_invalid_format_and_network() {
        let err = ApiError::from_upstream(
            UpstreamError::InvalidFormat("body is null".to_string()),
            Operation::Search,
            true,
        );
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "Invalid response format");

        let err = ApiError::from_upstream(
            UpstreamError::Network("connection refused".to_string()),
            Operation::Search,
            true,
        );
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "connection refused");
    }
}
