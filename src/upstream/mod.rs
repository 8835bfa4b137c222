//! Outbound access to the upstream case-law API.
//!
//! The [`CaseLawApi`] trait is the seam between the gateway and the network. It
//! returns the upstream body as a raw JSON object; shaping that object into the
//! client-facing contract is the gateway's job.
//!
//! - [`KanoonClient`]: reqwest implementation with credential injection
//! - [`MockCaseLawApi`]: scripted in-memory implementation for tests

mod kanoon;
pub mod mock;

pub use kanoon::KanoonClient;
pub use mock::MockCaseLawApi;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::models::{DocumentRequest, SearchQuery};

/// Raw JSON object returned by the upstream API
pub type JsonObject = Map<String, Value>;

/// Interface to a case-law search provider.
#[async_trait]
pub trait CaseLawApi: Send + Sync + std::fmt::Debug {
    /// Human-readable name used in log lines
    fn name(&self) -> &str;

    /// Whether a credential is available. When false every call fails with
    /// [`UpstreamError::NotConfigured`] without touching the network.
    fn is_configured(&self) -> bool;

    /// Run a search. Only an HTTP 200 reply with an object body succeeds.
    async fn search(&self, query: &SearchQuery) -> Result<JsonObject, UpstreamError>;

    /// Fetch one document. Any 2xx reply with an object body succeeds.
    async fn document(&self, request: &DocumentRequest) -> Result<JsonObject, UpstreamError>;
}

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// No credential configured; nothing was sent
    #[error("API token not configured")]
    NotConfigured,

    /// The request never produced a response (DNS, connect, TLS, timeout, body read)
    #[error("{0}")]
    Network(String),

    /// The upstream replied with an unacceptable status
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        /// Parsed error payload, or the raw text when it is not JSON
        body: Option<Value>,
    },

    /// The upstream replied successfully but the body is not a JSON object
    #[error("Invalid response format")]
    InvalidFormat(String),
}

impl UpstreamError {
    /// `message` string from an upstream error payload, if any
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            UpstreamError::Status {
                body: Some(Value::Object(body)),
                ..
            } => body.get("message").and_then(Value::as_str),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Network(err.to_string())
    }
}

/// Accept only JSON objects as successful bodies
pub fn require_object(value: Value) -> Result<JsonObject, UpstreamError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(UpstreamError::InvalidFormat("body is null".to_string())),
        other => Err(UpstreamError::InvalidFormat(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse a successful response body
pub fn parse_object(text: &str) -> Result<JsonObject, UpstreamError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| UpstreamError::InvalidFormat(format!("body is not JSON: {}", e)))?;
    require_object(value)
}

/// Interpret an error response body for diagnostics
pub fn error_body(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(text.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
