//! The case-law proxy gateway.
//!
//! [`Gateway`] owns the two client-facing operations. Each one checks the
//! credential, validates input, forwards upstream once, and normalizes the reply
//! into a shape-stable contract. Failures become an [`ApiError`]. There is no
//! retry and no caching: identical requests produce independent upstream calls.

mod error;

pub use error::{ApiError, Operation, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{
    DocumentRecord, DocumentRequest, SearchQuery, SearchResultSet, UpstreamDocument,
    UpstreamSearchResponse,
};
use crate::upstream::{CaseLawApi, JsonObject, KanoonClient, UpstreamError};

/// Mediates between clients and the upstream case-law API
#[derive(Debug, Clone)]
pub struct Gateway {
    api: Arc<dyn CaseLawApi>,
    expose_details: bool,
}

impl Gateway {
    /// Create a gateway over any upstream implementation
    pub fn new(api: Arc<dyn CaseLawApi>) -> Self {
        Self {
            api,
            expose_details: true,
        }
    }

    /// Create a gateway talking to the configured upstream API
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let client = KanoonClient::new(&config.upstream)?;
        Ok(Self::new(Arc::new(client)).expose_details(config.server.expose_upstream_details))
    }

    /// Whether upstream error payloads are passed through as `details`
    pub fn expose_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    /// Whether the upstream credential is available
    pub fn is_configured(&self) -> bool {
        self.api.is_configured()
    }

    /// Name of the upstream provider
    pub fn upstream_name(&self) -> &str {
        self.api.name()
    }

    /// Run a case-law search
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResultSet, ApiError> {
        if !self.api.is_configured() {
            tracing::error!(operation = "search", "Rejecting request: API token not configured");
            return Err(ApiError::not_configured());
        }
        query.validate().map_err(ApiError::bad_request)?;

        tracing::info!(
            query = %query.query,
            page = query.page,
            max_cites = query.max_cites,
            filters = !query.filters.is_empty(),
            "Forwarding search"
        );

        let body = self
            .api
            .search(&query)
            .await
            .map_err(|e| self.fail(Operation::Search, e))?;
        let upstream: UpstreamSearchResponse =
            decode(body).map_err(|e| self.fail(Operation::Search, e))?;

        let result = SearchResultSet::normalize(upstream, &query);
        tracing::debug!(docs = result.docs.len(), found = %result.found, "Search normalized");
        Ok(result)
    }

    /// Fetch a single document with its citation lists
    pub async fn document(&self, request: DocumentRequest) -> Result<DocumentRecord, ApiError> {
        if !self.api.is_configured() {
            tracing::error!(operation = "document", "Rejecting request: API token not configured");
            return Err(ApiError::not_configured());
        }
        request.validate().map_err(ApiError::bad_request)?;

        tracing::info!(doc_id = %request.doc_id, params = request.params.len(), "Forwarding document fetch");

        let body = self
            .api
            .document(&request)
            .await
            .map_err(|e| self.fail(Operation::Document, e))?;
        let upstream: UpstreamDocument =
            decode(body).map_err(|e| self.fail(Operation::Document, e))?;

        Ok(DocumentRecord::normalize(upstream, &request))
    }

    fn fail(&self, op: Operation, err: UpstreamError) -> ApiError {
        let api_error = ApiError::from_upstream(err.clone(), op, self.expose_details);
        tracing::error!(
            operation = ?op,
            upstream = self.api.name(),
            status = api_error.status,
            error = %err,
            detail = ?err,
            "Upstream call failed"
        );
        api_error
    }
}

/// Read an upstream object through its wire schema
fn decode<T: DeserializeOwned>(body: JsonObject) -> Result<T, UpstreamError> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| UpstreamError::InvalidFormat(format!("unexpected shape: {}", e)))
}
