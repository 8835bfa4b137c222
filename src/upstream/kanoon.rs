//! Indian Kanoon API client.
//!
//! API documentation: https://api.indiankanoon.org/documentation/
//! Every endpoint is a POST with its arguments in the query string and an
//! `Authorization: Token <token>` header.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;

use crate::config::UpstreamConfig;
use crate::models::{DocumentRequest, SearchQuery};
use crate::upstream::{error_body, parse_object, CaseLawApi, JsonObject, UpstreamError};
use crate::utils::HttpClient;

/// Which response statuses an endpoint treats as success
#[derive(Debug, Clone, Copy)]
enum Accept {
    /// Exactly 200 OK
    Ok,
    /// Any 2xx
    Success,
}

impl Accept {
    fn allows(self, status: StatusCode) -> bool {
        match self {
            Accept::Ok => status == StatusCode::OK,
            Accept::Success => status.is_success(),
        }
    }
}

/// Case-law API client with credential injection
#[derive(Debug, Clone)]
pub struct KanoonClient {
    client: HttpClient,
    base_url: String,
    token: Option<String>,
    auth_scheme: String,
}

impl KanoonClient {
    /// Build a client from the upstream settings
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = HttpClient::new(config)
            .map_err(|e| UpstreamError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            auth_scheme: config.auth_scheme.clone(),
        })
    }

    /// Search endpoint URL
    pub fn search_url(&self) -> String {
        format!("{}/search/", self.base_url)
    }

    /// Document endpoint URL; the id is percent-encoded into a single path segment
    pub fn document_url(&self, doc_id: &str) -> String {
        format!("{}/doc/{}/", self.base_url, urlencoding::encode(doc_id))
    }

    async fn post<P>(
        &self,
        url: &str,
        params: &[P],
        accept: Accept,
    ) -> Result<JsonObject, UpstreamError>
    where
        P: serde::Serialize + Sync,
    {
        let token = self.token.as_deref().ok_or(UpstreamError::NotConfigured)?;

        tracing::debug!(method = "POST", url = %url, "Calling upstream");

        let response = self
            .client
            .client()
            .post(url)
            .query(params)
            .header(AUTHORIZATION, format!("{} {}", self.auth_scheme, token))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(method = "POST", url = %url, error = %e, "Upstream request failed");
                UpstreamError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !accept.allows(status) {
            tracing::warn!(
                method = "POST",
                url = %url,
                status = status.as_u16(),
                body = %text,
                "Upstream returned an error status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: error_body(&text),
            });
        }

        tracing::debug!(url = %url, status = status.as_u16(), bytes = text.len(), "Upstream replied");

        parse_object(&text).inspect_err(|e| {
            tracing::warn!(url = %url, error = ?e, "Upstream body rejected");
        })
    }
}

#[async_trait]
impl CaseLawApi for KanoonClient {
    fn name(&self) -> &str {
        "Indian Kanoon"
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn search(&self, query: &SearchQuery) -> Result<JsonObject, UpstreamError> {
        self.post(&self.search_url(), &query.to_params(), Accept::Ok)
            .await
    }

    async fn document(&self, request: &DocumentRequest) -> Result<JsonObject, UpstreamError> {
        self.post(
            &self.document_url(&request.doc_id),
            &request.params,
            Accept::Success,
        )
        .await
    }
}
