//! Mock upstream for testing purposes.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::models::{DocumentRequest, SearchQuery};
use crate::upstream::{require_object, CaseLawApi, JsonObject, UpstreamError};

type Reply = Result<Value, UpstreamError>;

/// An in-memory upstream that returns scripted replies and counts calls.
///
/// Unscripted calls succeed with an empty object. Replies are JSON values rather
/// than objects so tests can script `null` or arrays and see them rejected.
#[derive(Debug)]
pub struct MockCaseLawApi {
    configured: bool,
    search_reply: Mutex<Option<Reply>>,
    document_reply: Mutex<Option<Reply>>,
    search_calls: AtomicUsize,
    document_calls: AtomicUsize,
    last_search: Mutex<Option<SearchQuery>>,
    last_document: Mutex<Option<DocumentRequest>>,
}

impl Default for MockCaseLawApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCaseLawApi {
    /// Create a configured mock upstream.
    pub fn new() -> Self {
        Self {
            configured: true,
            search_reply: Mutex::new(None),
            document_reply: Mutex::new(None),
            search_calls: AtomicUsize::new(0),
            document_calls: AtomicUsize::new(0),
            last_search: Mutex::new(None),
            last_document: Mutex::new(None),
        }
    }

    /// Create a mock upstream with no credential.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Set the search reply to return.
    pub fn set_search_reply(&self, reply: Reply) {
        *self
            .search_reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reply);
    }

    /// Set the document reply to return.
    pub fn set_document_reply(&self, reply: Reply) {
        *self
            .document_reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reply);
    }

    /// Number of searches that reached the upstream.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of document fetches that reached the upstream.
    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    /// The most recent search forwarded upstream.
    pub fn last_search(&self) -> Option<SearchQuery> {
        self.last_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent document request forwarded upstream.
    pub fn last_document(&self) -> Option<DocumentRequest> {
        self.last_document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn reply(slot: &Mutex<Option<Reply>>) -> Result<JsonObject, UpstreamError> {
        let scripted = slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match scripted {
            Some(reply) => require_object(reply?),
            None => Ok(JsonObject::new()),
        }
    }
}

#[async_trait]
impl CaseLawApi for MockCaseLawApi {
    fn name(&self) -> &str {
        "Mock Upstream"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search(&self, query: &SearchQuery) -> Result<JsonObject, UpstreamError> {
        if !self.configured {
            return Err(UpstreamError::NotConfigured);
        }
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(query.clone());
        Self::reply(&self.search_reply)
    }

    async fn document(&self, request: &DocumentRequest) -> Result<JsonObject, UpstreamError> {
        if !self.configured {
            return Err(UpstreamError::NotConfigured);
        }
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_document
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(request.clone());
        Self::reply(&self.document_reply)
    }
}
