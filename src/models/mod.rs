//! Request and response models for the search and document operations.

mod document;
mod lenient;
mod search;

pub use document::{Citation, DocId, DocumentRecord, DocumentRequest, UpstreamDocument};
pub use search::{
    SearchDoc, SearchFilters, SearchQuery, SearchResultSet, UpstreamSearchResponse,
    DEFAULT_MAX_CITES, DEFAULT_PAGE,
};
