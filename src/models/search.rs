//! Search request and response models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::{Citation, DocId};
use super::lenient;

/// Default zero-based page number
pub const DEFAULT_PAGE: u32 = 0;

/// Default number of related citations per hit
pub const DEFAULT_MAX_CITES: u32 = 5;

/// Optional search filters understood by the upstream search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Comma-separated document types (e.g. "supremecourt,delhi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctypes: Option<String>,

    /// Lower date bound, DD-MM-YYYY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fromdate: Option<String>,

    /// Upper date bound, DD-MM-YYYY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cite: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bench: Option<String>,
}

impl SearchFilters {
    /// Whether no filter is set
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }

    /// Set filters as upstream query parameters, in a fixed order
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        [
            ("doctypes", &self.doctypes),
            ("fromdate", &self.fromdate),
            ("todate", &self.todate),
            ("title", &self.title),
            ("cite", &self.cite),
            ("author", &self.author),
            ("bench", &self.bench),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query, echoed back as `encodedformInput`
    pub query: String,

    /// Zero-based page number
    pub page: u32,

    /// Maximum related citations per hit
    pub max_cites: u32,

    /// Optional filters
    pub filters: SearchFilters,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: DEFAULT_PAGE,
            max_cites: DEFAULT_MAX_CITES,
            filters: SearchFilters::default(),
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the page number
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the maximum citation count
    pub fn max_cites(mut self, max_cites: u32) -> Self {
        self.max_cites = max_cites;
        self
    }

    /// Replace the filter set
    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Reject queries that must not be forwarded
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("formInput is required".to_string());
        }
        Ok(())
    }

    /// Upstream query parameters: `formInput`, `pagenum`, `maxcites`, then filters
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("formInput", self.query.clone()),
            ("pagenum", self.page.to_string()),
            ("maxcites", self.max_cites.to_string()),
        ];
        params.extend(self.filters.to_params());
        params
    }
}

/// A single search hit.
///
/// Upstream hits carry more fields than are listed here, and the listed ones are not
/// always well typed. Anything unknown or mistyped is kept in `extra` and written
/// back out unchanged, so one odd hit never fails the whole result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct SearchDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<DocId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HTML snippet around the match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docsource: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishdate: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_encoded: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorid: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bench: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cites: Option<Vec<Citation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctype: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for SearchDoc {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            tid: lenient::take(&mut map, "tid"),
            title: lenient::take(&mut map, "title"),
            headline: lenient::take(&mut map, "headline"),
            docsource: lenient::take(&mut map, "docsource"),
            publishdate: lenient::take(&mut map, "publishdate"),
            author: lenient::take(&mut map, "author"),
            author_encoded: lenient::take(&mut map, "authorEncoded"),
            authorid: lenient::take(&mut map, "authorid"),
            bench: lenient::take(&mut map, "bench"),
            cites: lenient::take(&mut map, "cites"),
            doctype: lenient::take(&mut map, "doctype"),
            extra: map,
        }
    }
}

/// Search response as sent by the upstream API. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamSearchResponse {
    #[serde(default)]
    pub docs: Option<Vec<SearchDoc>>,

    #[serde(default)]
    pub categories: Option<Vec<Value>>,

    #[serde(default)]
    pub found: Option<Value>,
}

/// Normalized search response returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub docs: Vec<SearchDoc>,

    /// Category facets, `[name, [{formInput, value}, ...]]` pairs
    pub categories: Vec<Value>,

    /// Hit count; upstream sends either a number or a text range
    pub found: Value,

    #[serde(rename = "encodedformInput")]
    pub encoded_form_input: String,
}

impl SearchResultSet {
    /// Fill defaults for absent upstream fields and echo the query text
    pub fn normalize(upstream: UpstreamSearchResponse, query: &SearchQuery) -> Self {
        Self {
            docs: upstream.docs.unwrap_or_default(),
            categories: upstream.categories.unwrap_or_default(),
            found: match upstream.found {
                None | Some(Value::Null) | Some(Value::Bool(false)) => Value::from(0),
                Some(Value::String(text)) if text.is_empty() => Value::from(0),
                Some(found) => found,
            },
            encoded_form_input: query.query.clone(),
        }
    }
}
