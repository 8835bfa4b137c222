//! Document request and record models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::lenient;

/// Upstream document identifier.
///
/// The upstream API emits numeric ids in search hits and citation lists, while
/// clients address documents through a path segment. Both forms round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Number(i64),
    Text(String),
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Number(n) => write!(f, "{}", n),
            DocId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A citation edge to another document. Mistyped fields stay raw in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Citation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tid: Option<DocId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for Citation {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            tid: lenient::take(&mut map, "tid"),
            title: lenient::take(&mut map, "title"),
            extra: map,
        }
    }
}

/// Request for a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    /// Document identifier, taken from the request path
    pub doc_id: String,

    /// Query parameters forwarded verbatim, in arrival order
    pub params: Vec<(String, String)>,
}

impl DocumentRequest {
    /// Create a new document request without parameters
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            params: Vec::new(),
        }
    }

    /// Attach client-supplied query parameters
    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// Set the maximum number of outbound citations
    pub fn max_cites(self, max: u32) -> Self {
        self.param("maxcites", max.to_string())
    }

    /// Set the maximum number of inbound (cited-by) citations
    pub fn max_cited_by(self, max: u32) -> Self {
        self.param("maxcitedby", max.to_string())
    }

    fn param(mut self, key: &str, value: String) -> Self {
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
        self
    }

    /// Reject identifiers that cannot address an upstream document
    pub fn validate(&self) -> Result<(), String> {
        if self.doc_id.trim().is_empty() {
            return Err("docId is required".to_string());
        }
        Ok(())
    }
}

/// Document as sent by the upstream API. Every field may be absent.
///
/// Scalar `doc`/`title` values of the wrong type are rendered as text; only a
/// citation list that is not an array makes the body unusable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct UpstreamDocument {
    pub doc: Option<String>,
    pub title: Option<String>,
    pub cite_list: Option<Vec<Citation>>,
    pub citedby_list: Option<Vec<Citation>>,
}

impl TryFrom<Map<String, Value>> for UpstreamDocument {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            doc: scalar_text(map.remove("doc")),
            title: scalar_text(map.remove("title")),
            cite_list: citation_list(map.remove("citeList"), "citeList")?,
            citedby_list: citation_list(map.remove("citedbyList"), "citedbyList")?,
        })
    }
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn citation_list(value: Option<Value>, key: &str) -> Result<Option<Vec<Citation>>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(list @ Value::Array(_)) => serde_json::from_value(list)
            .map(Some)
            .map_err(|e| format!("{}: {}", key, e)),
        Some(_) => Err(format!("{} is not an array", key)),
    }
}

/// Normalized document returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Full document body (HTML)
    pub doc: String,

    /// Identifier echoed from the request
    pub tid: String,

    pub title: String,

    pub cite_list: Vec<Citation>,

    pub citedby_list: Vec<Citation>,
}

impl DocumentRecord {
    /// Fill defaults for absent upstream fields and echo the requested id
    pub fn normalize(upstream: UpstreamDocument, request: &DocumentRequest) -> Self {
        Self {
            doc: upstream.doc.unwrap_or_default(),
            tid: request.doc_id.clone(),
            title: upstream.title.unwrap_or_default(),
            cite_list: upstream.cite_list.unwrap_or_default(),
            citedby_list: upstream.citedby_list.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doc_id_accepts_both_forms() {
        let ids: Vec<DocId> = serde_json::from_value(json!([42, "abc"])).unwrap();
        assert_eq!(ids, vec![DocId::Number(42), DocId::Text("abc".to_string())]);
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!([42, "abc"]));
        assert_eq!(ids[0].to_string(), "42");
    }

    #[test]
    fn test_request_param_setters() {
        let request = DocumentRequest::new("1560742")
            .max_cites(3)
            .max_cited_by(4)
            .max_cites(6);
        assert_eq!(
            request.params,
            vec![
                ("maxcites".to_string(), "6".to_string()),
                ("maxcitedby".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_empty_id() {
        assert!(DocumentRequest::new(" ").validate().is_err());
        assert!(DocumentRequest::new("1560742").validate().is_ok());
    }

    #[test]
    fn test_normalize_defaults_citation_lists() {
        let upstream: UpstreamDocument =
            serde_json::from_value(json!({"doc": "<p>text</p>", "title": "A v. B"})).unwrap();
        let record = DocumentRecord::normalize(upstream, &DocumentRequest::new("77"));

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "doc": "<p>text</p>",
                "tid": "77",
                "title": "A v. B",
                "citeList": [],
                "citedbyList": []
            })
        );
    }

    #[test]
    fn test_normalize_keeps_citations() {
        let upstream: UpstreamDocument = serde_json::from_value(json!({
            "doc": "body",
            "title": "T",
            "citeList": [{"tid": 1, "title": "Cited"}],
            "citedbyList": [{"tid": "2", "title": "Citing", "docsource": "Delhi High Court"}]
        }))
        .unwrap();
        let record = DocumentRecord::normalize(upstream, &DocumentRequest::new("9"));

        assert_eq!(record.cite_list.len(), 1);
        assert_eq!(record.cite_list[0].tid, Some(DocId::Number(1)));
        assert_eq!(
            record.citedby_list[0].extra.get("docsource"),
            Some(&json!("Delhi High Court"))
        );
    }

    #[test]
    fn test_loose_document_fields() {
        let upstream: UpstreamDocument = serde_json::from_value(json!({
            "doc": null,
            "title": 1999,
            "citeList": [{"title": "no tid"}, {"tid": 3.5, "title": ["odd"]}]
        }))
        .unwrap();
        let record = DocumentRecord::normalize(upstream, &DocumentRequest::new("9"));

        assert_eq!(record.doc, "");
        assert_eq!(record.title, "1999");
        assert_eq!(record.cite_list[0].tid, None);
        assert_eq!(
            serde_json::to_value(&record.cite_list).unwrap(),
            json!([{"title": "no tid"}, {"tid": 3.5, "title": ["odd"]}])
        );
    }

    #[test]
    fn test_non_array_citation_list_is_rejected() {
        let parsed = serde_json::from_value::<UpstreamDocument>(json!({"citeList": "none"}));
        assert!(parsed.is_err());
    }
}
