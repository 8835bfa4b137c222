//! Route handlers.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::gateway::ApiError;
use crate::models::{DocumentRequest, SearchFilters, SearchQuery, DEFAULT_MAX_CITES, DEFAULT_PAGE};
use crate::server::AppState;

type Pairs = Vec<(String, String)>;

/// `POST /api/search?formInput=..&pagenum=..&maxcites=..[&filters]`
pub(crate) async fn search(
    State(state): State<AppState>,
    params: Result<Query<Pairs>, QueryRejection>,
) -> Response {
    if !state.gateway.is_configured() {
        return ApiError::not_configured().into_response();
    }

    let query = match params
        .map_err(|e| ApiError::bad_request(e.body_text()))
        .and_then(|Query(pairs)| search_query_from_pairs(&pairs))
    {
        Ok(query) => query,
        Err(err) => return err.into_response(),
    };

    match state.gateway.search(query).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `POST /api/doc/:doc_id?<params forwarded verbatim>`
pub(crate) async fn document(
    State(state): State<AppState>,
    doc_id: Result<Path<String>, PathRejection>,
    params: Result<Query<Pairs>, QueryRejection>,
) -> Response {
    let doc_id = match doc_id {
        Ok(Path(doc_id)) => doc_id,
        Err(e) => return ApiError::bad_request(e.body_text()).into_response(),
    };
    let pairs = match params {
        Ok(Query(pairs)) => pairs,
        Err(e) => return ApiError::bad_request(e.body_text()).into_response(),
    };

    let request = DocumentRequest::new(doc_id).params(pairs);
    match state.gateway.document(request).await {
        Ok(record) => Json(record).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `GET /health`
pub(crate) async fn health(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "upstream": state.gateway.upstream_name(),
        "upstream_configured": state.gateway.is_configured(),
    }))
    .into_response()
}

/// Unknown routes
pub(crate) async fn not_found() -> Response {
    ApiError::new(404, "Not found").into_response()
}

/// Build a search from inbound query pairs. Empty numeric values take their defaults.
pub(crate) fn search_query_from_pairs(pairs: &[(String, String)]) -> Result<SearchQuery, ApiError> {
    let get = |key: &str| {
        pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let page = parse_count(get("pagenum"), "pagenum", DEFAULT_PAGE)?;
    let max_cites = parse_count(get("maxcites"), "maxcites", DEFAULT_MAX_CITES)?;

    let filters = SearchFilters {
        doctypes: get("doctypes"),
        fromdate: get("fromdate"),
        todate: get("todate"),
        title: get("title"),
        cite: get("cite"),
        author: get("author"),
        bench: get("bench"),
    };

    Ok(SearchQuery::new(get("formInput").unwrap_or_default())
        .page(page)
        .max_cites(max_cites)
        .filters(filters))
}

fn parse_count(value: Option<String>, name: &str, default: u32) -> Result<u32, ApiError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            ApiError::bad_request(format!(
                "{} must be a non-negative integer, got '{}'",
                name, raw
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Pairs {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_search_defaults() {
        let query = search_query_from_pairs(&pairs(&[("formInput", "murder")])).unwrap();
        assert_eq!(query, SearchQuery::new("murder"));
    }

    #[test]
    fn test_search_empty_numbers_use_defaults() {
        let query = search_query_from_pairs(&pairs(&[
            ("formInput", "murder"),
            ("pagenum", ""),
            ("maxcites", ""),
        ]))
        .unwrap();
        assert_eq!(query.page, 0);
        assert_eq!(query.max_cites, 5);
    }

    #[test]
    fn test_search_with_filters() {
        let query = search_query_from_pairs(&pairs(&[
            ("formInput", "bail"),
            ("pagenum", "3"),
            ("maxcites", "10"),
            ("doctypes", "supremecourt"),
            ("fromdate", "1-1-2010"),
            ("unknown", "ignored"),
        ]))
        .unwrap();
        assert_eq!(query.page, 3);
        assert_eq!(query.max_cites, 10);
        assert_eq!(query.filters.doctypes.as_deref(), Some("supremecourt"));
        assert_eq!(query.filters.fromdate.as_deref(), Some("1-1-2010"));
        assert!(query.filters.author.is_none());
    }

    #[test]
    fn test_search_rejects_negative_page() {
        let err = search_query_from_pairs(&pairs(&[("formInput", "x"), ("pagenum", "-1")]))
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.message.contains("pagenum"));
    }
}
