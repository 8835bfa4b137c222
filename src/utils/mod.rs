//! Utility modules.
//!
//! - [`HttpClient`]: shared outbound HTTP client with the upstream's fixed headers

mod http;

pub use http::HttpClient;
