//! # Caselaw Gateway
//!
//! A small proxy that sits between a browser front end and a case-law search API.
//! It keeps the API token on the server, forwards search and document requests
//! upstream, and returns responses in a shape-stable JSON contract.
//!
//! ## Architecture
//!
//! - [`models`]: Request/response types and their normalization
//! - [`upstream`]: The [`CaseLawApi`] trait and its HTTP client
//! - [`gateway`]: The two operations plus error mapping
//! - [`server`]: axum routes and middleware
//! - [`config`]: Configuration management
//! - [`utils`]: HTTP client construction

pub mod config;
pub mod gateway;
pub mod models;
pub mod server;
pub mod upstream;
pub mod utils;

// Re-export commonly used types
pub use gateway::{ApiError, Gateway};
pub use upstream::{CaseLawApi, KanoonClient, UpstreamError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
