//! Recommendation pipeline services
//!
//! Leaf-first: `normalizer` turns model text into candidates,
//! `placeholder` generates fallback images, the catalog clients
//! (`tmdb_client`, `rawg_client`, `yelp_client`) wrap one external
//! search+detail flow each, and `orchestrator` ties everything behind a
//! single `get_recommendations` entry point.

pub mod chat_client;
pub mod normalizer;
pub mod orchestrator;
pub mod placeholder;
pub mod rawg_client;
pub mod tmdb_client;
pub mod yelp_client;

pub use orchestrator::Recommender;

use thiserror::Error;

const USER_AGENT: &str = "AppHub/0.1.0 (https://github.com/apphub/apphub)";

/// Catalog client errors
///
/// A zero-match search is not an error; clients return `Ok(None)` for
/// that. These variants cover genuine transport and provider failures,
/// which the orchestrator absorbs into fallback data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse provider response JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Build the shared outbound HTTP client
///
/// No request timeout is configured; the transport default governs
/// failure detection. Fresh results are a product requirement, so
/// requests add their own no-cache directives instead of relying on
/// intermediary behavior.
pub fn build_http_client() -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CatalogError::Network(e.to_string()))
}
