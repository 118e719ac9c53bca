//! Movie catalog integration (TMDB).
//!
//! The catalog is the only source of movie data. Requests are either the
//! default popularity listing or a free-text search; both resolve to a
//! [`MovieListing`].

mod tmdb;
mod types;

pub use tmdb::{TmdbClient, TmdbConfig, DEFAULT_BASE_URL, DEFAULT_IMAGE_BASE_URL};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the movie catalog.
///
/// All variants are treated as transport-level failures by the search
/// lifecycle; application-level rejections travel as
/// [`MovieListing::Rejected`] instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with a non-success status.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Trait for movie catalog clients.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch the listing for a request. One attempt, no retries.
    async fn fetch(&self, request: &CatalogRequest) -> Result<MovieListing, CatalogError>;
}
