//! Types shared by catalog clients and the search lifecycle.

use serde::{Deserialize, Serialize};

/// A movie as returned in catalog listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
}

impl MovieSummary {
    /// Release year, parsed from the `YYYY-MM-DD` release date.
    pub fn year(&self) -> Option<u32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }

    /// Full poster URL for the given image base, if the movie has a poster.
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| {
                format!(
                    "{}/{}",
                    image_base_url.trim_end_matches('/'),
                    p.trim_start_matches('/')
                )
            })
    }
}

/// What to ask the catalog for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogRequest {
    /// Default listing, most popular first.
    Discover,
    /// Free-text title search.
    Search { query: String },
}

impl CatalogRequest {
    /// Pick the endpoint for a search term: empty means the popular listing.
    pub fn for_term(term: &str) -> Self {
        if term.is_empty() {
            Self::Discover
        } else {
            Self::Search {
                query: term.to_string(),
            }
        }
    }

    /// Label used in logs and metrics.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Search { .. } => "search",
        }
    }
}

/// Outcome of a successful (2xx) catalog round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum MovieListing {
    /// The result list, possibly empty.
    Results(Vec<MovieSummary>),
    /// The payload itself signalled an error.
    Rejected { message: Option<String> },
}

/// Raw listing payload. Besides the regular `{ results: [...] }` shape it
/// recognises two error shapes: `{"Response": "error", "error": "..."}` and
/// TMDB's own `{"success": false, "status_message": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ListingPayload {
    #[serde(default)]
    pub results: Option<Vec<MovieSummary>>,
    #[serde(default, rename = "Response")]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status_message: Option<String>,
}

impl ListingPayload {
    fn is_error(&self) -> bool {
        let flagged = self
            .response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("error"));
        flagged || self.success == Some(false)
    }
}

impl From<ListingPayload> for MovieListing {
    fn from(payload: ListingPayload) -> Self {
        if payload.is_error() {
            let message = payload
                .error
                .or(payload.status_message)
                .filter(|m| !m.trim().is_empty());
            return MovieListing::Rejected { message };
        }
        MovieListing::Results(payload.results.unwrap_or_default())
    }
}
