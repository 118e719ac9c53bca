//! Types for trending search storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MovieSummary;

/// One trending search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    /// Entry ID (UUID).
    pub id: String,
    /// Normalized search term.
    pub search_term: String,
    /// Number of searches recorded for this term.
    pub count: u64,
    /// Catalog ID of the movie the first search surfaced.
    pub movie_id: u64,
    /// Title of that movie.
    pub title: String,
    /// Poster of that movie, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The movie a search surfaced, as captured by the trending store.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub movie_id: u64,
    pub title: String,
    pub poster_url: Option<String>,
}

impl SearchHit {
    pub fn from_movie(movie: &MovieSummary, image_base_url: &str) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_url: movie.poster_url(image_base_url),
        }
    }
}

/// Errors for trending store operations.
#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid search term: {0:?}")]
    InvalidTerm(String),
}
