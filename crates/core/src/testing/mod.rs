//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the catalog and trending
//! store traits, so search sessions and the server can be exercised without
//! TMDB or a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use marquee_core::testing::{fixtures, MockMovieCatalog, MockTrendingStore};
//!
//! let catalog = MockMovieCatalog::new();
//! catalog.set_results("batman", vec![fixtures::movie(268, "Batman")]);
//!
//! let store = MockTrendingStore::new();
//! store.set_fail_reads(true);
//! ```

mod mock_catalog;
mod mock_trending_store;

pub use mock_catalog::{MockCatalogOutcome, MockMovieCatalog};
pub use mock_trending_store::MockTrendingStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::catalog::MovieSummary;
    use crate::trending::TrendingEntry;

    /// A movie with reasonable defaults; the poster path is `/{id}.jpg`.
    pub fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/{}.jpg", id)),
            popularity: Some(100.0),
            vote_average: Some(7.5),
            release_date: Some("2005-06-10".to_string()),
            original_language: Some("en".to_string()),
        }
    }

    /// `count` numbered movies titled "{prefix} {n}".
    pub fn movies(prefix: &str, count: u64) -> Vec<MovieSummary> {
        (1..=count)
            .map(|n| movie(n, &format!("{} {}", prefix, n)))
            .collect()
    }

    /// A trending entry for the given term and count.
    pub fn trending_entry(term: &str, count: u64) -> TrendingEntry {
        TrendingEntry {
            id: format!("entry-{}", term),
            search_term: term.to_string(),
            count,
            movie_id: 1,
            title: term.to_string(),
            poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", term)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
