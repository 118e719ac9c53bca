//! Trending searches - which search terms led users to a movie.
//!
//! Every successful user search reports its top result here. The store keeps
//! one entry per normalized term and counts repeats; sessions read back the
//! top entries once when they start.

mod reporter;
mod sqlite;
mod types;

pub use reporter::{create_report_system, ReportWriter, SearchReport, SearchReporter};
pub use sqlite::SqliteTrendingStore;
pub use types::*;

/// Trait for trending search storage.
pub trait TrendingStore: Send + Sync {
    /// Record one search that produced `hit` as its top result.
    ///
    /// Creates the entry with count 1 on first sight of the normalized term,
    /// otherwise increments the count. Returns the entry as stored.
    fn record_search(&self, term: &str, hit: &SearchHit) -> Result<TrendingEntry, TrendingError>;

    /// Top entries by count, highest first. Ties go to the most recently updated.
    fn top_searches(&self, limit: u32) -> Result<Vec<TrendingEntry>, TrendingError>;
}

/// Normalize a search term for use as the trending key.
///
/// Trims, collapses inner whitespace and lowercases, so "  The  Matrix"
/// and "the matrix" count as the same search.
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
