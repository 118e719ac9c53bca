//! Types for the search lifecycle.

use serde::Serialize;

use crate::catalog::{CatalogRequest, MovieSummary};
use crate::trending::{SearchReport, TrendingEntry};

/// Message shown for any transport-level failure. Details only go to the log.
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch movies. Please try again later.";

/// Message shown when an error payload carries no message of its own.
pub const REJECTED_FALLBACK_ERROR: &str = "Failed to fetch movies";

/// State of the most recent catalog request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request succeeded with this many results.
    Success { results: usize },
    /// The last request failed; `message` is user-facing.
    Error { message: String },
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// A catalog request handed out by the lifecycle.
///
/// The completion must be fed back with the same ticket; only the most
/// recently issued ticket is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub request_id: u64,
    pub term: String,
    pub request: CatalogRequest,
}

/// What happened when a completion was fed back.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// State updated. `report` is set when the search should be counted.
    Applied { report: Option<SearchReport> },
    /// A newer request superseded this one; nothing changed.
    Discarded,
}

/// Everything a client needs to render a search session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchSnapshot {
    /// Raw input, updated on every keystroke.
    pub search_term: String,
    /// Settled input the current results belong to.
    pub debounced_term: String,
    pub request: RequestState,
    pub movies: Vec<MovieSummary>,
    pub trending: Vec<TrendingEntry>,
}

impl SearchSnapshot {
    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.request.error_message()
    }
}
