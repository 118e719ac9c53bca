//! Query lifecycle state machine.
//!
//! Pure and synchronous: the caller performs the catalog request for each
//! [`FetchTicket`] and feeds the result back through
//! [`QueryLifecycle::complete_fetch`]. Only the most recently issued ticket
//! is ever applied, so a slow response can never overwrite a newer one.

use tracing::{debug, warn};

use super::types::{
    FetchOutcome, FetchTicket, RequestState, SearchSnapshot, GENERIC_FETCH_ERROR,
    REJECTED_FALLBACK_ERROR,
};
use crate::catalog::{CatalogError, CatalogRequest, MovieListing, MovieSummary};
use crate::metrics::{DEBOUNCE_COMMITS, STALE_RESPONSES};
use crate::trending::{SearchReport, TrendingEntry};

#[derive(Debug, Default)]
pub struct QueryLifecycle {
    search_term: String,
    debounced_term: String,
    request: RequestState,
    movies: Vec<MovieSummary>,
    last_request_id: u64,
    outstanding: Option<u64>,
}

impl QueryLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn debounced_term(&self) -> &str {
        &self.debounced_term
    }

    pub fn request(&self) -> &RequestState {
        &self.request
    }

    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    /// Record raw input. No request is made until the term settles.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Initial fetch for the current debounced term (empty at start).
    pub fn mount(&mut self) -> FetchTicket {
        self.begin_fetch(self.debounced_term.clone())
    }

    /// Commit a settled term. Starts a fetch only if the value changed.
    pub fn commit_debounced(&mut self, term: impl Into<String>) -> Option<FetchTicket> {
        let term = term.into();
        if term == self.debounced_term {
            debug!("Debounced term unchanged ('{}'), no fetch", term);
            return None;
        }

        DEBOUNCE_COMMITS.inc();
        self.debounced_term = term.clone();
        Some(self.begin_fetch(term))
    }

    /// Start a fetch for `term`: enter Loading, clearing any previous error.
    pub fn begin_fetch(&mut self, term: impl Into<String>) -> FetchTicket {
        let term = term.into();
        self.last_request_id += 1;
        self.outstanding = Some(self.last_request_id);
        self.request = RequestState::Loading;

        FetchTicket {
            request_id: self.last_request_id,
            request: CatalogRequest::for_term(&term),
            term,
        }
    }

    /// Apply the result of a ticket's catalog request.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<MovieListing, CatalogError>,
    ) -> FetchOutcome {
        if self.outstanding != Some(ticket.request_id) {
            STALE_RESPONSES.inc();
            debug!(
                "Discarding stale response #{} for '{}'",
                ticket.request_id, ticket.term
            );
            return FetchOutcome::Discarded;
        }
        self.outstanding = None;

        let report = match result {
            Err(e) => {
                // Keep the previous movie list; only the message changes
                warn!(
                    "Error fetching movies for '{}' (#{}): {}",
                    ticket.term, ticket.request_id, e
                );
                self.request = RequestState::Error {
                    message: GENERIC_FETCH_ERROR.to_string(),
                };
                None
            }
            Ok(MovieListing::Rejected { message }) => {
                warn!(
                    "Catalog rejected request for '{}': {}",
                    ticket.term,
                    message.as_deref().unwrap_or("<no message>")
                );
                self.request = RequestState::Error {
                    message: message.unwrap_or_else(|| REJECTED_FALLBACK_ERROR.to_string()),
                };
                self.movies.clear();
                None
            }
            Ok(MovieListing::Results(movies)) => {
                debug!(
                    "Fetched {} movies for '{}' (#{})",
                    movies.len(),
                    ticket.term,
                    ticket.request_id
                );
                self.request = RequestState::Success {
                    results: movies.len(),
                };
                self.movies = movies;

                match self.movies.first() {
                    Some(top) if !ticket.term.is_empty() => Some(SearchReport {
                        term: ticket.term.clone(),
                        movie: top.clone(),
                    }),
                    _ => None,
                }
            }
        };

        FetchOutcome::Applied { report }
    }

    /// Current state, together with the session's trending list.
    pub fn snapshot(&self, trending: &[TrendingEntry]) -> SearchSnapshot {
        SearchSnapshot {
            search_term: self.search_term.clone(),
            debounced_term: self.debounced_term.clone(),
            request: self.request.clone(),
            movies: self.movies.clone(),
            trending: trending.to_vec(),
        }
    }
}
