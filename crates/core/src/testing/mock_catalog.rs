//! Mock movie catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::catalog::{CatalogError, CatalogRequest, MovieCatalog, MovieListing, MovieSummary};

/// Scripted outcome of a catalog request.
///
/// `CatalogError` is not `Clone`, so failures are described here and turned
/// into a fresh error on every request.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCatalogOutcome {
    Listing(MovieListing),
    /// Non-success HTTP status.
    Status(u16),
    /// Body that fails to decode.
    Malformed,
}

impl MockCatalogOutcome {
    fn to_result(&self) -> Result<MovieListing, CatalogError> {
        match self {
            Self::Listing(listing) => Ok(listing.clone()),
            Self::Status(status) => Err(CatalogError::Status {
                status: *status,
                body: "mock failure".to_string(),
            }),
            Self::Malformed => Err(CatalogError::Parse("mock malformed body".to_string())),
        }
    }
}

/// Mock implementation of the MovieCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Scripted outcome per request (unscripted requests return no results)
/// - Per-request response delays (honours paused tokio time)
/// - Recorded requests for assertions
/// - One-shot error injection
#[derive(Debug, Default)]
pub struct MockMovieCatalog {
    outcomes: Mutex<HashMap<CatalogRequest, MockCatalogOutcome>>,
    delays: Mutex<HashMap<CatalogRequest, Duration>>,
    requests: Mutex<Vec<CatalogRequest>>,
    next_error: Mutex<Option<CatalogError>>,
}

impl MockMovieCatalog {
    /// Create a new mock catalog with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Script the outcome for a search term ("" is the popular listing).
    pub fn set_outcome(&self, term: &str, outcome: MockCatalogOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(CatalogRequest::for_term(term), outcome);
    }

    /// Script a result list for a search term.
    pub fn set_results(&self, term: &str, movies: Vec<MovieSummary>) {
        self.set_outcome(term, MockCatalogOutcome::Listing(MovieListing::Results(movies)));
    }

    /// Script an application-level error payload for a search term.
    pub fn set_rejected(&self, term: &str, message: Option<&str>) {
        self.set_outcome(
            term,
            MockCatalogOutcome::Listing(MovieListing::Rejected {
                message: message.map(String::from),
            }),
        );
    }

    /// Delay responses for a search term.
    pub fn set_delay(&self, term: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(CatalogRequest::for_term(term), delay);
    }

    /// Configure the next request to fail with the given error.
    pub fn set_next_error(&self, error: CatalogError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    // =========================================================================
    // Request Recording
    // =========================================================================

    /// Get all recorded requests, in arrival order.
    pub fn recorded_requests(&self) -> Vec<CatalogRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the number of requests received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Clear recorded requests.
    pub fn clear_recorded(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl MovieCatalog for MockMovieCatalog {
    async fn fetch(&self, request: &CatalogRequest) -> Result<MovieListing, CatalogError> {
        self.requests.lock().unwrap().push(request.clone());

        let delay = self.delays.lock().unwrap().get(request).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }

        let outcome = self.outcomes.lock().unwrap().get(request).cloned();
        match outcome {
            Some(outcome) => outcome.to_result(),
            None => Ok(MovieListing::Results(Vec::new())),
        }
    }
}
