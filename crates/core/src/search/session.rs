//! Per-client search session actor.
//!
//! A session owns a [`QueryLifecycle`] and a [`Debouncer`] and runs on its own
//! task. Keystrokes arrive through a [`SessionHandle`]; every state change is
//! published as a [`SearchSnapshot`] on a watch channel.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::debounce::{Debounced, Debouncer};
use super::lifecycle::QueryLifecycle;
use super::types::{FetchOutcome, FetchTicket, SearchSnapshot};
use crate::catalog::{CatalogError, MovieCatalog, MovieListing};
use crate::config::SearchConfig;
use crate::trending::{SearchReporter, TrendingEntry, TrendingError, TrendingStore};

/// Errors returned by a [`SessionHandle`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("search session closed")]
    Closed,
}

enum Command {
    SetSearchTerm(String),
    Shutdown,
}

enum SessionEvent {
    FetchCompleted {
        ticket: FetchTicket,
        result: Result<MovieListing, CatalogError>,
    },
    TrendingLoaded(Result<Vec<TrendingEntry>, TrendingError>),
}

/// Client side of a running session.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SearchSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Record raw input. The catalog is queried once the input settles.
    pub fn set_search_term(&self, term: impl Into<String>) -> Result<(), SessionError> {
        self.commands
            .send(Command::SetSearchTerm(term.into()))
            .map_err(|_| SessionError::Closed)
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    /// Stop the session and wait for its task to finish.
    ///
    /// Pending debounce timers and in-flight fetches are cancelled. Reports
    /// already handed to the reporter are unaffected.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            warn!("Search session task ended abnormally: {}", e);
        }
    }
}

/// A search session: debounced catalog queries plus the trending list.
pub struct SearchSession {
    lifecycle: QueryLifecycle,
    debouncer: Debouncer<String>,
    catalog: Arc<dyn MovieCatalog>,
    trending_store: Arc<dyn TrendingStore>,
    reporter: Option<SearchReporter>,
    trending_limit: u32,
    trending: Vec<TrendingEntry>,
    in_flight: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    state_tx: watch::Sender<SearchSnapshot>,
}

impl SearchSession {
    /// Start a session.
    ///
    /// The initial (discover) fetch and the trending load begin immediately.
    /// Must be called inside a tokio runtime.
    pub fn spawn(
        catalog: Arc<dyn MovieCatalog>,
        trending_store: Arc<dyn TrendingStore>,
        reporter: Option<SearchReporter>,
        config: &SearchConfig,
    ) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (debounce_tx, debounce_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchSnapshot::default());

        let session = Self {
            lifecycle: QueryLifecycle::new(),
            debouncer: Debouncer::new(config.debounce(), debounce_tx),
            catalog,
            trending_store,
            reporter,
            trending_limit: config.trending_limit,
            trending: Vec::new(),
            in_flight: None,
            events_tx,
            state_tx,
        };

        let task = tokio::spawn(session.run(commands_rx, debounce_rx, events_rx));

        SessionHandle {
            commands: commands_tx,
            state: state_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut debounced: mpsc::UnboundedReceiver<Debounced<String>>,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        debug!("Search session started");
        self.mount();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::SetSearchTerm(term)) => self.on_search_term(term),
                    Some(Command::Shutdown) | None => break,
                },
                Some(fired) = debounced.recv() => {
                    if let Some(term) = self.debouncer.accept(fired) {
                        self.on_debounced(term);
                    }
                }
                Some(event) = events.recv() => self.on_event(event),
            }
        }

        self.debouncer.cancel();
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        debug!("Search session stopped");
    }

    fn mount(&mut self) {
        let ticket = self.lifecycle.mount();
        self.start_fetch(ticket);
        self.load_trending();
        self.publish();
    }

    fn on_search_term(&mut self, term: String) {
        self.lifecycle.set_search_term(term.clone());
        self.debouncer.push(term);
        self.publish();
    }

    fn on_debounced(&mut self, term: String) {
        if let Some(ticket) = self.lifecycle.commit_debounced(term) {
            self.start_fetch(ticket);
            self.publish();
        }
    }

    fn on_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::FetchCompleted { ticket, result } => {
                match self.lifecycle.complete_fetch(&ticket, result) {
                    FetchOutcome::Applied { report } => {
                        if let (Some(report), Some(reporter)) = (report, &self.reporter) {
                            reporter.report(report);
                        }
                        self.publish();
                    }
                    FetchOutcome::Discarded => {}
                }
            }
            SessionEvent::TrendingLoaded(Ok(entries)) => {
                debug!("Loaded {} trending searches", entries.len());
                self.trending = entries;
                self.publish();
            }
            SessionEvent::TrendingLoaded(Err(e)) => {
                // Not fatal: the session works without a trending list
                warn!("Failed to load trending searches: {}", e);
            }
        }
    }

    fn start_fetch(&mut self, ticket: FetchTicket) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        info!(
            "Fetching movies for '{}' (#{}, {})",
            ticket.term,
            ticket.request_id,
            ticket.request.endpoint()
        );

        let catalog = Arc::clone(&self.catalog);
        let events_tx = self.events_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = catalog.fetch(&ticket.request).await;
            let _ = events_tx.send(SessionEvent::FetchCompleted { ticket, result });
        }));
    }

    fn load_trending(&self) {
        let store = Arc::clone(&self.trending_store);
        let limit = self.trending_limit;
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || store.top_searches(limit))
                .await
                .unwrap_or_else(|e| Err(TrendingError::Database(e.to_string())));
            let _ = events_tx.send(SessionEvent::TrendingLoaded(result));
        });
    }

    fn publish(&self) {
        self.state_tx
            .send_replace(self.lifecycle.snapshot(&self.trending));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::catalog::CatalogRequest;
    use crate::search::RequestState;
    use crate::testing::{fixtures, MockMovieCatalog, MockTrendingStore};

    fn config() -> SearchConfig {
        SearchConfig {
            debounce_ms: 500,
            trending_limit: 5,
            report_buffer: 16,
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_mount_publishes_discover_results() {
        let catalog = Arc::new(MockMovieCatalog::new());
        catalog.set_results("", fixtures::movies("Popular", 3));
        let store = Arc::new(MockTrendingStore::new());

        let handle = SearchSession::spawn(catalog.clone(), store, None, &config());
        let mut rx = handle.subscribe();

        let snapshot = rx
            .wait_for(|s| matches!(s.request, RequestState::Success { .. }))
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.movies.len(), 3);
        assert_eq!(catalog.recorded_requests(), vec![CatalogRequest::Discover]);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_search_term_after_shutdown_fails() {
        let catalog = Arc::new(MockMovieCatalog::new());
        let store = Arc::new(MockTrendingStore::new());
        let handle = SearchSession::spawn(catalog, store, None, &config());

        let commands = handle.commands.clone();
        handle.shutdown().await;

        assert!(commands.send(Command::SetSearchTerm("x".to_string())).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_update_term_before_debounce() {
        let catalog = Arc::new(MockMovieCatalog::new());
        let store = Arc::new(MockTrendingStore::new());
        let handle = SearchSession::spawn(catalog.clone(), store, None, &config());
        settle().await;

        handle.set_search_term("b").unwrap();
        handle.set_search_term("ba").unwrap();
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.search_term, "ba");
        assert_eq!(snapshot.debounced_term, "");
        assert_eq!(catalog.request_count(), 1);

        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(handle.snapshot().debounced_term, "ba");
        assert_eq!(catalog.request_count(), 2);

        handle.shutdown().await;
    }
}
