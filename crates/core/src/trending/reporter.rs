//! Fire-and-forget reporting of successful searches.
//!
//! The search lifecycle hands reports to a [`SearchReporter`] and moves on;
//! a [`ReportWriter`] task drains them into the [`TrendingStore`]. Failures
//! are logged on the writer side and never reach the search state.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{SearchHit, TrendingStore};
use crate::catalog::MovieSummary;
use crate::metrics::SEARCH_REPORTS;

/// A search worth counting: the term the user typed and its top result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub term: String,
    pub movie: MovieSummary,
}

/// Handle for reporting searches.
///
/// Cheaply cloneable; every session holds one.
#[derive(Clone)]
pub struct SearchReporter {
    tx: mpsc::Sender<SearchReport>,
}

impl SearchReporter {
    /// Create a new reporter from a channel sender
    pub fn new(tx: mpsc::Sender<SearchReport>) -> Self {
        Self { tx }
    }

    /// Hand a report to the writer without waiting.
    ///
    /// Returns true if the report was queued. A full or closed channel is
    /// logged and the report dropped.
    pub fn report(&self, report: SearchReport) -> bool {
        match self.tx.try_send(report) {
            Ok(()) => true,
            Err(e) => {
                SEARCH_REPORTS.with_label_values(&["dropped"]).inc();
                tracing::error!("Failed to queue search report: {}", e);
                false
            }
        }
    }
}

/// Background task that receives search reports and records them.
pub struct ReportWriter {
    rx: mpsc::Receiver<SearchReport>,
    store: Arc<dyn TrendingStore>,
    image_base_url: String,
}

impl ReportWriter {
    /// Create a new report writer
    pub fn new(
        rx: mpsc::Receiver<SearchReport>,
        store: Arc<dyn TrendingStore>,
        image_base_url: impl Into<String>,
    ) -> Self {
        Self {
            rx,
            store,
            image_base_url: image_base_url.into(),
        }
    }

    /// Run the writer, consuming reports until every reporter is dropped
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Search report writer started");

        while let Some(report) = self.rx.recv().await {
            let hit = SearchHit::from_movie(&report.movie, &self.image_base_url);

            match self.store.record_search(&report.term, &hit) {
                Ok(entry) => {
                    SEARCH_REPORTS.with_label_values(&["recorded"]).inc();
                    tracing::debug!(
                        "Recorded search '{}' (count {})",
                        entry.search_term,
                        entry.count
                    );
                }
                Err(e) => {
                    SEARCH_REPORTS.with_label_values(&["failed"]).inc();
                    tracing::error!("Failed to record search '{}': {}", report.term, e);
                }
            }
        }

        tracing::info!("Search report writer shutting down");
    }
}

/// Create a complete reporting system
///
/// Returns:
/// - `SearchReporter` - for queueing reports (clone this to share across sessions)
/// - `ReportWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
pub fn create_report_system(
    store: Arc<dyn TrendingStore>,
    image_base_url: impl Into<String>,
    buffer_size: usize,
) -> (SearchReporter, ReportWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (
        SearchReporter::new(tx),
        ReportWriter::new(rx, store, image_base_url),
    )
}
