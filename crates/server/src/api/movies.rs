//! One-shot movie search.
//!
//! Runs a single lifecycle fetch cycle for the requested term, without
//! debouncing. Clients that type interactively use the WebSocket session.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use marquee_core::{FetchOutcome, QueryLifecycle, SearchView, TrendingEntry};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MoviesQueryParams {
    #[serde(default)]
    pub query: String,
}

/// GET /api/v1/movies
///
/// Always 200: fetch failures travel as the view's `error_message`.
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MoviesQueryParams>,
) -> Json<SearchView> {
    let mut lifecycle = QueryLifecycle::new();
    lifecycle.set_search_term(params.query.clone());

    let ticket = match lifecycle.commit_debounced(params.query) {
        Some(ticket) => ticket,
        None => lifecycle.mount(),
    };

    let result = state.catalog().fetch(&ticket.request).await;
    if let FetchOutcome::Applied {
        report: Some(report),
    } = lifecycle.complete_fetch(&ticket, result)
    {
        if let Some(reporter) = state.reporter() {
            reporter.report(report);
        }
    }

    let trending = load_trending(&state).await;
    let snapshot = lifecycle.snapshot(&trending);

    Json(SearchView::from_snapshot(&snapshot, state.image_base_url()))
}

/// Trending entries for the view. Failures only cost the trending list.
async fn load_trending(state: &AppState) -> Vec<TrendingEntry> {
    let store = state.trending_store();
    let limit = state.search_config().trending_limit;

    match tokio::task::spawn_blocking(move || store.top_searches(limit)).await {
        Ok(Ok(entries)) => entries,
        Ok(Err(e)) => {
            warn!("Failed to load trending searches: {}", e);
            Vec::new()
        }
        Err(e) => {
            warn!("Trending lookup task failed: {}", e);
            Vec::new()
        }
    }
}
