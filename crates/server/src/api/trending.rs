//! Trending searches API handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::error;

use marquee_core::TrendingCard;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Upper bound on `limit`.
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct TrendingQueryParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/v1/trending
///
/// Top searches, highest count first. `limit` defaults to the configured
/// trending limit.
pub async fn list_trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingQueryParams>,
) -> Result<Json<Vec<TrendingCard>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = match params.limit {
        Some(0) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "limit must be at least 1".to_string(),
                }),
            ))
        }
        Some(n) => n.min(MAX_LIMIT),
        None => state.search_config().trending_limit,
    };

    let store = state.trending_store();
    let result = tokio::task::spawn_blocking(move || store.top_searches(limit))
        .await
        .map_err(|e| e.to_string())
        .and_then(|r| r.map_err(|e| e.to_string()));

    match result {
        Ok(entries) => Ok(Json(TrendingCard::ranked(&entries))),
        Err(e) => {
            error!("Failed to list trending searches: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: e }),
            ))
        }
    }
}
