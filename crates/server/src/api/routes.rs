use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, movies, trending, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // UI static files path (configurable via env)
    let ui_dir = std::env::var("UI_DIR").unwrap_or_else(|_| "ui/dist".to_string());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Movies (one-shot search)
        .route("/movies", get(movies::search_movies))
        // Trending searches
        .route("/trending", get(trending::list_trending))
        // Live search session
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    // Serve UI with SPA fallback
    let index_path = format!("{}/index.html", ui_dir);
    let serve_dir = ServeDir::new(&ui_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
