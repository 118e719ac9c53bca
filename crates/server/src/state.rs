use std::sync::Arc;

use marquee_core::{
    Config, MovieCatalog, SanitizedConfig, SearchConfig, SearchReporter, TrendingStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn MovieCatalog>,
    trending_store: Arc<dyn TrendingStore>,
    reporter: Option<SearchReporter>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn MovieCatalog>,
        trending_store: Arc<dyn TrendingStore>,
        reporter: Option<SearchReporter>,
    ) -> Self {
        Self {
            config,
            catalog,
            trending_store,
            reporter,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.config.search
    }

    pub fn image_base_url(&self) -> &str {
        self.config.tmdb.image_base_url()
    }

    pub fn catalog(&self) -> Arc<dyn MovieCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn trending_store(&self) -> Arc<dyn TrendingStore> {
        Arc::clone(&self.trending_store)
    }

    /// Reporter handed to every search; `None` disables trending updates.
    pub fn reporter(&self) -> Option<SearchReporter> {
        self.reporter.clone()
    }
}
