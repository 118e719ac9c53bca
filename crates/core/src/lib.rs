pub mod catalog;
pub mod config;
pub mod metrics;
pub mod search;
pub mod testing;
pub mod trending;

pub use catalog::{
    CatalogError, CatalogRequest, MovieCatalog, MovieListing, MovieSummary, TmdbClient,
    TmdbConfig,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig, SearchConfig,
};
pub use search::{
    FetchOutcome, FetchTicket, MovieCard, QueryLifecycle, RequestState, SearchSession,
    SearchSnapshot, SearchView, SessionError, SessionHandle, TrendingCard,
};
pub use trending::{
    create_report_system, ReportWriter, SearchReport, SearchReporter, SqliteTrendingStore,
    TrendingEntry, TrendingError, TrendingStore,
};
