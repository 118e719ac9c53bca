//! Render-ready view models.
//!
//! Stateless projections of a [`SearchSnapshot`]; clients render them as-is.

use serde::Serialize;

use super::types::SearchSnapshot;
use crate::catalog::MovieSummary;
use crate::trending::TrendingEntry;

/// Poster shown for movies without one.
pub const PLACEHOLDER_POSTER: &str = "/no-movie.png";

const NOT_AVAILABLE: &str = "N/A";

/// One movie in the results grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub poster_url: String,
    pub rating: String,
    pub year: String,
    pub language: String,
}

impl MovieCard {
    pub fn from_summary(movie: &MovieSummary, image_base_url: &str) -> Self {
        // A zero vote average means "no votes yet"
        let rating = match movie.vote_average {
            Some(v) if v > 0.0 => format!("{:.1}", v),
            _ => NOT_AVAILABLE.to_string(),
        };

        let year = movie
            .release_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .and_then(|d| d.split('-').next())
            .unwrap_or(NOT_AVAILABLE)
            .to_string();

        let language = movie
            .original_language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string();

        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: movie
                .poster_url(image_base_url)
                .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
            rating,
            year,
            language,
        }
    }
}

/// One entry of the trending list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingCard {
    /// 1-based position.
    pub rank: usize,
    pub search_term: String,
    pub title: String,
    pub poster_url: String,
}

impl TrendingCard {
    /// Rank a list of entries, already sorted by popularity.
    pub fn ranked(entries: &[TrendingEntry]) -> Vec<Self> {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Self {
                rank: i + 1,
                search_term: entry.search_term.clone(),
                title: entry.title.clone(),
                poster_url: entry
                    .poster_url
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
            })
            .collect()
    }
}

/// Everything shown on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub search_term: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub movies: Vec<MovieCard>,
    pub trending: Vec<TrendingCard>,
}

impl SearchView {
    pub fn from_snapshot(snapshot: &SearchSnapshot, image_base_url: &str) -> Self {
        let is_loading = snapshot.is_loading();
        let error_message = snapshot.error_message().map(String::from);

        // The spinner or the error text replaces the grid
        let movies = if is_loading || error_message.is_some() {
            Vec::new()
        } else {
            snapshot
                .movies
                .iter()
                .map(|m| MovieCard::from_summary(m, image_base_url))
                .collect()
        };

        Self {
            search_term: snapshot.search_term.clone(),
            is_loading,
            error_message,
            movies,
            trending: TrendingCard::ranked(&snapshot.trending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{RequestState, GENERIC_FETCH_ERROR};
    use crate::testing::fixtures;

    const IMAGES: &str = "https://image.tmdb.org/t/p/w500";

    #[test]
    fn test_movie_card_formats_fields() {
        let mut movie = fixtures::movie(155, "The Dark Knight");
        movie.vote_average = Some(8.516);
        movie.release_date = Some("2008-07-16".to_string());

        let card = MovieCard::from_summary(&movie, IMAGES);
        assert_eq!(card.title, "The Dark Knight");
        assert_eq!(card.rating, "8.5");
        assert_eq!(card.year, "2008");
        assert_eq!(card.language, "en");
        assert_eq!(card.poster_url, "https://image.tmdb.org/t/p/w500/155.jpg");
    }

    #[test]
    fn test_movie_card_missing_fields() {
        let movie = MovieSummary {
            id: 7,
            title: "Obscure".to_string(),
            poster_path: None,
            popularity: None,
            vote_average: Some(0.0),
            release_date: Some(String::new()),
            original_language: None,
        };

        let card = MovieCard::from_summary(&movie, IMAGES);
        assert_eq!(card.poster_url, PLACEHOLDER_POSTER);
        assert_eq!(card.rating, "N/A");
        assert_eq!(card.year, "N/A");
        assert_eq!(card.language, "N/A");
    }

    #[test]
    fn test_trending_cards_are_ranked_from_one() {
        let mut second = fixtures::trending_entry("heat", 2);
        second.poster_url = None;
        let entries = vec![fixtures::trending_entry("alien", 5), second];

        let cards = TrendingCard::ranked(&entries);
        assert_eq!(cards[0].rank, 1);
        assert_eq!(cards[0].search_term, "alien");
        assert_eq!(cards[1].rank, 2);
        assert_eq!(cards[1].poster_url, PLACEHOLDER_POSTER);
    }

    #[test]
    fn test_search_view_success() {
        let snapshot = SearchSnapshot {
            search_term: "bat".to_string(),
            request: RequestState::Success { results: 2 },
            movies: fixtures::movies("Bat", 2),
            trending: vec![fixtures::trending_entry("alien", 1)],
            ..Default::default()
        };

        let view = SearchView::from_snapshot(&snapshot, IMAGES);
        assert_eq!(view.search_term, "bat");
        assert!(!view.is_loading);
        assert!(view.error_message.is_none());
        assert_eq!(view.movies.len(), 2);
        assert_eq!(view.trending.len(), 1);
    }

    #[test]
    fn test_search_view_hides_grid_while_loading_or_failed() {
        let mut snapshot = SearchSnapshot {
            request: RequestState::Loading,
            movies: fixtures::movies("Old", 3),
            ..Default::default()
        };
        let view = SearchView::from_snapshot(&snapshot, IMAGES);
        assert!(view.is_loading);
        assert!(view.movies.is_empty());

        snapshot.request = RequestState::Error {
            message: GENERIC_FETCH_ERROR.to_string(),
        };
        let view = SearchView::from_snapshot(&snapshot, IMAGES);
        assert!(!view.is_loading);
        assert_eq!(view.error_message.as_deref(), Some(GENERIC_FETCH_ERROR));
        assert!(view.movies.is_empty());
    }

    #[test]
    fn test_search_view_serialization() {
        let view = SearchView::from_snapshot(&SearchSnapshot::default(), IMAGES);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["search_term"], "");
        assert_eq!(json["is_loading"], false);
        assert!(json["error_message"].is_null());
        assert!(json["movies"].as_array().unwrap().is_empty());
    }
}
