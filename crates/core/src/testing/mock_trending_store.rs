//! Mock trending store for testing.

use std::sync::Mutex;

use chrono::Utc;

use crate::trending::{normalize_term, SearchHit, TrendingEntry, TrendingError, TrendingStore};

/// Mock implementation of the TrendingStore trait.
///
/// Keeps entries in memory, records every `record_search` call (including
/// failed ones) and can be told to fail reads or writes.
#[derive(Debug, Default)]
pub struct MockTrendingStore {
    entries: Mutex<Vec<TrendingEntry>>,
    calls: Mutex<Vec<(String, SearchHit)>>,
    reads: Mutex<Vec<u32>>,
    fail_writes: Mutex<bool>,
    fail_reads: Mutex<bool>,
}

impl MockTrendingStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store pre-seeded with entries.
    pub fn with_entries(entries: Vec<TrendingEntry>) -> Self {
        let store = Self::new();
        *store.entries.lock().unwrap() = entries;
        store
    }

    /// Make every `record_search` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Make every `top_searches` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    /// All `record_search` calls as (raw term, hit).
    pub fn recorded_calls(&self) -> Vec<(String, SearchHit)> {
        self.calls.lock().unwrap().clone()
    }

    /// Limits passed to `top_searches`, one per call.
    pub fn read_calls(&self) -> Vec<u32> {
        self.reads.lock().unwrap().clone()
    }
}

impl TrendingStore for MockTrendingStore {
    fn record_search(&self, term: &str, hit: &SearchHit) -> Result<TrendingEntry, TrendingError> {
        self.calls
            .lock()
            .unwrap()
            .push((term.to_string(), hit.clone()));

        if *self.fail_writes.lock().unwrap() {
            return Err(TrendingError::Database("Mock write failure".to_string()));
        }

        let key = normalize_term(term);
        if key.is_empty() {
            return Err(TrendingError::InvalidTerm(term.to_string()));
        }

        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.search_term == key) {
            entry.count += 1;
            entry.updated_at = now;
            return Ok(entry.clone());
        }

        let entry = TrendingEntry {
            id: format!("mock-{}", entries.len() + 1),
            search_term: key,
            count: 1,
            movie_id: hit.movie_id,
            title: hit.title.clone(),
            poster_url: hit.poster_url.clone(),
            created_at: now,
            updated_at: now,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    fn top_searches(&self, limit: u32) -> Result<Vec<TrendingEntry>, TrendingError> {
        self.reads.lock().unwrap().push(limit);

        if *self.fail_reads.lock().unwrap() {
            return Err(TrendingError::Database("Mock read failure".to_string()));
        }

        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(b.updated_at.cmp(&a.updated_at))
        });
        entries.truncate(limit as usize);
        Ok(entries)
    }
}
