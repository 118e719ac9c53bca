//! SQLite-backed trending search store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use super::{normalize_term, SearchHit, TrendingEntry, TrendingError, TrendingStore};

const ENTRY_COLUMNS: &str =
    "id, search_term, count, movie_id, title, poster_url, created_at, updated_at";

/// SQLite-backed trending store.
pub struct SqliteTrendingStore {
    conn: Mutex<Connection>,
}

impl SqliteTrendingStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TrendingError> {
        let conn = Connection::open(path).map_err(|e| TrendingError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, TrendingError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TrendingError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TrendingError> {
        conn.execute_batch(
            r#"
            -- One row per normalized search term
            CREATE TABLE IF NOT EXISTS trending_searches (
                id TEXT PRIMARY KEY,
                search_term TEXT NOT NULL UNIQUE,
                count INTEGER NOT NULL DEFAULT 1,
                movie_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                poster_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_trending_searches_count
                ON trending_searches(count DESC, updated_at DESC);
            "#,
        )
        .map_err(|e| TrendingError::Database(e.to_string()))?;

        Ok(())
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<TrendingEntry> {
        let count: i64 = row.get(2)?;
        let movie_id: i64 = row.get(3)?;
        let created_at: String = row.get(6)?;
        let updated_at: String = row.get(7)?;

        Ok(TrendingEntry {
            id: row.get(0)?,
            search_term: row.get(1)?,
            count: count.max(0) as u64,
            movie_id: movie_id.max(0) as u64,
            title: row.get(4)?,
            poster_url: row.get(5)?,
            created_at: Self::parse_timestamp(&created_at),
            updated_at: Self::parse_timestamp(&updated_at),
        })
    }
}

impl TrendingStore for SqliteTrendingStore {
    fn record_search(&self, term: &str, hit: &SearchHit) -> Result<TrendingEntry, TrendingError> {
        let key = normalize_term(term);
        if key.is_empty() {
            return Err(TrendingError::InvalidTerm(term.to_string()));
        }

        // Fixed-width timestamps keep lexical order equal to time order
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let id = uuid::Uuid::new_v4().to_string();

        let conn = self
            .conn
            .lock()
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        // Single statement so concurrent increments never lose a count
        conn.query_row(
            &format!(
                "INSERT INTO trending_searches (id, search_term, count, movie_id, title, poster_url, created_at, updated_at)
                 VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(search_term) DO UPDATE SET
                    count = count + 1,
                    updated_at = excluded.updated_at
                 RETURNING {}",
                ENTRY_COLUMNS
            ),
            params![
                &id,
                &key,
                hit.movie_id as i64,
                &hit.title,
                &hit.poster_url,
                &now
            ],
            Self::row_to_entry,
        )
        .map_err(|e| TrendingError::Database(e.to_string()))
    }

    fn top_searches(&self, limit: u32) -> Result<Vec<TrendingEntry>, TrendingError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM trending_searches
                 ORDER BY count DESC, updated_at DESC, search_term ASC
                 LIMIT ?",
                ENTRY_COLUMNS
            ))
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], Self::row_to_entry)
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| TrendingError::Database(e.to_string()))?);
        }
        Ok(entries)
    }
}
