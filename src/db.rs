//! Database module for the movie agent
//!
//! Provides persistence for the movie catalog and per-user memory.
//! One `Database` is opened at process start and shared by clone; every
//! operation takes the connection lock for its own duration only.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

const MOVIE_COLUMNS: &str =
    "id, name, description, release_year, rating, is_imax, price, created_at";

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Movie Operations ====================

    /// Get a movie by id
    pub fn get_movie(&self, id: i64) -> DbResult<Option<Movie>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?1"))?;
        let movie = stmt.query_row(params![id], parse_movie_row).optional()?;
        Ok(movie)
    }

    /// Get the first movie whose name matches exactly
    pub fn get_movie_by_name(&self, name: &str) -> DbResult<Option<Movie>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE name = ?1 ORDER BY id ASC LIMIT 1"
        ))?;
        let movie = stmt.query_row(params![name], parse_movie_row).optional()?;
        Ok(movie)
    }

    /// List every movie in id order
    pub fn list_movies(&self) -> DbResult<Vec<Movie>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id ASC"))?;
        let rows = stmt.query_map([], parse_movie_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Case-insensitive substring search over name and description.
    ///
    /// Case is folded in Rust: sqlite's `LIKE` only folds ASCII.
    pub fn search_movies(&self, query: &str) -> DbResult<Vec<Movie>> {
        let needle = query.to_lowercase();
        let movies = self
            .list_movies()?
            .into_iter()
            .filter(|m| {
                m.name.to_lowercase().contains(&needle)
                    || m.description.to_lowercase().contains(&needle)
            })
            .collect();
        Ok(movies)
    }

    /// Insert a new movie built from the mapping; returns the assigned id
    pub fn create_movie(&self, fields: &MovieFields) -> DbResult<i64> {
        let conn = self.conn()?;
        let movie = Movie::from_fields(fields);
        let now = Utc::now();

        conn.execute(
            "INSERT INTO movies (name, description, release_year, rating, is_imax, price, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                movie.name,
                movie.description,
                movie.release_year,
                movie.rating,
                movie.is_imax,
                movie.price,
                now.to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrite every non-id column of an existing row.
    ///
    /// Returns whether a row was updated; a missing row is not an error.
    pub fn save_movie(&self, movie: &Movie) -> DbResult<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE movies
             SET name = ?1, description = ?2, release_year = ?3, rating = ?4,
                 is_imax = ?5, price = ?6, created_at = ?7
             WHERE id = ?8",
            params![
                movie.name,
                movie.description,
                movie.release_year,
                movie.rating,
                movie.is_imax,
                movie.price,
                movie.created_at.map(|t| t.to_rfc3339()),
                movie.id,
            ],
        )?;
        Ok(updated > 0)
    }

    /// Delete a movie by id. Returns whether a row was removed.
    pub fn delete_movie(&self, id: i64) -> DbResult<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM movies WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    // ==================== Memory Operations ====================

    /// Get a memory entry by namespace and key
    pub fn get_memory(&self, namespace: &str, key: &str) -> DbResult<Option<MemoryItem>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT namespace, key, value, updated_at FROM memories
                 WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((namespace, key, value, updated_at)) => Ok(Some(MemoryItem {
                namespace,
                key,
                value: serde_json::from_str(&value)?,
                updated_at: parse_datetime(&updated_at),
            })),
            None => Ok(None),
        }
    }

    /// Store a memory entry, replacing any previous value wholesale
    pub fn put_memory(&self, namespace: &str, key: &str, value: &serde_json::Value) -> DbResult<()> {
        let conn = self.conn()?;
        let value_str = serde_json::to_string(value)?;
        conn.execute(
            "INSERT INTO memories (namespace, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![namespace, key, value_str, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Parse a movie row selected with `MOVIE_COLUMNS`
fn parse_movie_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        release_year: row.get(3)?,
        rating: row.get(4)?,
        is_imax: row.get(5)?,
        price: row.get(6)?,
        created_at: row
            .get::<_, Option<String>>(7)?
            .and_then(|s| parse_datetime(&s)),
    })
}

/// Unparseable timestamps read as absent
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
