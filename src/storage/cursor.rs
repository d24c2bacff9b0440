//! Crawl resume cursors
//!
//! Backlog scanning can take many runs to reach the oldest pages, so the
//! next page to visit is persisted per (source, category, path). Cursors
//! live in their own database file, independent of the article store.

use crate::error::{Error, Result};
use crate::models::{Category, Source};
use crate::storage::apply_pragmas;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Resume-point interface consumed by the crawl pipeline
pub trait CursorStore: Send + Sync {
    /// Stored next page for a listing path; `None` means start fresh
    fn resume_page(&self, source: Source, category: Category, path: &str) -> Result<Option<u32>>;

    fn set_resume_page(
        &self,
        source: Source,
        category: Category,
        path: &str,
        page: u32,
    ) -> Result<()>;

    /// Drop the cursor once the backlog is exhausted
    fn clear_resume_page(&self, source: Source, category: Category, path: &str) -> Result<()>;
}

/// SQLite key-value implementation
pub struct SqliteCursorStore {
    conn: Mutex<Connection>,
}

impl SqliteCursorStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory store for tests
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        apply_pragmas(&conn)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cursors (
                 key  TEXT PRIMARY KEY,
                 page INTEGER NOT NULL
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::config("cursor store lock poisoned".to_string()))
    }

    /// Deterministic, collision-free key; the path is the only free-form part
    fn key(source: Source, category: Category, path: &str) -> String {
        format!(
            "cursor:{}:{}:{}",
            source.as_str(),
            category.as_str(),
            urlencoding::encode(path)
        )
    }
}

impl CursorStore for SqliteCursorStore {
    fn resume_page(&self, source: Source, category: Category, path: &str) -> Result<Option<u32>> {
        let conn = self.lock()?;
        let page = conn
            .query_row(
                "SELECT page FROM cursors WHERE key = ?1",
                params![Self::key(source, category, path)],
                |row| row.get::<_, u32>(0),
            )
            .optional()?;
        Ok(page)
    }

    fn set_resume_page(
        &self,
        source: Source,
        category: Category,
        path: &str,
        page: u32,
    ) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO cursors (key, page) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET page = excluded.page",
            params![Self::key(source, category, path), page],
        )?;
        Ok(())
    }

    fn clear_resume_page(&self, source: Source, category: Category, path: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM cursors WHERE key = ?1",
            params![Self::key(source, category, path)],
        )?;
        Ok(())
    }
}
