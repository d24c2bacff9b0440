//! SQLite persistence
//!
//! Articles and crawl cursors live in separate database files behind store
//! traits, so the pipeline and tests never touch SQL directly.

pub mod articles;
pub mod cursor;

pub use articles::{ArticleStore, SqliteArticleStore, StatusCounts};
pub use cursor::{CursorStore, SqliteCursorStore};

use crate::error::Result;
use rusqlite::Connection;

/// Pragmas applied to every connection
pub(crate) fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

/// Timestamp storage format; lexicographic order matches chronological order
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
