//! Article store
//!
//! The natural key is the article URL: inserts are conflict-ignored so a
//! re-crawl of already stored pages is a no-op, and that insert count is what
//! drives the pipeline's stop conditions. Keyword and media rows are written
//! only for rows that actually inserted.

use crate::error::{Error, Result};
use crate::models::{ArticleStatus, Category, NewsArticle, Source};
use crate::storage::{apply_pragmas, DATETIME_FORMAT};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

/// Article counts per lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub new: u64,
    pub active: u64,
    pub deleted: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.new + self.active + self.deleted
    }
}

/// Persistence interface consumed by the ingestion service
pub trait ArticleStore: Send + Sync {
    /// Insert a batch, ignoring URL conflicts; returns how many rows were new
    fn insert_batch(&self, articles: &[NewsArticle]) -> Result<usize>;

    /// Latest publish timestamp per (source, category) that has any rows
    fn latest_published(&self) -> Result<HashMap<(Source, Category), NaiveDateTime>>;

    /// Promote every `New` article to `Active`; returns the promoted count
    fn promote_new_to_active(&self) -> Result<usize>;

    /// Mark articles published before the cutoff as `Deleted`
    fn mark_deleted_before(&self, cutoff: NaiveDateTime) -> Result<usize>;

    /// Count articles per status
    fn count_by_status(&self) -> Result<StatusCounts>;
}

/// SQLite-backed article store
pub struct SqliteArticleStore {
    conn: Mutex<Connection>,
}

impl SqliteArticleStore {
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
            "CREATE TABLE IF NOT EXISTS articles (
                 id           TEXT PRIMARY KEY,
                 title        TEXT NOT NULL,
                 summary      TEXT NOT NULL,
                 content      TEXT NOT NULL,
                 category     TEXT NOT NULL,
                 url          TEXT NOT NULL UNIQUE,
                 status       TEXT NOT NULL,
                 published_at TEXT NOT NULL,
                 source       TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_articles_source_category
                 ON articles (source, category);
             CREATE INDEX IF NOT EXISTS idx_articles_status
                 ON articles (status);
             CREATE TABLE IF NOT EXISTS article_keywords (
                 article_id TEXT NOT NULL REFERENCES articles (id) ON DELETE CASCADE,
                 keyword    TEXT NOT NULL,
                 UNIQUE (article_id, keyword)
             );
             CREATE TABLE IF NOT EXISTS article_media (
                 article_id TEXT NOT NULL REFERENCES articles (id) ON DELETE CASCADE,
                 url        TEXT NOT NULL,
                 UNIQUE (article_id, url)
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::config("article store lock poisoned".to_string()))
    }
}

impl ArticleStore for SqliteArticleStore {
    fn insert_batch(&self, articles: &[NewsArticle]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;

        for article in articles {
            let id = article.id.unwrap_or_else(Uuid::new_v4);
            let changed = tx.execute(
                "INSERT OR IGNORE INTO articles
                     (id, title, summary, content, category, url, status, published_at, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id.to_string(),
                    article.title,
                    article.summary,
                    article.content,
                    article.category.as_str(),
                    article.url,
                    article.status.as_str(),
                    article.published_at.format(DATETIME_FORMAT).to_string(),
                    article.source.as_str(),
                ],
            )?;
            if changed == 0 {
                continue;
            }
            inserted += 1;

            for keyword in &article.keywords {
                tx.execute(
                    "INSERT OR IGNORE INTO article_keywords (article_id, keyword) VALUES (?1, ?2)",
                    params![id.to_string(), keyword],
                )?;
            }
            for url in &article.media_urls {
                tx.execute(
                    "INSERT OR IGNORE INTO article_media (article_id, url) VALUES (?1, ?2)",
                    params![id.to_string(), url],
                )?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn latest_published(&self) -> Result<HashMap<(Source, Category), NaiveDateTime>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT source, category, MAX(published_at)
             FROM articles GROUP BY source, category",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut latest = HashMap::new();
        for row in rows {
            let (source_str, category_str, timestamp) = row?;
            let (Some(source), Some(category)) =
                (Source::parse(&source_str), Category::parse(&category_str))
            else {
                continue;
            };
            let Ok(published_at) = NaiveDateTime::parse_from_str(&timestamp, DATETIME_FORMAT)
            else {
                continue;
            };
            latest.insert((source, category), published_at);
        }
        Ok(latest)
    }

    fn promote_new_to_active(&self) -> Result<usize> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE articles SET status = ?1 WHERE status = ?2",
            params![ArticleStatus::Active.as_str(), ArticleStatus::New.as_str()],
        )?;
        Ok(changed)
    }

    fn mark_deleted_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE articles SET status = ?1 WHERE published_at < ?2 AND status != ?1",
            params![
                ArticleStatus::Deleted.as_str(),
                cutoff.format(DATETIME_FORMAT).to_string()
            ],
        )?;
        Ok(changed)
    }

    fn count_by_status(&self) -> Result<StatusCounts> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM articles GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let (status, count) = row?;
            match ArticleStatus::parse(&status) {
                Some(ArticleStatus::New) => counts.new = count,
                Some(ArticleStatus::Active) => counts.active = count,
                Some(ArticleStatus::Deleted) => counts.deleted = count,
                None => {}
            }
        }
        Ok(counts)
    }
}
