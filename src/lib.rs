//! vestnik - Russian news ingestion engine
//!
//! Crawls aif.ru, russian.rt.com, and svpressa.ru into a local SQLite
//! archive. Each crawl run walks category listings in two passes: a backlog
//! pass that resumes deep pagination from a persisted cursor, and a
//! freshness pass that picks up everything published since the last run.
//!
//! # Architecture
//!
//! - [`config`] - TOML/env configuration and the interval wire format
//! - [`crawler`] - Fetching, the source contract, pipeline, orchestration
//! - [`sources`] - Per-site extractors
//! - [`storage`] - Article and cursor stores (SQLite)
//! - [`ingest`] - Batch persistence and freshness cutoffs
//! - [`scheduler`] - Fixed-delay auto crawling
//! - [`control`] - Operator facade
//!
//! # Example
//!
//! ```no_run
//! use vestnik::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!     let control = vestnik::build(&config)?;
//!     let run = control.start_run()?;
//!     run.await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod control;
pub mod crawler;
pub mod error;
pub mod ingest;
pub mod models;
pub mod scheduler;
pub mod sources;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::control::{CrawlerControl, RunStatus};
    pub use crate::error::{Error, Result};
    pub use crate::models::{ArticleStatus, Category, NewsArticle, Source};
    pub use crate::storage::{ArticleStore, CursorStore};
}

pub use control::CrawlerControl;
pub use models::{ArticleStatus, Category, NewsArticle, Source};

use crate::crawler::{Orchestrator, PageFetcher, RunState, SourceCrawler, SourceToggles};
use crate::ingest::IngestionService;
use crate::scheduler::AutoScheduler;
use crate::storage::{SqliteArticleStore, SqliteCursorStore};
use std::sync::Arc;

/// Wire the whole engine from validated config
pub fn build(config: &config::Config) -> error::Result<CrawlerControl> {
    let articles = Arc::new(SqliteArticleStore::open(&config.storage.articles_path)?);
    let cursors: Arc<dyn storage::CursorStore> =
        Arc::new(SqliteCursorStore::open(&config.storage.cursor_path)?);
    let ingest = Arc::new(IngestionService::new(articles));
    let fetcher = Arc::new(PageFetcher::new(&config.fetcher)?);
    let run_state = Arc::new(RunState::new());

    let mut crawlers = Vec::new();
    for source in sources::all_sources()? {
        let settings = config.source_settings(source.source());
        crawlers.push(Arc::new(SourceCrawler::new(
            Arc::from(source),
            settings.rate_limit,
            settings.categories.clone(),
            Arc::clone(&fetcher),
            Arc::clone(&cursors),
            Arc::clone(&ingest),
            Arc::clone(&run_state),
        )));
    }

    let toggles = Arc::new(SourceToggles::new(|source| {
        config.source_settings(source).enabled
    }));
    let orchestrator = Arc::new(Orchestrator::new(crawlers, ingest, run_state, toggles));

    // A zero interval is tolerated here; enabling just warns and stays off
    let interval = match config.scheduler.parsed_interval() {
        Ok(interval) => interval,
        Err(error::Error::IntervalZero) => None,
        Err(e) => return Err(e),
    };
    let scheduler = Arc::new(AutoScheduler::new(Arc::clone(&orchestrator), interval));
    if config.scheduler.auto_enabled {
        scheduler.enable();
    }

    Ok(CrawlerControl::new(orchestrator, scheduler))
}
