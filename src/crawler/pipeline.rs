//! Crawl pipeline for a single source
//!
//! Every (category, path) pair gets two passes. The backlog phase walks
//! deeper into the listing history from the persisted cursor and is the only
//! phase that moves it. The freshness phase re-reads from the first page with
//! the latest stored timestamp as a cutoff and never touches the cursor.
//!
//! Phase endings are ordinary control flow; only storage errors propagate.

use crate::crawler::fetcher::{PageFetcher, PageRequest, SourceRateLimiter};
use crate::crawler::source::NewsSource;
use crate::crawler::status::RunState;
use crate::error::Result;
use crate::ingest::IngestionService;
use crate::models::{Category, NewsArticle, Source};
use crate::storage::CursorStore;
use chrono::NaiveDateTime;
use futures::{stream, StreamExt};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrent article-page downloads per listing page; the fetcher's global
/// gate still bounds the total across sources
const ARTICLE_FETCH_CONCURRENCY: usize = 16;

pub struct SourceCrawler {
    source: Arc<dyn NewsSource>,
    fetcher: Arc<PageFetcher>,
    limiter: SourceRateLimiter,
    cursors: Arc<dyn CursorStore>,
    ingest: Arc<IngestionService>,
    run_state: Arc<RunState>,
    path_overrides: Option<HashMap<Category, Vec<String>>>,
}

impl SourceCrawler {
    pub fn new(
        source: Arc<dyn NewsSource>,
        requests_per_second: u32,
        path_overrides: Option<HashMap<Category, Vec<String>>>,
        fetcher: Arc<PageFetcher>,
        cursors: Arc<dyn CursorStore>,
        ingest: Arc<IngestionService>,
        run_state: Arc<RunState>,
    ) -> Self {
        Self {
            limiter: PageFetcher::rate_limiter(requests_per_second),
            source,
            fetcher,
            cursors,
            ingest,
            run_state,
            path_overrides,
        }
    }

    pub fn source(&self) -> Source {
        self.source.source()
    }

    /// Crawl every category path: backlog first, then freshness
    pub async fn run(
        &self,
        latest_by_category: &HashMap<Category, Option<NaiveDateTime>>,
    ) -> Result<()> {
        for category in Category::all() {
            for path in self.paths(category) {
                if self.run_state.is_stop_requested() {
                    return Ok(());
                }
                self.backlog_phase(category, &path).await?;

                if self.run_state.is_stop_requested() {
                    return Ok(());
                }
                let cutoff = latest_by_category.get(&category).copied().flatten();
                self.freshness_phase(category, &path, cutoff).await?;
            }
        }
        Ok(())
    }

    fn paths(&self, category: Category) -> Vec<String> {
        match self
            .path_overrides
            .as_ref()
            .and_then(|overrides| overrides.get(&category))
        {
            Some(paths) => paths.clone(),
            None => self.source.category_paths(category),
        }
    }

    /// Walk the listing history from the stored cursor, no cutoff
    async fn backlog_phase(&self, category: Category, path: &str) -> Result<()> {
        let source = self.source.source();
        let mut page = match self.cursors.resume_page(source, category, path)? {
            Some(page) => page,
            None => self.source.initial_page(),
        };
        let mut last_hash: Option<[u8; 32]> = None;

        loop {
            if self.run_state.is_stop_requested() {
                return Ok(());
            }

            let request = self.source.page_request(path, page);
            let Some(body) = self
                .fetcher
                .fetch(&request, &self.limiter, &self.run_state)
                .await
            else {
                if self.run_state.is_stop_requested() {
                    return Ok(());
                }
                // Skip the bad page next run rather than retrying it forever
                self.cursors.set_resume_page(source, category, path, page + 1)?;
                tracing::warn!(%source, %category, path, page, "listing fetch failed, skipping page");
                return Ok(());
            };

            let hash: [u8; 32] = Sha256::digest(body.as_bytes()).into();
            if last_hash == Some(hash) {
                // The site serves the last page for every larger index
                self.cursors.clear_resume_page(source, category, path)?;
                tracing::info!(%source, %category, path, page, "backlog exhausted");
                return Ok(());
            }
            last_hash = Some(hash);

            let urls = self.extract_entries(body, None).await;
            if urls.is_empty() {
                return Ok(());
            }

            let articles = self.fetch_articles(urls, category).await;
            let saved = self.ingest.save_batch(articles)?;
            tracing::debug!(%source, %category, path, page, saved, "backlog page done");
            if saved == 0 {
                return Ok(());
            }

            page += 1;
            self.cursors.set_resume_page(source, category, path, page)?;
        }
    }

    /// Re-read from the first page down to the newest stored article
    async fn freshness_phase(
        &self,
        category: Category,
        path: &str,
        cutoff: Option<NaiveDateTime>,
    ) -> Result<()> {
        let source = self.source.source();
        let mut page = self.source.initial_page();

        loop {
            if self.run_state.is_stop_requested() {
                return Ok(());
            }

            let request = self.source.page_request(path, page);
            let Some(body) = self
                .fetcher
                .fetch(&request, &self.limiter, &self.run_state)
                .await
            else {
                return Ok(());
            };

            let urls = self.extract_entries(body, cutoff).await;
            if urls.is_empty() {
                return Ok(());
            }

            let articles = self.fetch_articles(urls, category).await;
            let saved = self.ingest.save_batch(articles)?;
            tracing::debug!(%source, %category, path, page, saved, "freshness page done");
            if saved == 0 {
                return Ok(());
            }

            page += 1;
        }
    }

    /// Listing extraction on the blocking pool; parsed HTML is not `Send`
    async fn extract_entries(&self, body: String, cutoff: Option<NaiveDateTime>) -> Vec<String> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || source.listing_entries(&body, cutoff))
            .await
            .unwrap_or_default()
    }

    /// Download and parse article pages concurrently
    async fn fetch_articles(&self, urls: Vec<String>, category: Category) -> Vec<NewsArticle> {
        stream::iter(urls)
            .map(|url| {
                let source = Arc::clone(&self.source);
                async move {
                    if self.run_state.is_stop_requested() {
                        return None;
                    }
                    let request = PageRequest::Get { url: url.clone() };
                    let body = self
                        .fetcher
                        .fetch(&request, &self.limiter, &self.run_state)
                        .await?;

                    let parsed = tokio::task::spawn_blocking(move || {
                        source.parse_article(&body, &url, category)
                    })
                    .await
                    .ok()
                    .flatten();

                    if parsed.is_none() {
                        tracing::debug!("skipping unparseable article page");
                    }
                    parsed
                }
            })
            .buffer_unordered(ARTICLE_FETCH_CONCURRENCY)
            .filter_map(|article| async move { article })
            .collect()
            .await
    }
}
