//! Ingestion service
//!
//! Sits between the crawl pipeline and the article store. It owns the
//! latest-published map used as the freshness cutoff: computed once per run
//! (right after the previous run's `New` rows are promoted) and cached so
//! every crawler in the run sees the same cutoffs.

use crate::error::Result;
use crate::models::{Category, NewsArticle, Source};
use crate::storage::ArticleStore;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Latest publish timestamp per source and category; `None` when the
/// category has no stored articles yet
pub type LatestMap = HashMap<Source, HashMap<Category, Option<NaiveDateTime>>>;

pub struct IngestionService {
    store: Arc<dyn ArticleStore>,
    latest_cache: Mutex<Option<LatestMap>>,
}

impl IngestionService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self {
            store,
            latest_cache: Mutex::new(None),
        }
    }

    /// Run prologue: drop the cached cutoffs and promote last run's articles
    pub fn prepare_run(&self) -> Result<()> {
        if let Ok(mut cache) = self.latest_cache.lock() {
            *cache = None;
        }
        let promoted = self.store.promote_new_to_active()?;
        if promoted > 0 {
            tracing::info!(promoted, "promoted articles to active");
        }
        Ok(())
    }

    /// Cutoff map with every (source, category) pair present
    pub fn latest_published(&self) -> Result<LatestMap> {
        if let Ok(cache) = self.latest_cache.lock() {
            if let Some(map) = cache.as_ref() {
                return Ok(map.clone());
            }
        }

        let sparse = self.store.latest_published()?;
        let mut map = LatestMap::new();
        for source in Source::all() {
            let per_category = map.entry(source).or_default();
            for category in Category::all() {
                per_category.insert(category, sparse.get(&(source, category)).copied());
            }
        }

        if let Ok(mut cache) = self.latest_cache.lock() {
            *cache = Some(map.clone());
        }
        Ok(map)
    }

    /// Persist a batch, assigning ids to fresh articles; returns how many
    /// were actually new
    pub fn save_batch(&self, mut articles: Vec<NewsArticle>) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }
        for article in &mut articles {
            if article.id.is_none() {
                article.id = Some(Uuid::new_v4());
            }
        }
        self.store.insert_batch(&articles)
    }
}
