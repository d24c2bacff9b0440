//! Shared test fixtures
//!
//! `ScriptedSource` is a minimal `NewsSource` over a plain-text page format
//! so pipeline tests control listings and articles without real site markup.
//! Listing pages are lines of `path|YYYY-MM-DD HH:MM`; article pages are
//! `title` / `YYYY-MM-DD HH:MM` / body lines.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use vestnik::config::FetcherConfig;
use vestnik::crawler::source::first_sentence;
use vestnik::crawler::{NewsSource, PageFetcher, PageRequest, RunState, SourceCrawler};
use vestnik::ingest::IngestionService;
use vestnik::models::{ArticleStatus, Category, NewsArticle, Source};
use vestnik::storage::{CursorStore, SqliteArticleStore, SqliteCursorStore};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub struct ScriptedSource {
    base_url: String,
}

impl ScriptedSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl NewsSource for ScriptedSource {
    fn source(&self) -> Source {
        Source::AifRu
    }

    fn initial_page(&self) -> u32 {
        1
    }

    fn category_paths(&self, category: Category) -> Vec<String> {
        match category {
            Category::Politics => vec!["politics".to_string()],
            _ => vec![],
        }
    }

    fn page_request(&self, path: &str, page: u32) -> PageRequest {
        PageRequest::Get {
            url: format!("{}/{}?page={}", self.base_url, path, page),
        }
    }

    fn listing_entries(&self, body: &str, cutoff: Option<NaiveDateTime>) -> Vec<String> {
        let mut urls = Vec::new();
        for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((path, timestamp)) = line.split_once('|') else {
                continue;
            };
            let Ok(published_at) = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            else {
                continue;
            };
            if let Some(cutoff) = cutoff {
                if published_at <= cutoff {
                    break;
                }
            }
            urls.push(format!("{}{}", self.base_url, path));
        }
        urls
    }

    fn parse_article(&self, body: &str, url: &str, category: Category) -> Option<NewsArticle> {
        let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
        let title = lines.next()?.to_string();
        let published_at =
            NaiveDateTime::parse_from_str(lines.next()?, TIMESTAMP_FORMAT).ok()?;
        let content = lines.collect::<Vec<_>>().join("\n\n");
        if content.is_empty() {
            return None;
        }

        Some(NewsArticle {
            id: None,
            title,
            summary: first_sentence(&content),
            content,
            category,
            keywords: HashSet::new(),
            media_urls: HashSet::new(),
            url: url.to_string(),
            status: ArticleStatus::New,
            published_at,
            source: Source::AifRu,
        })
    }
}

/// Pipeline wired to in-memory stores and a scripted source
pub struct Harness {
    pub crawler: SourceCrawler,
    pub ingest: Arc<IngestionService>,
    pub articles: Arc<SqliteArticleStore>,
    pub cursors: Arc<SqliteCursorStore>,
    pub run_state: Arc<RunState>,
}

impl Harness {
    pub fn new(base_url: &str) -> Self {
        let articles = Arc::new(SqliteArticleStore::in_memory().unwrap());
        let cursors = Arc::new(SqliteCursorStore::in_memory().unwrap());
        let ingest = Arc::new(IngestionService::new(
            Arc::clone(&articles) as Arc<dyn vestnik::storage::ArticleStore>
        ));
        let run_state = Arc::new(RunState::new());
        let fetcher = Arc::new(PageFetcher::new(&FetcherConfig::default()).unwrap());

        let crawler = SourceCrawler::new(
            Arc::new(ScriptedSource::new(base_url)),
            100,
            None,
            fetcher,
            Arc::clone(&cursors) as Arc<dyn CursorStore>,
            Arc::clone(&ingest),
            Arc::clone(&run_state),
        );

        Self {
            crawler,
            ingest,
            articles,
            cursors,
            run_state,
        }
    }

    /// Cutoff map routing one timestamp to the politics category
    pub fn politics_cutoff(
        cutoff: Option<NaiveDateTime>,
    ) -> HashMap<Category, Option<NaiveDateTime>> {
        let mut map: HashMap<Category, Option<NaiveDateTime>> =
            Category::all().into_iter().map(|c| (c, None)).collect();
        map.insert(Category::Politics, cutoff);
        map
    }

    pub fn resume_page(&self) -> Option<u32> {
        self.cursors
            .resume_page(Source::AifRu, Category::Politics, "politics")
            .unwrap()
    }

    pub fn set_resume_page(&self, page: u32) {
        self.cursors
            .set_resume_page(Source::AifRu, Category::Politics, "politics", page)
            .unwrap();
    }
}

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn article_body(title: &str, timestamp: &str, text: &str) -> String {
    format!("{title}\n{timestamp}\n{text}\n")
}
