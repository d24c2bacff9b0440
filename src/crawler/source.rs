//! Source abstraction for news sites
//!
//! Each supported site implements [`NewsSource`]. The crawl pipeline only
//! ever talks to the trait: it asks the source how to request a listing page,
//! which article URLs the returned page contains, and how to turn an article
//! page into a [`NewsArticle`]. All extraction is synchronous and works on
//! raw body strings so parsed documents never cross an await point.

use crate::crawler::fetcher::PageRequest;
use crate::models::{Category, NewsArticle, Source};
use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref FIRST_SENTENCE_RE: Regex =
        Regex::new(r"(?s)^(.*?[.!?])").expect("valid first-sentence regex");
}

/// One supported news site
///
/// Implementations must be cheap to construct and hold no connection state;
/// the pipeline owns fetching and persistence.
pub trait NewsSource: Send + Sync {
    /// Which site this is
    fn source(&self) -> Source;

    /// First page number of a listing (sites disagree on 0 vs 1 based)
    fn initial_page(&self) -> u32;

    /// Site paths crawled for a category, in crawl order
    fn category_paths(&self, category: Category) -> Vec<String>;

    /// Build the request for one listing page of a category path
    fn page_request(&self, path: &str, page: u32) -> PageRequest;

    /// Extract article URLs from a listing page body
    ///
    /// When `cutoff` is set, only entries published strictly after it are
    /// returned, and extraction stops at the first entry at or older than
    /// the cutoff (listings are newest-first).
    fn listing_entries(&self, html: &str, cutoff: Option<NaiveDateTime>) -> Vec<String>;

    /// Parse a full article page, or `None` when required fields are missing
    fn parse_article(&self, html: &str, url: &str, category: Category) -> Option<NewsArticle>;
}

/// First sentence of a text, used as the article summary
///
/// Falls back to the whole trimmed text when no sentence terminator exists.
pub fn first_sentence(text: &str) -> String {
    let trimmed = text.trim();
    match FIRST_SENTENCE_RE.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Normalize a keyword: trimmed, first letter uppercased
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Resolve a possibly relative href against the site base URL
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(base).ok()?;
    Some(base.join(href).ok()?.to_string())
}
