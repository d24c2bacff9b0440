//! russian.rt.com extractor
//!
//! Listings are paged through the trend endpoint, zero-based, identified by
//! opaque trend ids rather than readable paths. Timestamps come from the
//! `datetime` attribute of `time.date` as `yyyy-mm-dd HH:MM`.

use crate::crawler::fetcher::PageRequest;
use crate::crawler::source::{absolutize, first_sentence, normalize_keyword, NewsSource};
use crate::error::Result;
use crate::models::{ArticleStatus, Category, NewsArticle, Source};
use crate::sources::{element_text, selector};
use chrono::NaiveDateTime;
use scraper::{Html, Selector};
use std::collections::HashSet;

const BASE_URL: &str = "https://russian.rt.com";

pub struct RtRu {
    list_item: Selector,
    list_link: Selector,
    date: Selector,
    title: Selector,
    summary: Selector,
    body_blocks: Selector,
    keywords: Selector,
    media: Selector,
}

impl RtRu {
    pub fn new() -> Result<Self> {
        Ok(Self {
            list_item: selector("li.listing__column")?,
            list_link: selector("a.link")?,
            date: selector("time.date")?,
            title: selector("h1.article__heading")?,
            summary: selector("div.article__summary")?,
            body_blocks: selector(
                "div.article__text > p, div.article__text > h1, div.article__text > h2, \
                 div.article__text > h3, div.article__text > h4, div.article__text > h5, \
                 div.article__text > h6, div.article__text > blockquote",
            )?,
            keywords: selector("a.tags-trends__link")?,
            media: selector("img.article__cover-image")?,
        })
    }

    fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M").ok()
    }
}

impl NewsSource for RtRu {
    fn source(&self) -> Source {
        Source::RtRu
    }

    fn initial_page(&self) -> u32 {
        0
    }

    fn category_paths(&self, category: Category) -> Vec<String> {
        let paths: &[&str] = match category {
            Category::Politics => &["5835d35ec46188a6798b493b", "58357206c46188dc658b45ad"],
            Category::Economics => &[
                "583573b2c46188a1658b45f7",
                "58357264c461889e658b458e",
                "58357896c461889f658b46a1",
                "58358324c46188a2658b47c0",
                "58358088c46188a1658b4704",
            ],
            Category::Society => &["583585fac461889d658b484c"],
            Category::Sport => &[
                "58356b4bc36188f34f8b48b6",
                "58356befc46188991b8b47b1",
                "58356e86c461884d4d8b4599",
                "58357fd4c46188dc658b46fa",
                "583571dcc461889e658b458a",
                "57e94138c46188b8458b480c",
                "58358911c4618866648b4589",
                "58380405c46188046c8b46c7",
            ],
            Category::ScienceTech => &[
                "5d83432e02e8bd4e656e7f47",
                "5835934dc4618894648b491a",
                "58359464c461888a648b4835",
                "584be210c36188d60d8b45b4",
                "58359228c46188866a8b487f",
                "5d834a6202e8bd51154aa624",
                "5835a55bc4618845518b4785",
                "5849bf37c361881a378b459b",
                "58567a75c461888f758b45fe",
                "5d8343dbae5ac977e066f422",
                "58359402c4618893648b4a52",
            ],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn page_request(&self, path: &str, page: u32) -> PageRequest {
        PageRequest::Get {
            url: format!(
                "{BASE_URL}/listing/type.ArticleVideoGallery.trend.{path}/prepare/all-trends-new/50/{page}"
            ),
        }
    }

    fn listing_entries(&self, html: &str, cutoff: Option<NaiveDateTime>) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut urls = Vec::new();

        for item in document.select(&self.list_item) {
            let Some(url) = item
                .select(&self.list_link)
                .next()
                .and_then(|a| a.attr("href"))
                .and_then(|h| absolutize(BASE_URL, h))
            else {
                continue;
            };
            let Some(published_at) = item
                .select(&self.date)
                .next()
                .and_then(|e| e.attr("datetime"))
                .and_then(Self::parse_datetime)
            else {
                continue;
            };

            if let Some(cutoff) = cutoff {
                if published_at <= cutoff {
                    break;
                }
            }
            urls.push(url);
        }
        urls
    }

    fn parse_article(&self, html: &str, url: &str, category: Category) -> Option<NewsArticle> {
        let document = Html::parse_document(html);

        let title = document.select(&self.title).next().map(|e| element_text(&e))?;
        if title.is_empty() {
            return None;
        }

        let summary_text = document.select(&self.summary).next().map(|e| element_text(&e))?;
        let summary = first_sentence(&summary_text);

        let blocks: Vec<String> = document
            .select(&self.body_blocks)
            .map(|e| element_text(&e))
            .filter(|t| !t.is_empty())
            .collect();
        // The lead paragraph opens the content, then the body blocks
        let content = format!("{}\n\n{}", summary_text, blocks.join("\n\n"));

        let keywords: HashSet<String> = document
            .select(&self.keywords)
            .filter_map(|e| normalize_keyword(&element_text(&e)))
            .collect();
        let media_urls: HashSet<String> = document
            .select(&self.media)
            .filter_map(|e| e.attr("src").and_then(|s| absolutize(BASE_URL, s)))
            .collect();

        let published_at = document
            .select(&self.date)
            .next()
            .and_then(|e| e.attr("datetime"))
            .and_then(Self::parse_datetime)?;

        Some(NewsArticle {
            id: None,
            title,
            summary,
            content,
            category,
            keywords,
            media_urls,
            url: url.to_string(),
            status: ArticleStatus::New,
            published_at,
            source: Source::RtRu,
        })
    }
}
