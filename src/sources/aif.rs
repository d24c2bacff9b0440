//! aif.ru extractor
//!
//! Listing pages are fetched with a form POST (`page=N`) whose response is a
//! JSON envelope; the fetcher unwraps it so this module only ever sees HTML.
//! Listing timestamps come as `dd.mm.yyyy HH:MM` for older entries and bare
//! `HH:MM` for today's.

use crate::crawler::fetcher::PageRequest;
use crate::crawler::source::{absolutize, first_sentence, normalize_keyword, NewsSource};
use crate::error::Result;
use crate::models::{ArticleStatus, Category, NewsArticle, Source};
use crate::sources::{element_text, selector};
use chrono::{Local, NaiveDateTime, NaiveTime};
use scraper::{Html, Selector};
use std::collections::HashSet;

const BASE_URL: &str = "https://aif.ru";

pub struct AifRu {
    list_item: Selector,
    list_link: Selector,
    list_date: Selector,
    title: Selector,
    body_blocks: Selector,
    keywords: Selector,
    media: Selector,
    published: Selector,
}

impl AifRu {
    pub fn new() -> Result<Self> {
        Ok(Self {
            list_item: selector("div.list_item")?,
            list_link: selector("div.box_info a")?,
            list_date: selector("span.text_box__date")?,
            title: selector("h1[itemprop=headline]")?,
            body_blocks: selector(
                "div.article_text > p, div.article_text > h1, div.article_text > h2, \
                 div.article_text > h3, div.article_text > h4, div.article_text > h5, \
                 div.article_text > h6",
            )?,
            keywords: selector("span[itemprop=keywords]")?,
            media: selector("img[itemprop=image]")?,
            published: selector("time[itemprop=datePublished]")?,
        })
    }

    /// `dd.mm.yyyy HH:MM`, or bare `HH:MM` meaning today
    fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%d.%m.%Y %H:%M") {
            return Some(dt);
        }
        let time = NaiveTime::parse_from_str(text, "%H:%M").ok()?;
        Some(Local::now().date_naive().and_time(time))
    }
}

impl NewsSource for AifRu {
    fn source(&self) -> Source {
        Source::AifRu
    }

    fn initial_page(&self) -> u32 {
        1
    }

    fn category_paths(&self, category: Category) -> Vec<String> {
        let paths: &[&str] = match category {
            Category::Politics => &["politics/russia", "politics/world"],
            Category::Economics => &["money/economy", "money/business", "money/market"],
            Category::Society => &["society/people"],
            Category::Sport => &[
                "sport/football",
                "sport/hockey",
                "sport/winter",
                "sport/summer",
                "sport/other",
                "sport/olymp",
                "sport/structure",
                "sport/person",
            ],
            Category::ScienceTech => &["techno/industry", "techno/technology", "society/science"],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn page_request(&self, path: &str, page: u32) -> PageRequest {
        PageRequest::PostForm {
            url: format!("{BASE_URL}/{path}"),
            form: vec![("page".to_string(), page.to_string())],
        }
    }

    fn listing_entries(&self, html: &str, cutoff: Option<NaiveDateTime>) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut urls = Vec::new();

        for item in document.select(&self.list_item) {
            let Some(link) = item.select(&self.list_link).next() else {
                continue;
            };
            let Some(url) = link.attr("href").and_then(|h| absolutize(BASE_URL, h)) else {
                continue;
            };
            let Some(published_at) = item
                .select(&self.list_date)
                .next()
                .and_then(|e| Self::parse_datetime(&element_text(&e)))
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

        let blocks: Vec<String> = document
            .select(&self.body_blocks)
            .map(|e| element_text(&e))
            .filter(|t| !t.is_empty())
            .collect();
        let summary = first_sentence(blocks.first()?);
        let content = blocks.join("\n\n");

        let keywords: HashSet<String> = document
            .select(&self.keywords)
            .filter_map(|e| normalize_keyword(&element_text(&e)))
            .collect();
        let media_urls: HashSet<String> = document
            .select(&self.media)
            .filter_map(|e| e.attr("src").and_then(|s| absolutize(BASE_URL, s)))
            .collect();

        let published_at = document
            .select(&self.published)
            .next()
            .and_then(|e| Self::parse_datetime(&element_text(&e)))?;

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
            source: Source::AifRu,
        })
    }
}
