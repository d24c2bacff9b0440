//! svpressa.ru extractor
//!
//! Dates are written out with Russian month names in genitive case, with the
//! year omitted for the current year ("7 мая" vs "7 мая 2024"). Listing
//! entries carry a date only, so cutoff comparison happens at day
//! granularity and keeps same-day entries.

use crate::crawler::fetcher::PageRequest;
use crate::crawler::source::{absolutize, first_sentence, normalize_keyword, NewsSource};
use crate::error::Result;
use crate::models::{ArticleStatus, Category, NewsArticle, Source};
use crate::sources::{element_text, selector};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use scraper::{Html, Selector};
use std::collections::HashSet;

const BASE_URL: &str = "https://svpressa.ru";

const MONTHS: &[(&str, u32)] = &[
    ("января", 1),
    ("февраля", 2),
    ("марта", 3),
    ("апреля", 4),
    ("мая", 5),
    ("июня", 6),
    ("июля", 7),
    ("августа", 8),
    ("сентября", 9),
    ("октября", 10),
    ("ноября", 11),
    ("декабря", 12),
];

pub struct SvpressaRu {
    list_item: Selector,
    list_link: Selector,
    list_date: Selector,
    title: Selector,
    body_blocks: Selector,
    keywords: Selector,
    media: Selector,
    published: Selector,
}

impl SvpressaRu {
    pub fn new() -> Result<Self> {
        Ok(Self {
            list_item: selector("article.b-article_item")?,
            list_link: selector("a.b-article__title")?,
            list_date: selector("div.b-article__date")?,
            title: selector("h1.b-text__title")?,
            body_blocks: selector("div.b-text__block > p")?,
            keywords: selector("a.b-tag__link")?,
            media: selector("div.b-text__img img")?,
            published: selector("div.b-text__date")?,
        })
    }

    fn month_number(name: &str) -> Option<u32> {
        let lower = name.to_lowercase();
        MONTHS.iter().find(|(n, _)| *n == lower).map(|(_, m)| *m)
    }

    /// `7 мая` or `7 мая 2024`; missing year means the current year
    fn parse_listing_date(text: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let day: u32 = parts.first()?.parse().ok()?;
        let month = Self::month_number(parts.get(1)?)?;
        let year = match parts.get(2) {
            Some(y) => y.parse().ok()?,
            None => Local::now().year(),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// `7 мая 12:30` or `7 мая 2024 12:30`
    fn parse_article_datetime(text: &str) -> Option<NaiveDateTime> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let day: u32 = parts.first()?.parse().ok()?;
        let month = Self::month_number(parts.get(1)?)?;

        let (year, time_part) = match parts.len() {
            3 => (Local::now().year(), *parts.get(2)?),
            4 => (parts.get(2)?.parse().ok()?, *parts.get(3)?),
            _ => return None,
        };

        let (hour, minute) = time_part.split_once(':')?;
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
    }
}

impl NewsSource for SvpressaRu {
    fn source(&self) -> Source {
        Source::SvpressaRu
    }

    fn initial_page(&self) -> u32 {
        1
    }

    fn category_paths(&self, category: Category) -> Vec<String> {
        let path = match category {
            Category::Politics => "politic",
            Category::Economics => "economy",
            Category::Society => "society",
            Category::Sport => "sport",
            Category::ScienceTech => "science",
        };
        vec![path.to_string()]
    }

    fn page_request(&self, path: &str, page: u32) -> PageRequest {
        PageRequest::Get {
            url: format!("{BASE_URL}/{path}/?page={page}"),
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
            let Some(published_on) = item
                .select(&self.list_date)
                .next()
                .and_then(|e| Self::parse_listing_date(&element_text(&e)))
            else {
                continue;
            };

            // Day granularity only: keep same-day entries, the article
            // parse supplies the full timestamp
            if let Some(cutoff) = cutoff {
                if published_on < cutoff.date() {
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

        // Tags are prefixed with a marker character that gets stripped
        let keywords: HashSet<String> = document
            .select(&self.keywords)
            .filter_map(|e| {
                let text = element_text(&e);
                let mut chars = text.chars();
                chars.next()?;
                normalize_keyword(chars.as_str())
            })
            .collect();
        let media_urls: HashSet<String> = document
            .select(&self.media)
            .filter_map(|e| e.attr("src").and_then(|s| absolutize(BASE_URL, s)))
            .collect();

        let published_at = document
            .select(&self.published)
            .next()
            .and_then(|e| Self::parse_article_datetime(&element_text(&e)))?;

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
            source: Source::SvpressaRu,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svpressa() -> SvpressaRu {
        SvpressaRu::new().unwrap()
    }

    #[test]
    fn test_page_request() {
        let request = svpressa().page_request("politic", 4);
        assert_eq!(request.url(), "https://svpressa.ru/politic/?page=4");
    }

    #[test]
    fn test_listing_date_with_and_without_year() {
        assert_eq!(
            SvpressaRu::parse_listing_date("7 мая 2024"),
            NaiveDate::from_ymd_opt(2024, 5, 7)
        );
        let current = SvpressaRu::parse_listing_date("1 декабря").unwrap();
        assert_eq!(current.year(), Local::now().year());
        assert_eq!((current.month(), current.day()), (12, 1));
        assert!(SvpressaRu::parse_listing_date("вчера").is_none());
    }

    #[test]
    fn test_article_datetime() {
        assert_eq!(
            SvpressaRu::parse_article_datetime("7 мая 2024 12:30"),
            NaiveDate::from_ymd_opt(2024, 5, 7)
                .unwrap()
                .and_hms_opt(12, 30, 0)
        );
        let current = SvpressaRu::parse_article_datetime("2 января 08:05").unwrap();
        assert_eq!(current.date().year(), Local::now().year());
    }

    #[test]
    fn test_listing_cutoff_keeps_same_day() {
        let html = r#"
        <article class="b-article_item">
          <a class="b-article__title" href="/politic/article/1/">One</a>
          <div class="b-article__date">7 мая 2025</div>
        </article>
        <article class="b-article_item">
          <a class="b-article__title" href="/politic/article/2/">Two</a>
          <div class="b-article__date">1 мая 2025</div>
        </article>
        "#;
        let cutoff = NaiveDate::from_ymd_opt(2025, 5, 7)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        let urls = svpressa().listing_entries(html, Some(cutoff));
        assert_eq!(urls, vec!["https://svpressa.ru/politic/article/1/".to_string()]);
    }

    #[test]
    fn test_parse_article_strips_tag_marker() {
        let html = r#"
        <html><body>
          <h1 class="b-text__title">Новость дня</h1>
          <div class="b-text__date">7 мая 2025 12:30</div>
          <div class="b-text__block">
            <p>Первый абзац статьи. Продолжение.</p>
            <p>Второй абзац.</p>
          </div>
          <a class="b-tag__link">#экономика</a>
          <div class="b-text__img"><img src="/media/pic.png"></div>
        </body></html>
        "#;

        let article = svpressa()
            .parse_article(html, "https://svpressa.ru/politic/article/1/", Category::Economics)
            .unwrap();

        assert_eq!(article.summary, "Первый абзац статьи.");
        assert_eq!(article.content, "Первый абзац статьи. Продолжение.\n\nВторой абзац.");
        assert!(article.keywords.contains("Экономика"));
        assert!(article.media_urls.contains("https://svpressa.ru/media/pic.png"));
        assert_eq!(article.source, Source::SvpressaRu);
    }
}
