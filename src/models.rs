// Core data structures for the vestnik crawler

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A news site the crawler knows how to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    AifRu,
    RtRu,
    SvpressaRu,
}

impl Source {
    /// Get string representation (stable, used in database columns and keys)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AifRu => "aif-ru",
            Self::RtRu => "rt-ru",
            Self::SvpressaRu => "svpressa-ru",
        }
    }

    /// Create from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "aif-ru" => Some(Self::AifRu),
            "rt-ru" => Some(Self::RtRu),
            "svpressa-ru" => Some(Self::SvpressaRu),
            _ => None,
        }
    }

    /// All sources, in crawl order
    pub fn all() -> [Self; 3] {
        [Self::AifRu, Self::RtRu, Self::SvpressaRu]
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// News category enumeration (closed set shared by all sources)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Politics,
    Economics,
    Society,
    Sport,
    ScienceTech,
}

impl Category {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Politics => "politics",
            Self::Economics => "economics",
            Self::Society => "society",
            Self::Sport => "sport",
            Self::ScienceTech => "science-tech",
        }
    }

    /// Create from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "politics" => Some(Self::Politics),
            "economics" => Some(Self::Economics),
            "society" => Some(Self::Society),
            "sport" => Some(Self::Sport),
            "science-tech" => Some(Self::ScienceTech),
            _ => None,
        }
    }

    /// All categories
    pub fn all() -> [Self; 5] {
        [
            Self::Politics,
            Self::Economics,
            Self::Society,
            Self::Sport,
            Self::ScienceTech,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Article lifecycle status
///
/// Transitions are monotonic: `New` articles from the previous run are
/// promoted to `Active` at the start of the next run; `Deleted` is reached
/// only through the bulk mark-deleted maintenance operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    New,
    Active,
    Deleted,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed news article
///
/// The `url` is the natural key: inserts that collide with an existing URL
/// are silently dropped, which makes re-crawling idempotent. `id` is assigned
/// by the article store on first insert and stable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: Option<Uuid>,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: Category,
    pub keywords: HashSet<String>,
    pub media_urls: HashSet<String>,
    pub url: String,
    pub status: ArticleStatus,
    pub published_at: NaiveDateTime,
    pub source: Source,
}
