//! Crawling engine: fetching, source contract, per-source pipeline, and
//! run orchestration

pub mod fetcher;
pub mod orchestrator;
pub mod pipeline;
pub mod source;
pub mod status;

pub use fetcher::{PageFetcher, PageRequest, SourceRateLimiter};
pub use orchestrator::{Orchestrator, SourceToggles};
pub use pipeline::SourceCrawler;
pub use source::NewsSource;
pub use status::RunState;
