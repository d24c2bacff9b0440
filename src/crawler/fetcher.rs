//! HTTP fetcher with rate limiting and concurrency bounds
//!
//! All page downloads go through [`PageFetcher::fetch`], which enforces the
//! politeness controls in order: the global concurrency gate (shared by all
//! sources, protecting our own egress), then the per-source rate limiter.
//! Failures never propagate: a fetch either yields a page body or `None`.

use crate::config::FetcherConfig;
use crate::crawler::status::RunState;
use crate::error::Result;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Pool of realistic User-Agent strings, rotated round-robin per request
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.2420.81",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux i686; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// Per-source rate limiter type
pub type SourceRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// A page download request built by a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Plain GET of a listing or article page
    Get { url: String },

    /// Form POST whose response is a JSON envelope with the page HTML in
    /// its `data` field (aif.ru listing endpoint)
    PostForm {
        url: String,
        form: Vec<(String, String)>,
    },
}

impl PageRequest {
    /// URL used for logging
    pub fn url(&self) -> &str {
        match self {
            Self::Get { url } | Self::PostForm { url, .. } => url,
        }
    }
}

/// Rate-limited, concurrency-bounded page fetcher shared by all sources
pub struct PageFetcher {
    client: Client,
    gate: Semaphore,
    ua_index: AtomicUsize,
}

impl PageFetcher {
    /// Create a fetcher from config
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the HTTP client cannot be built.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            gate: Semaphore::new(config.max_concurrent_requests),
            ua_index: AtomicUsize::new(0),
        })
    }

    /// Build a per-source rate limiter
    pub fn rate_limiter(requests_per_second: u32) -> SourceRateLimiter {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        RateLimiter::direct(Quota::per_second(rate))
    }

    /// Download one page as a UTF-8 body string
    ///
    /// Returns `None` without issuing the request when the stop flag is set,
    /// and `None` (after a warn log) on any network, status, or envelope
    /// failure. The concurrency slot is released on every path.
    pub async fn fetch(
        &self,
        request: &PageRequest,
        limiter: &SourceRateLimiter,
        run_state: &RunState,
    ) -> Option<String> {
        if run_state.is_stop_requested() {
            return None;
        }

        // Permit drops (and releases the slot) at the end of this scope
        let _permit = self.gate.acquire().await.ok()?;
        limiter.until_ready().await;

        if run_state.is_stop_requested() {
            return None;
        }

        match self.download(request).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url = request.url(), error = %e, "download failed");
                None
            }
        }
    }

    async fn download(&self, request: &PageRequest) -> Result<String> {
        let headers = self.build_headers();

        match request {
            PageRequest::Get { url } => {
                let response = self
                    .client
                    .get(url)
                    .headers(headers)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.text().await?)
            }
            PageRequest::PostForm { url, form } => {
                let response = self
                    .client
                    .post(url)
                    .headers(headers)
                    .header("X-Requested-With", "XMLHttpRequest")
                    .form(form)
                    .send()
                    .await?
                    .error_for_status()?;

                let envelope: serde_json::Value = response.json().await?;
                match envelope.get("data").and_then(|v| v.as_str()) {
                    Some(html) => Ok(html.to_string()),
                    None => Err(crate::error::Error::config(format!(
                        "missing data field in listing envelope from {url}"
                    ))),
                }
            }
        }
    }

    /// Browser-like headers expected by the target sites
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.next_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert(
            "Upgrade-Insecure-Requests",
            HeaderValue::from_static("1"),
        );

        headers
    }

    /// Round-robin user agent selection
    fn next_user_agent(&self) -> &'static str {
        let index = self.ua_index.fetch_add(1, Ordering::Relaxed) % USER_AGENTS.len();
        USER_AGENTS[index]
    }
}
