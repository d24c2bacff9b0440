//! Run orchestration
//!
//! Exactly one crawl runs at a time. The run claim is taken synchronously in
//! `spawn_run` so callers get `AlreadyRunning` immediately; the crawl itself
//! happens on a background task whose guard releases the claim however the
//! task ends.

use crate::crawler::pipeline::SourceCrawler;
use crate::crawler::status::RunState;
use crate::error::{Error, Result};
use crate::ingest::IngestionService;
use crate::models::Source;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runtime-mutable per-source enablement
pub struct SourceToggles {
    flags: HashMap<Source, AtomicBool>,
}

impl SourceToggles {
    pub fn new(enabled: impl Fn(Source) -> bool) -> Self {
        let flags = Source::all()
            .into_iter()
            .map(|source| (source, AtomicBool::new(enabled(source))))
            .collect();
        Self { flags }
    }

    pub fn is_enabled(&self, source: Source) -> bool {
        self.flags
            .get(&source)
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    pub fn set_enabled(&self, source: Source, enabled: bool) {
        if let Some(flag) = self.flags.get(&source) {
            flag.store(enabled, Ordering::Release);
        }
    }
}

/// Releases the run claim when the crawl task ends, panics included
struct FinishGuard(Arc<RunState>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

pub struct Orchestrator {
    crawlers: Vec<Arc<SourceCrawler>>,
    ingest: Arc<IngestionService>,
    run_state: Arc<RunState>,
    toggles: Arc<SourceToggles>,
}

impl Orchestrator {
    pub fn new(
        crawlers: Vec<Arc<SourceCrawler>>,
        ingest: Arc<IngestionService>,
        run_state: Arc<RunState>,
        toggles: Arc<SourceToggles>,
    ) -> Self {
        Self {
            crawlers,
            ingest,
            run_state,
            toggles,
        }
    }

    pub fn run_state(&self) -> &Arc<RunState> {
        &self.run_state
    }

    pub fn toggles(&self) -> &Arc<SourceToggles> {
        &self.toggles
    }

    /// Start a crawl run in the background
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyRunning` when a run is in progress.
    pub fn spawn_run(&self) -> Result<JoinHandle<()>> {
        if !self.run_state.try_start() {
            return Err(Error::AlreadyRunning);
        }

        let crawlers = self.crawlers.clone();
        let ingest = Arc::clone(&self.ingest);
        let run_state = Arc::clone(&self.run_state);
        let toggles = Arc::clone(&self.toggles);

        Ok(tokio::spawn(async move {
            let _guard = FinishGuard(Arc::clone(&run_state));
            tracing::info!("crawl run started");

            let latest = match ingest.prepare_run().and_then(|()| ingest.latest_published()) {
                Ok(latest) => latest,
                Err(e) => {
                    tracing::error!(error = %e, "run aborted before crawling");
                    return;
                }
            };

            for crawler in crawlers {
                if run_state.is_stop_requested() {
                    tracing::info!("crawl run stopped");
                    return;
                }
                let source = crawler.source();
                if !toggles.is_enabled(source) {
                    tracing::debug!(%source, "source disabled, skipping");
                    continue;
                }

                let empty = HashMap::new();
                let latest_by_category = latest.get(&source).unwrap_or(&empty);
                if let Err(e) = crawler.run(latest_by_category).await {
                    tracing::error!(%source, error = %e, "source crawl failed");
                }
            }
            tracing::info!("crawl run finished");
        }))
    }
}
