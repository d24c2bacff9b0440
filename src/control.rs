//! Operator control surface
//!
//! The one place run lifecycle, source toggles, and auto-scheduling are
//! exposed together. Embedders and the CLI both go through this facade.

use crate::crawler::Orchestrator;
use crate::error::{Error, Result};
use crate::models::Source;
use crate::scheduler::{AutoScheduler, ScheduleStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Snapshot of the crawl run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub in_progress: bool,
    pub stop_requested: bool,
}

pub struct CrawlerControl {
    orchestrator: Arc<Orchestrator>,
    scheduler: Arc<AutoScheduler>,
}

impl CrawlerControl {
    pub fn new(orchestrator: Arc<Orchestrator>, scheduler: Arc<AutoScheduler>) -> Self {
        Self {
            orchestrator,
            scheduler,
        }
    }

    /// Start a crawl run in the background
    ///
    /// # Errors
    ///
    /// `Error::AlreadyRunning` when a run is in progress.
    pub fn start_run(&self) -> Result<JoinHandle<()>> {
        self.orchestrator.spawn_run()
    }

    /// Ask the running crawl to stop at the next checkpoint
    ///
    /// # Errors
    ///
    /// `Error::NotRunning` when no run is in progress.
    pub fn stop_run(&self) -> Result<()> {
        let run_state = self.orchestrator.run_state();
        if !run_state.is_in_progress() {
            return Err(Error::NotRunning);
        }
        run_state.request_stop();
        tracing::info!("crawl stop requested");
        Ok(())
    }

    pub fn run_status(&self) -> RunStatus {
        let run_state = self.orchestrator.run_state();
        RunStatus {
            in_progress: run_state.is_in_progress(),
            stop_requested: run_state.is_stop_requested(),
        }
    }

    pub fn source_enabled(&self, source: Source) -> bool {
        self.orchestrator.toggles().is_enabled(source)
    }

    /// Takes effect from the next source the orchestrator reaches
    pub fn set_source_enabled(&self, source: Source, enabled: bool) {
        self.orchestrator.toggles().set_enabled(source, enabled);
        tracing::info!(%source, enabled, "source toggled");
    }

    pub fn auto_schedule_status(&self) -> ScheduleStatus {
        self.scheduler.status()
    }

    /// # Errors
    ///
    /// `Error::IntervalZero` for a zero duration.
    pub fn set_auto_schedule_interval(&self, interval: Duration) -> Result<()> {
        self.scheduler.set_interval(interval)
    }

    pub fn enable_auto_schedule(&self) {
        self.scheduler.enable();
    }

    pub fn disable_auto_schedule(&self) {
        self.scheduler.disable();
    }
}
