//! Fixed-delay auto-crawl scheduler
//!
//! The first crawl starts as soon as the scheduler is enabled; after that
//! the delay runs between the end of one crawl and the start of the next,
//! so slow runs never pile up. The interval is re-read every cycle and can
//! be changed while the scheduler is live.

use crate::crawler::Orchestrator;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Scheduler state as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleStatus {
    pub enabled: bool,
    pub interval: Option<Duration>,
}

pub struct AutoScheduler {
    orchestrator: Arc<Orchestrator>,
    interval: Mutex<Option<Duration>>,
    enabled: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AutoScheduler {
    pub fn new(orchestrator: Arc<Orchestrator>, interval: Option<Duration>) -> Self {
        Self {
            orchestrator,
            interval: Mutex::new(interval),
            enabled: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    pub fn status(&self) -> ScheduleStatus {
        ScheduleStatus {
            enabled: self.enabled.load(Ordering::Acquire),
            interval: *lock(&self.interval),
        }
    }

    /// Change the delay between runs; takes effect from the next cycle
    ///
    /// # Errors
    ///
    /// Returns `Error::IntervalZero` for a zero duration.
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(Error::IntervalZero);
        }
        *lock(&self.interval) = Some(interval);
        Ok(())
    }

    /// Start the recurring crawl loop; no-op when already enabled
    ///
    /// Stays disabled, with a warning, when no usable interval is set.
    pub fn enable(self: &Arc<Self>) {
        if self.enabled.swap(true, Ordering::AcqRel) {
            return;
        }
        match *lock(&self.interval) {
            Some(interval) if !interval.is_zero() => {
                tracing::info!(?interval, "auto crawl enabled");
            }
            _ => {
                self.enabled.store(false, Ordering::Release);
                tracing::warn!("auto crawl interval missing or zero, staying disabled");
                return;
            }
        }

        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            scheduler.run_loop().await;
        });
        *lock(&self.task) = Some(handle);
    }

    /// Stop the recurring loop; any run already in flight keeps going
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
        tracing::info!("auto crawl disabled");
    }

    async fn run_loop(&self) {
        // First run fires right away; the delay separates completions
        loop {
            if !self.enabled.load(Ordering::Acquire) {
                return;
            }

            match self.orchestrator.spawn_run() {
                Ok(handle) => {
                    // Fixed delay counts from run completion
                    if handle.await.is_err() {
                        tracing::error!("scheduled crawl task panicked");
                    }
                }
                Err(Error::AlreadyRunning) => {
                    tracing::warn!("scheduled crawl skipped, run already in progress");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduled crawl failed to start");
                }
            }

            let Some(interval) = *lock(&self.interval) else {
                tracing::warn!("auto crawl interval cleared, stopping");
                self.enabled.store(false, Ordering::Release);
                return;
            };
            tokio::time::sleep(interval).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{RunState, SourceToggles};
    use crate::ingest::IngestionService;
    use crate::models::{ArticleStatus, Category, NewsArticle, Source};
    use crate::storage::{ArticleStore, SqliteArticleStore};
    use std::collections::HashSet;

    fn scheduler_with_store(
        interval: Option<Duration>,
    ) -> (Arc<AutoScheduler>, Arc<SqliteArticleStore>) {
        let store = Arc::new(SqliteArticleStore::in_memory().unwrap());
        let ingest = Arc::new(IngestionService::new(
            Arc::clone(&store) as Arc<dyn ArticleStore>
        ));
        let orchestrator = Arc::new(Orchestrator::new(
            vec![],
            ingest,
            Arc::new(RunState::new()),
            Arc::new(SourceToggles::new(|_| true)),
        ));
        (Arc::new(AutoScheduler::new(orchestrator, interval)), store)
    }

    fn scheduler(interval: Option<Duration>) -> Arc<AutoScheduler> {
        scheduler_with_store(interval).0
    }

    fn pending_article() -> NewsArticle {
        NewsArticle {
            id: None,
            title: "Заголовок".to_string(),
            summary: "Первое предложение.".to_string(),
            content: "Первое предложение. Остальной текст.".to_string(),
            category: Category::Politics,
            keywords: HashSet::new(),
            media_urls: HashSet::new(),
            url: "https://aif.ru/politics/a".to_string(),
            status: ArticleStatus::New,
            published_at: chrono::NaiveDate::from_ymd_opt(2025, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            source: Source::AifRu,
        }
    }

    #[test]
    fn test_set_interval_rejects_zero() {
        let scheduler = scheduler(None);
        assert!(matches!(
            scheduler.set_interval(Duration::ZERO),
            Err(Error::IntervalZero)
        ));
        scheduler.set_interval(Duration::from_secs(60)).unwrap();
        assert_eq!(scheduler.status().interval, Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_enable_without_interval_stays_disabled() {
        let scheduler = scheduler(None);
        scheduler.enable();
        assert!(!scheduler.status().enabled);
    }

    #[tokio::test]
    async fn test_enable_and_disable() {
        let scheduler = scheduler(Some(Duration::from_secs(3600)));
        scheduler.enable();
        assert!(scheduler.status().enabled);

        // Second enable is a no-op
        scheduler.enable();
        assert!(scheduler.status().enabled);

        scheduler.disable();
        assert!(!scheduler.status().enabled);
    }

    #[tokio::test]
    async fn test_first_run_fires_without_waiting_an_interval() {
        let (scheduler, store) = scheduler_with_store(Some(Duration::from_secs(3600)));
        store.insert_batch(&[pending_article()]).unwrap();
        assert_eq!(store.count_by_status().unwrap().new, 1);

        scheduler.enable();

        // The hour-long delay only separates runs; the first one promotes
        // the pending article right away
        let promoted = async {
            while store.count_by_status().unwrap().active != 1 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), promoted)
            .await
            .expect("first scheduled run never started");

        scheduler.disable();
    }
}
