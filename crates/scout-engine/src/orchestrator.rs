//! Bounded-concurrency batch scraping.

use crate::protocol::ProfileScraper;
use futures::stream::{FuturesUnordered, StreamExt};
use scout_core::{BatchItem, BatchResult, Candidate, Platform, ScrapeErrorKind, ScrapeOutcome};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fans a list of candidates out over a [`ProfileScraper`].
pub struct BatchOrchestrator {
    scraper: Arc<dyn ProfileScraper>,
}

impl BatchOrchestrator {
    /// Create an orchestrator over `scraper`.
    #[must_use]
    pub fn new(scraper: Arc<dyn ProfileScraper>) -> Self {
        Self { scraper }
    }

    /// Scrape every candidate with at most `max_concurrency` scrapes in flight.
    ///
    /// All units are spawned up front and gated by a semaphore. A unit that
    /// panics becomes a `Failure{Unexpected}` for its candidate; siblings are
    /// unaffected. Items are in completion order.
    pub async fn run_batch(
        &self,
        candidates: Vec<Candidate>,
        prefer_api: bool,
        max_concurrency: usize,
    ) -> BatchResult {
        let permits = if max_concurrency == 0 {
            tracing::warn!("max_concurrency of 0 requested, using 1");
            1
        } else {
            max_concurrency
        };
        self.run_batch_limited(candidates, prefer_api, Arc::new(Semaphore::new(permits)))
            .await
    }

    /// Like [`run_batch`](Self::run_batch), but draws permits from a caller-owned
    /// semaphore. Batches sharing one semaphore share one concurrency ceiling.
    pub async fn run_batch_limited(
        &self,
        candidates: Vec<Candidate>,
        prefer_api: bool,
        semaphore: Arc<Semaphore>,
    ) -> BatchResult {
        let total = candidates.len();
        tracing::info!(
            total,
            available_permits = semaphore.available_permits(),
            prefer_api,
            "Starting batch"
        );

        let mut running = FuturesUnordered::new();

        for candidate in candidates {
            let scraper = Arc::clone(&self.scraper);
            let semaphore = Arc::clone(&semaphore);
            let platform = candidate.platform;
            let profile_url = candidate.profile_url.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return ScrapeOutcome::failure(
                        ScrapeErrorKind::Unexpected,
                        "batch semaphore closed",
                        None,
                    );
                };
                scraper.scrape(platform, &profile_url, prefer_api).await
            });

            running.push(async move { (candidate, handle.await) });
        }

        let mut items = Vec::with_capacity(total);
        while let Some((candidate, joined)) = running.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    let message = if e.is_panic() {
                        format!("scrape task panicked: {}", panic_message(e.into_panic()))
                    } else {
                        format!("scrape task did not complete: {e}")
                    };
                    tracing::error!(handle = %candidate.handle, "{}", message);
                    ScrapeOutcome::failure(ScrapeErrorKind::Unexpected, message, None)
                }
            };
            items.push(BatchItem { candidate, outcome });
        }

        let result = BatchResult::from_items(total, items);
        tracing::info!(
            total = result.total,
            successful = result.successful,
            failed = result.failed,
            "Batch finished"
        );
        result
    }
}

/// Keep only candidates from `source`.
#[must_use]
pub fn filter_by_source(candidates: Vec<Candidate>, source: Platform) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| c.platform == source)
        .collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map_or_else(|| "unknown panic".to_string(), ToString::to_string),
    }
}
