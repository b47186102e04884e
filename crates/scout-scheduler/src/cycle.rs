//! The auto cycle: discover, skip known profiles, scrape, store.

use crate::jobs::{JobId, JobQueue, JobStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scout_core::{Candidate, CycleConfig};
use scout_db::{ProfileStore, StoreStats};
use scout_engine::{save_candidates_csv, DiscoveryEngine, DiscoveryReport};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How often a cycle checks on its jobs.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Produces the candidates of one cycle.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Run one discovery pass: the feed, then each hashtag, deduplicated across both.
    async fn gather(&self, hashtags: &[String]) -> DiscoveryReport;
}

#[async_trait]
impl CandidateSource for DiscoveryEngine {
    async fn gather(&self, hashtags: &[String]) -> DiscoveryReport {
        let mut run = self.start_run();
        let mut report = run.feed().await;
        if hashtags.is_empty() {
            return report;
        }

        let tagged = run.tags(hashtags).await;
        match (report.error.take(), tagged.error) {
            (Some(feed_error), Some(_)) => DiscoveryReport {
                candidates: Vec::new(),
                error: Some(feed_error),
            },
            _ => {
                report.candidates.extend(tagged.candidates);
                report
            }
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 1-based cycle counter
    pub cycle_number: u64,
    /// When the cycle began
    pub started_at: DateTime<Utc>,
    /// Wall time of the cycle
    pub duration: Duration,
    /// Candidates emitted by discovery
    pub discovered: usize,
    /// Candidates skipped because the store already had them
    pub already_stored: usize,
    /// Candidates handed to the job queue
    pub submitted: usize,
    /// Jobs created for them
    pub jobs: usize,
    /// Scrapes that produced a profile
    pub successful: usize,
    /// Scrapes that did not
    pub failed: usize,
    /// Candidates whose job had not finished when the wait ran out
    pub pending: usize,
    /// Profiles written to the store
    pub stored: usize,
    /// Store counts after the cycle
    pub stats: Option<StoreStats>,
    /// Why the cycle stopped early
    pub error: Option<String>,
}

impl CycleReport {
    fn new(cycle_number: u64) -> Self {
        Self {
            cycle_number,
            started_at: Utc::now(),
            duration: Duration::ZERO,
            discovered: 0,
            already_stored: 0,
            submitted: 0,
            jobs: 0,
            successful: 0,
            failed: 0,
            pending: 0,
            stored: 0,
            stats: None,
            error: None,
        }
    }
}

/// Drives discovery, scraping and storage, once or on an interval.
pub struct AutoCycle {
    source: Arc<dyn CandidateSource>,
    queue: Arc<JobQueue>,
    store: Arc<dyn ProfileStore>,
    config: CycleConfig,
    hashtags: Vec<String>,
    export_path: Option<PathBuf>,
}

impl AutoCycle {
    /// Create a cycle with no hashtags and no CSV export.
    #[must_use]
    pub fn new(
        source: Arc<dyn CandidateSource>,
        queue: Arc<JobQueue>,
        store: Arc<dyn ProfileStore>,
        config: CycleConfig,
    ) -> Self {
        Self {
            source,
            queue,
            store,
            config,
            hashtags: Vec::new(),
            export_path: None,
        }
    }

    /// Tags browsed after the feed on every cycle.
    #[must_use]
    pub fn with_hashtags(mut self, hashtags: Vec<String>) -> Self {
        self.hashtags = hashtags;
        self
    }

    /// Write each cycle's discovered candidates to a CSV file.
    #[must_use]
    pub fn with_csv_export(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = Some(path.into());
        self
    }

    /// Run one cycle. Failures are reported in the returned [`CycleReport`].
    pub async fn run_cycle(&self, cycle_number: u64) -> CycleReport {
        tracing::info!("Starting cycle {}", cycle_number);
        let clock = Instant::now();
        let mut report = CycleReport::new(cycle_number);

        let discovery = self.source.gather(&self.hashtags).await;
        if let Some(e) = discovery.error {
            tracing::error!("Cycle {}: discovery failed: {}", cycle_number, e);
            report.error = Some(e.to_string());
            report.duration = clock.elapsed();
            return report;
        }
        report.discovered = discovery.candidates.len();

        if let Some(path) = &self.export_path {
            if let Err(e) = save_candidates_csv(path, &discovery.candidates) {
                tracing::warn!("Failed to export candidates to {}: {}", path.display(), e);
            }
        }

        let fresh = self.unstored(discovery.candidates).await;
        report.already_stored = report.discovered - fresh.len();

        if fresh.is_empty() {
            tracing::info!("Cycle {}: no new creators discovered", cycle_number);
        } else {
            report.submitted = fresh.len();
            let jobs = self.submit(fresh);
            report.jobs = jobs.len();
            self.collect(&jobs, &mut report).await;
        }

        report.stats = match self.store.stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!("Failed to read store stats: {}", e);
                None
            }
        };
        report.duration = clock.elapsed();
        tracing::info!(
            discovered = report.discovered,
            successful = report.successful,
            failed = report.failed,
            stored = report.stored,
            "Cycle {} completed in {:?}",
            cycle_number,
            report.duration
        );
        report
    }

    /// Run cycles every `cycle_interval_secs` until Ctrl-C.
    pub async fn run_continuous(&self) -> u64 {
        self.run_until(shutdown_signal()).await
    }

    /// Run cycles every `cycle_interval_secs` until `shutdown` resolves.
    ///
    /// A cycle in progress is abandoned on shutdown. Returns the number of
    /// completed cycles.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) -> u64 {
        let interval = Duration::from_secs(self.config.cycle_interval_secs);
        tokio::pin!(shutdown);
        let mut completed = 0;

        loop {
            let cycle_number = completed + 1;
            tokio::select! {
                report = self.run_cycle(cycle_number) => {
                    completed = cycle_number;
                    log_summary(&report);
                }
                () = &mut shutdown => break,
            }

            tracing::info!("Waiting {:?} before next cycle", interval);
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = &mut shutdown => break,
            }
        }

        tracing::info!("Auto cycle stopped after {} cycles", completed);
        completed
    }

    async fn unstored(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut fresh = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match self.store.exists(&candidate.profile_url).await {
                Ok(true) => {
                    tracing::debug!(handle = %candidate.handle, "Already stored, skipping");
                }
                Ok(false) => fresh.push(candidate),
                Err(e) => {
                    tracing::warn!(handle = %candidate.handle, "Store lookup failed: {}", e);
                    fresh.push(candidate);
                }
            }
        }
        fresh
    }

    fn submit(&self, candidates: Vec<Candidate>) -> Vec<(JobId, usize)> {
        if self.config.job_per_candidate {
            candidates
                .into_iter()
                .map(|c| (self.queue.enqueue_one(c), 1))
                .collect()
        } else {
            let count = candidates.len();
            vec![(self.queue.enqueue_batch(candidates), count)]
        }
    }

    async fn collect(&self, jobs: &[(JobId, usize)], report: &mut CycleReport) {
        let deadline = Instant::now() + Duration::from_secs(self.config.max_wait_time_secs);
        tracing::info!("Waiting for {} jobs to complete", jobs.len());

        let statuses = loop {
            let statuses: Vec<(JobStatus, usize)> = jobs
                .iter()
                .map(|&(id, count)| (self.queue.status(id).unwrap_or(JobStatus::Pending), count))
                .collect();

            let unfinished = statuses.iter().filter(|(s, _)| !s.is_finished()).count();
            if unfinished == 0 {
                break statuses;
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!("Gave up waiting on {} unfinished jobs", unfinished);
                break statuses;
            }
            tracing::info!("Jobs status: {} of {} pending", unfinished, jobs.len());
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        };

        for (&(id, _), (status, count)) in jobs.iter().zip(statuses) {
            if status.is_finished() {
                let _ = self.queue.take(id);
            } else {
                self.queue.discard(id);
            }
            match status {
                JobStatus::Done(result) => {
                    report.successful += result.successful;
                    report.failed += result.failed;
                    for profile in result.profiles() {
                        match self.store.upsert(profile).await {
                            Ok(_) => report.stored += 1,
                            Err(e) => {
                                tracing::warn!(handle = %profile.handle, "Failed to store profile: {}", e);
                            }
                        }
                    }
                }
                JobStatus::Failed(_) => report.failed += count,
                JobStatus::Pending => report.pending += count,
            }
        }
    }
}

fn log_summary(report: &CycleReport) {
    tracing::info!("Cycle {} results:", report.cycle_number);
    tracing::info!("  - Creators discovered: {}", report.discovered);
    tracing::info!("  - Already stored: {}", report.already_stored);
    tracing::info!("  - Jobs enqueued: {}", report.jobs);
    tracing::info!("  - Scrapes succeeded: {}", report.successful);
    tracing::info!("  - Scrapes failed: {}", report.failed);
    tracing::info!("  - Profiles stored: {}", report.stored);
    tracing::info!("  - Duration: {:.2}s", report.duration.as_secs_f64());
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
