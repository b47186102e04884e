//! In-process job queue.
//!
//! Every submission becomes a spawned task that runs one batch through the
//! [`BatchOrchestrator`]. All jobs of a queue draw from one semaphore, so
//! `max_concurrency` caps scrapes across jobs, not per job. Callers keep the
//! returned [`JobId`], poll [`JobQueue::status`] and [`JobQueue::take`] the
//! result once it is finished.

use crate::error::{JobError, Result};
use scout_core::{BatchResult, Candidate, ScrapingConfig};
use scout_engine::BatchOrchestrator;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Identifier handed out on submission.
pub type JobId = Uuid;

/// Where a job stands.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Submitted and still running
    Pending,
    /// Finished; carries the batch outcomes
    Done(BatchResult),
    /// The job task itself died before producing a result
    Failed(String),
}

impl JobStatus {
    /// Whether the job has stopped, successfully or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

type JobTable = Arc<RwLock<HashMap<JobId, JobStatus>>>;

/// Runs scrape jobs on the tokio runtime and tracks their status.
pub struct JobQueue {
    orchestrator: Arc<BatchOrchestrator>,
    prefer_api: bool,
    limiter: Arc<Semaphore>,
    jobs: JobTable,
}

impl JobQueue {
    /// Create a queue whose jobs use the given API preference and share one
    /// concurrency ceiling. A ceiling of 0 is treated as 1.
    #[must_use]
    pub fn new(orchestrator: Arc<BatchOrchestrator>, prefer_api: bool, max_concurrency: usize) -> Self {
        if max_concurrency == 0 {
            tracing::warn!("max_concurrency of 0 requested, using 1");
        }
        Self {
            orchestrator,
            prefer_api,
            limiter: Arc::new(Semaphore::new(max_concurrency.max(1))),
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a queue from the `scraping` config section.
    #[must_use]
    pub fn from_config(orchestrator: Arc<BatchOrchestrator>, config: &ScrapingConfig) -> Self {
        Self::new(orchestrator, config.use_api, config.max_concurrency)
    }

    /// Submit a single-candidate job.
    pub fn enqueue_one(&self, candidate: Candidate) -> JobId {
        tracing::info!(handle = %candidate.handle, "Enqueueing scrape job");
        self.submit(vec![candidate])
    }

    /// Submit one job for the whole list.
    pub fn enqueue_batch(&self, candidates: Vec<Candidate>) -> JobId {
        tracing::info!("Enqueueing batch job for {} candidates", candidates.len());
        self.submit(candidates)
    }

    /// Current status of a job.
    pub fn status(&self, id: JobId) -> Result<JobStatus> {
        self.jobs
            .read()
            .expect("RwLock poisoned: another thread panicked while holding the lock")
            .get(&id)
            .cloned()
            .ok_or(JobError::UnknownJob(id))
    }

    /// Remove and return a finished job. A pending job stays queued and
    /// `Pending` is returned.
    pub fn take(&self, id: JobId) -> Result<JobStatus> {
        let mut jobs = self
            .jobs
            .write()
            .expect("RwLock poisoned: another thread panicked while holding the lock");
        match jobs.get(&id) {
            None => Err(JobError::UnknownJob(id)),
            Some(JobStatus::Pending) => Ok(JobStatus::Pending),
            Some(_) => Ok(jobs.remove(&id).unwrap_or(JobStatus::Pending)),
        }
    }

    /// Stop tracking a job. If it is still running its result is dropped on completion.
    pub fn discard(&self, id: JobId) {
        self.jobs
            .write()
            .expect("RwLock poisoned: another thread panicked while holding the lock")
            .remove(&id);
    }

    /// Number of jobs held in the table, finished or not.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.jobs
            .read()
            .expect("RwLock poisoned: another thread panicked while holding the lock")
            .len()
    }

    /// Number of jobs still running.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.jobs
            .read()
            .expect("RwLock poisoned: another thread panicked while holding the lock")
            .values()
            .filter(|s| !s.is_finished())
            .count()
    }

    fn submit(&self, candidates: Vec<Candidate>) -> JobId {
        let id = Uuid::new_v4();
        self.jobs
            .write()
            .expect("RwLock poisoned: another thread panicked while holding the lock")
            .insert(id, JobStatus::Pending);

        let orchestrator = Arc::clone(&self.orchestrator);
        let limiter = Arc::clone(&self.limiter);
        let prefer_api = self.prefer_api;
        let worker = tokio::spawn(async move {
            orchestrator
                .run_batch_limited(candidates, prefer_api, limiter)
                .await
        });

        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            let status = match worker.await {
                Ok(result) => {
                    tracing::info!(
                        job = %id,
                        "Job finished: {} succeeded, {} failed",
                        result.successful,
                        result.failed
                    );
                    JobStatus::Done(result)
                }
                Err(e) => {
                    tracing::error!(job = %id, "Job task failed: {}", e);
                    JobStatus::Failed(e.to_string())
                }
            };
            finish(&jobs, id, status);
        });

        id
    }
}

fn finish(jobs: &JobTable, id: JobId, status: JobStatus) {
    let mut jobs = jobs
        .write()
        .expect("RwLock poisoned: another thread panicked while holding the lock");
    match jobs.get_mut(&id) {
        Some(slot) => *slot = status,
        None => tracing::debug!(job = %id, "Dropping result of discarded job"),
    }
}
