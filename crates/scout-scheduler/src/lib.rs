//! Scout Scheduler
//!
//! Job submission and the recurring discovery cycle.
//!
//! - [`jobs`] - [`JobQueue`]: `enqueue_one`, `enqueue_batch` and `status` over spawned batch tasks
//! - [`cycle`] - [`AutoCycle`]: discover, skip stored profiles, scrape, store, repeat

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cycle;
pub mod error;
pub mod jobs;

pub use cycle::{AutoCycle, CandidateSource, CycleReport, POLL_INTERVAL};
pub use error::{JobError, Result};
pub use jobs::{JobId, JobQueue, JobStatus};
