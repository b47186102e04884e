//! Scout Engine - creator discovery and two-tier profile scraping.
//!
//! This crate wires the capabilities (page controller, platform APIs, niche
//! classifier) and the shared request budgets into the three workflows:
//!
//! - [`DiscoveryEngine`]: scroll a feed or tag pages and emit unique,
//!   filter-passing [`Candidate`](scout_core::Candidate)s
//! - [`ScrapeProtocol`]: resolve one account through the API, falling back
//!   to page extraction exactly once
//! - [`BatchOrchestrator`]: scrape many candidates with bounded concurrency
//!   and per-candidate failure isolation
//!
//! # Example
//!
//! ```rust,ignore
//! use scout_engine::{BatchOrchestrator, ScrapeProtocol};
//! use std::sync::Arc;
//!
//! let protocol = ScrapeProtocol::new(controller, budgets, classifier)
//!     .with_apis(scout_api::clients_from_credentials(&config.credentials, None)?);
//! let orchestrator = BatchOrchestrator::new(Arc::new(protocol));
//!
//! let result = orchestrator.run_batch(candidates, true, 4).await;
//! println!("{} of {} scraped", result.successful, result.total);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod discovery;
pub mod error;
pub mod filter;
pub mod loader;
pub mod orchestrator;
pub mod protocol;

pub use discovery::{DiscoveryEngine, DiscoveryReport, DiscoveryRun};
pub use error::{DiscoveryError, EngineError, Result};
pub use filter::CandidateFilter;
pub use loader::{load_candidates_csv, read_candidates, save_candidates_csv, write_candidates};
pub use orchestrator::{filter_by_source, BatchOrchestrator};
pub use protocol::{ProfileScraper, ScrapeProtocol, RECENT_POSTS, TOP_POSTS};
