//! Scout Core - Foundation crate for the creator-scout workspace.
//!
//! This crate provides shared types, text parsers, error handling and
//! configuration management that all other scout crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Domain types (`Platform`, `Handle`, `Candidate`, `ProfileRecord`, `ScrapeOutcome`)
//! - [`parse`] - Parsers for human-readable counts, emails and engagement
//!
//! # Example
//!
//! ```rust
//! use scout_core::{AppConfig, Platform};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let handle = Platform::Instagram.parse_profile_url("https://www.instagram.com/natgeo/")?;
//! assert_eq!(handle.as_str(), "natgeo");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod parse;
pub mod types;

// Re-export commonly used types
pub use config::{
    parse_proxy_url, AppConfig, BrowserConfig, Credentials, CycleConfig, DiscoveryConfig,
    ProxyConfig, RateLimitConfig, ScrapingConfig, StorageConfig,
};
pub use error::{ConfigError, ConfigResult, Result, ScoutError};
pub use types::{
    BatchItem, BatchResult, Candidate, Handle, Platform, Post, ProfileRecord, ScrapeErrorKind,
    ScrapeMethod, ScrapeOutcome, MAX_POSTS,
};
