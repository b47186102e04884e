//! Page controller capability for discovery and fallback scraping.
//!
//! The engine only sees the [`PageController`] and [`PageSession`] traits;
//! page markup knowledge lives in the extractor scripts of [`extract`].
//! [`ChromeController`] drives a real Chromium instance, optionally through
//! a proxy picked from a [`ProxyPool`].

pub mod chrome;
pub mod controller;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod proxy;

pub use chrome::ChromeController;
pub use controller::{PageController, PageSession, SessionOptions, Viewport};
pub use error::{BrowserError, Result};
pub use extract::{ExtractorSpec, RawCandidate, RawPost, RawProfile};
pub use fingerprint::FingerprintConfig;
pub use proxy::ProxyPool;
