use crate::error::Result;
use crate::extract::ExtractorSpec;
use crate::fingerprint::{user_agent_for, FingerprintConfig};
use scout_core::Platform;

/// Browser viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub mobile: bool,
}

impl Viewport {
    /// Phone-sized viewport used for feed browsing.
    pub const MOBILE: Self = Self {
        width: 375,
        height: 812,
        mobile: true,
    };

    /// Default desktop viewport.
    pub const DESKTOP: Self = Self {
        width: 1920,
        height: 1080,
        mobile: false,
    };
}

/// How a new session should present itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub platform: Platform,
    pub user_agent: String,
    pub viewport: Viewport,
}

impl SessionOptions {
    /// Feed browsing session: platform user agent on a mobile viewport.
    pub fn feed(platform: Platform) -> Self {
        Self {
            platform,
            user_agent: user_agent_for(platform, &mut rand::thread_rng()).to_string(),
            viewport: Viewport::MOBILE,
        }
    }

    /// Profile page session: platform user agent on a desktop viewport.
    pub fn profile(platform: Platform) -> Self {
        let fingerprint = FingerprintConfig::for_platform(platform);
        Self {
            platform,
            user_agent: fingerprint.user_agent,
            viewport: fingerprint.viewport,
        }
    }
}

/// Opens page sessions.
///
/// Implementations must be shareable across tasks; each session they return
/// is owned by exactly one task.
#[async_trait::async_trait]
pub trait PageController: Send + Sync {
    /// Open a page at `url` and wait for it to load.
    async fn open(&self, url: &str, options: &SessionOptions) -> Result<Box<dyn PageSession>>;
}

/// One open page.
#[async_trait::async_trait]
pub trait PageSession: Send {
    /// Scroll to the bottom of the document to trigger lazy loading.
    async fn scroll_to_bottom(&mut self) -> Result<()>;

    /// Run an extractor against the current document.
    async fn evaluate(&mut self, spec: &ExtractorSpec) -> Result<serde_json::Value>;

    /// Reload the current document.
    async fn reload(&mut self) -> Result<()>;

    /// Close the page. Further calls fail with `SessionClosed`.
    async fn close(&mut self) -> Result<()>;
}
