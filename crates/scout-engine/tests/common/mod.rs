//! Hand-written capability mocks shared by the engine integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use scout_api::{ApiError, ApiProfile, ProfileApi};
use scout_browser::{BrowserError, ExtractorSpec, PageController, PageSession, SessionOptions};
use scout_budget::{BudgetRegistry, BudgetSpec, Method};
use scout_core::{Handle, Platform, Post};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Budgets generous enough that tests never wait on them.
pub fn open_budgets() -> BudgetRegistry {
    let spec = BudgetSpec::new(100_000, Duration::from_secs(1));
    let mut registry = BudgetRegistry::with_defaults();
    for platform in Platform::ALL {
        registry = registry
            .with_budget(platform.as_str(), Method::Api, spec)
            .with_budget(platform.as_str(), Method::Scraping, spec);
    }
    registry
}

/// Counters observed across every session a [`MockPages`] opened.
#[derive(Default)]
pub struct PageStats {
    pub opens: AtomicUsize,
    pub feed_evaluations: AtomicUsize,
    pub profile_evaluations: AtomicUsize,
    pub reloads: AtomicUsize,
    pub closes: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub opened_urls: Mutex<Vec<String>>,
}

impl PageStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

type FeedFn = dyn Fn(usize, usize) -> Value + Send + Sync;
type ProfileFn = dyn Fn(&str) -> Option<Value> + Send + Sync;

/// Page controller with scripted feed and profile pages.
///
/// The feed script receives `(step, reloads)` for the session; the profile
/// script receives the page URL and returns `None` for a broken page.
pub struct MockPages {
    pub stats: Arc<PageStats>,
    feed: Arc<FeedFn>,
    profile: Arc<ProfileFn>,
    fail_open: bool,
    hold: Duration,
}

impl MockPages {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(PageStats::default()),
            feed: Arc::new(|_: usize, _: usize| Value::Null),
            profile: Arc::new(|_: &str| -> Option<Value> { None }),
            fail_open: false,
            hold: Duration::ZERO,
        }
    }

    pub fn with_feed(mut self, feed: impl Fn(usize, usize) -> Value + Send + Sync + 'static) -> Self {
        self.feed = Arc::new(feed);
        self
    }

    pub fn with_profile(mut self, profile: impl Fn(&str) -> Option<Value> + Send + Sync + 'static) -> Self {
        self.profile = Arc::new(profile);
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Time each evaluation takes.
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }
}

#[async_trait]
impl PageController for MockPages {
    async fn open(&self, url: &str, _options: &SessionOptions) -> scout_browser::Result<Box<dyn PageSession>> {
        if self.fail_open {
            return Err(BrowserError::NavigationError(format!("cannot reach {url}")));
        }
        self.stats
            .opened_urls
            .lock()
            .expect("lock opened urls")
            .push(url.to_string());
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        let active = self.stats.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_active.fetch_max(active, Ordering::SeqCst);

        Ok(Box::new(MockSession {
            url: url.to_string(),
            stats: Arc::clone(&self.stats),
            feed: Arc::clone(&self.feed),
            profile: Arc::clone(&self.profile),
            hold: self.hold,
            step: 0,
            reloads: 0,
            closed: false,
        }))
    }
}

struct MockSession {
    url: String,
    stats: Arc<PageStats>,
    feed: Arc<FeedFn>,
    profile: Arc<ProfileFn>,
    hold: Duration,
    step: usize,
    reloads: usize,
    closed: bool,
}

impl MockSession {
    fn check_open(&self) -> scout_browser::Result<()> {
        if self.closed {
            Err(BrowserError::SessionClosed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageSession for MockSession {
    async fn scroll_to_bottom(&mut self) -> scout_browser::Result<()> {
        self.check_open()
    }

    async fn evaluate(&mut self, spec: &ExtractorSpec) -> scout_browser::Result<Value> {
        self.check_open()?;
        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }
        match spec {
            ExtractorSpec::FeedCandidates(_) => {
                self.stats.feed_evaluations.fetch_add(1, Ordering::SeqCst);
                let value = (self.feed)(self.step, self.reloads);
                self.step += 1;
                Ok(value)
            }
            ExtractorSpec::ProfileFields(_) => {
                self.stats.profile_evaluations.fetch_add(1, Ordering::SeqCst);
                (self.profile)(&self.url).ok_or_else(|| {
                    BrowserError::ExtractionError(format!("selectors matched nothing on {}", self.url))
                })
            }
        }
    }

    async fn reload(&mut self) -> scout_browser::Result<()> {
        self.check_open()?;
        self.reloads += 1;
        self.stats.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> scout_browser::Result<()> {
        self.check_open()?;
        self.closed = true;
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        self.stats.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Feed entry with a visible follower count.
pub fn feed_entry(handle: &str, followers: u64, bio: &str) -> Value {
    json!({ "handle": handle, "display_name": handle, "bio": bio, "followers": followers })
}

/// Profile page extraction output.
pub fn profile_page(name: &str, followers: &str, bio: &str) -> Value {
    json!({
        "display_name": name,
        "bio": bio,
        "followers": followers,
        "following": "312",
        "posts": "1,204",
        "recent_posts": [
            { "url": "https://www.instagram.com/p/one/", "likes": 900, "comments": 100, "timestamp": "2024-03-01T10:00:00Z", "caption": "Morning workout" },
            { "url": "https://www.instagram.com/p/two/", "likes": 50, "comments": 5, "timestamp": "2024-03-05T10:00:00Z", "caption": "Gym day" }
        ]
    })
}

/// Which API call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nowhere,
    Identity,
    Profile,
    Content,
}

/// Scripted platform API that records how many calls it received.
pub struct MockApi {
    pub platform: Platform,
    pub fail_at: FailAt,
    pub calls: AtomicUsize,
    pub profile: ApiProfile,
    pub posts: Vec<Post>,
}

impl MockApi {
    pub fn new(platform: Platform, fail_at: FailAt) -> Self {
        Self {
            platform,
            fail_at,
            calls: AtomicUsize::new(0),
            profile: ApiProfile {
                display_name: Some("Api Name".to_string()),
                bio: Some("Tech reviews and coding tutorials. biz@api.dev".to_string()),
                follower_count: Some(1_000),
                raw: json!({ "id": "42" }),
                ..ApiProfile::default()
            },
            posts: Vec::new(),
        }
    }

    pub fn with_posts(mut self, posts: Vec<Post>) -> Self {
        self.posts = posts;
        self
    }

    fn call(&self, stage: FailAt) -> scout_api::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == stage {
            Err(ApiError::Status {
                platform: self.platform.to_string(),
                status: 500,
                message: format!("{stage:?} unavailable"),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProfileApi for MockApi {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn resolve_identity(&self, _handle: &Handle) -> scout_api::Result<Option<String>> {
        self.call(FailAt::Identity)?;
        Ok(Some("42".to_string()))
    }

    async fn fetch_profile(&self, _id: &str) -> scout_api::Result<Option<ApiProfile>> {
        self.call(FailAt::Profile)?;
        Ok(Some(self.profile.clone()))
    }

    async fn fetch_recent_content(&self, _id: &str, limit: usize) -> scout_api::Result<Vec<Post>> {
        self.call(FailAt::Content)?;
        Ok(self.posts.iter().take(limit).cloned().collect())
    }
}
