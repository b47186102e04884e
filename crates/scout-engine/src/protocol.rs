//! Two-tier profile scraping: credentialed API first, page extraction once as fallback.

use async_trait::async_trait;
use scout_api::{ApiProfile, ProfileApi};
use scout_browser::extract::parse_profile;
use scout_browser::{ExtractorSpec, PageController, RawProfile, SessionOptions};
use scout_budget::{BudgetRegistry, Method};
use scout_core::parse::{engagement_rate, extract_email, parse_timestamp, truncate_caption};
use scout_core::{
    Handle, Platform, Post, ProfileRecord, ScrapeErrorKind, ScrapeMethod, ScrapeOutcome, MAX_POSTS,
};
use scout_niche::NicheClassifier;
use std::collections::HashMap;
use std::sync::Arc;

/// Posts kept in `top_posts`, ranked by engagement.
pub const TOP_POSTS: usize = 3;

/// Posts kept in `recent_posts`, newest first.
pub const RECENT_POSTS: usize = 5;

/// Resolves one account to a [`ScrapeOutcome`]. Never fails with an `Err`.
#[async_trait]
pub trait ProfileScraper: Send + Sync {
    /// Scrape the profile at `profile_url` on `source`, trying the API first when `prefer_api` is set.
    async fn scrape(&self, source: Platform, profile_url: &str, prefer_api: bool) -> ScrapeOutcome;
}

/// API-then-fallback scrape protocol.
///
/// A platform takes the API path only when a client for it was registered,
/// which happens only when credentials for it are configured.
pub struct ScrapeProtocol {
    apis: HashMap<Platform, Arc<dyn ProfileApi>>,
    controller: Arc<dyn PageController>,
    budgets: BudgetRegistry,
    classifier: Arc<dyn NicheClassifier>,
    store_raw: bool,
}

impl ScrapeProtocol {
    /// Create a protocol with no API clients; every scrape uses page extraction.
    #[must_use]
    pub fn new(
        controller: Arc<dyn PageController>,
        budgets: BudgetRegistry,
        classifier: Arc<dyn NicheClassifier>,
    ) -> Self {
        Self {
            apis: HashMap::new(),
            controller,
            budgets,
            classifier,
            store_raw: false,
        }
    }

    /// Register an API client for its platform, replacing any previous one.
    #[must_use]
    pub fn with_api(mut self, api: Arc<dyn ProfileApi>) -> Self {
        self.apis.insert(api.platform(), api);
        self
    }

    /// Register several API clients.
    #[must_use]
    pub fn with_apis(self, apis: impl IntoIterator<Item = Arc<dyn ProfileApi>>) -> Self {
        apis.into_iter().fold(self, Self::with_api)
    }

    /// Keep raw API responses or page extraction output on records.
    #[must_use]
    pub fn with_store_raw(mut self, store_raw: bool) -> Self {
        self.store_raw = store_raw;
        self
    }

    /// Whether an API client is registered for `platform`.
    #[must_use]
    pub fn has_api(&self, platform: Platform) -> bool {
        self.apis.contains_key(&platform)
    }

    async fn scrape_api(
        &self,
        api: &dyn ProfileApi,
        handle: &Handle,
        profile_url: &str,
    ) -> Result<ProfileRecord, String> {
        let platform = api.platform();
        self.budgets.wait_for(platform.as_str(), Method::Api, 1).await;

        let id = api
            .resolve_identity(handle)
            .await
            .map_err(|e| format!("identity lookup failed: {e}"))?
            .ok_or_else(|| format!("no {platform} account for handle '{handle}'"))?;
        let profile = api
            .fetch_profile(&id)
            .await
            .map_err(|e| format!("profile fetch failed: {e}"))?
            .ok_or_else(|| format!("{platform} returned no profile for id '{id}'"))?;
        let posts = api
            .fetch_recent_content(&id, MAX_POSTS)
            .await
            .map_err(|e| format!("content fetch failed: {e}"))?;

        let record = self.record_from_api(platform, handle.clone(), profile_url, profile);
        self.finish(record, posts)
    }

    fn record_from_api(
        &self,
        platform: Platform,
        handle: Handle,
        profile_url: &str,
        profile: ApiProfile,
    ) -> ProfileRecord {
        let mut record = ProfileRecord::new(platform, handle, profile_url);
        record.display_name = profile.display_name;
        record.bio = profile.bio;
        record.location = profile.location;
        record.follower_count = profile.follower_count;
        record.following_count = profile.following_count;
        record.post_count = profile.post_count;
        record.avatar_url = profile.avatar_url;
        if self.store_raw {
            record.raw = Some(profile.raw);
        }
        record
    }

    async fn scrape_page(
        &self,
        platform: Platform,
        handle: &Handle,
        profile_url: &str,
    ) -> Result<ProfileRecord, String> {
        self.budgets
            .wait_for(platform.as_str(), Method::Scraping, 1)
            .await;

        let mut session = self
            .controller
            .open(profile_url, &SessionOptions::profile(platform))
            .await
            .map_err(|e| format!("failed to open profile page: {e}"))?;

        let value = session
            .evaluate(&ExtractorSpec::ProfileFields(platform))
            .await;
        if let Err(e) = session.close().await {
            tracing::debug!(handle = %handle, "Failed to close profile page: {}", e);
        }

        let value = value.map_err(|e| e.to_string())?;
        let raw = self.store_raw.then(|| value.clone());
        let extracted = parse_profile(value).map_err(|e| e.to_string())?;

        let (mut record, posts) = Self::record_from_page(platform, handle.clone(), profile_url, extracted);
        record.raw = raw;
        self.finish(record, posts)
    }

    fn record_from_page(
        platform: Platform,
        handle: Handle,
        profile_url: &str,
        page: RawProfile,
    ) -> (ProfileRecord, Vec<Post>) {
        let mut record = ProfileRecord::new(platform, handle, profile_url);
        record.display_name = page.display_name.filter(|s| !s.trim().is_empty());
        record.bio = page.bio.filter(|s| !s.trim().is_empty());
        record.location = page.location.filter(|s| !s.trim().is_empty());
        record.follower_count = page.followers;
        record.following_count = page.following;
        record.post_count = page.posts;
        record.avatar_url = page.avatar_url.filter(|s| !s.is_empty());

        let posts = page
            .recent_posts
            .into_iter()
            .filter(|p| !p.url.is_empty())
            .take(MAX_POSTS)
            .map(|p| Post {
                url: p.url,
                timestamp: p.timestamp.as_deref().and_then(parse_timestamp),
                likes: p.likes,
                comments: p.comments,
                caption: p.caption.as_deref().map(truncate_caption),
                engagement_rate: None,
            })
            .collect();
        (record, posts)
    }

    /// Derive niche, contact email, engagement and the two bounded post lists.
    fn finish(&self, mut record: ProfileRecord, mut posts: Vec<Post>) -> Result<ProfileRecord, String> {
        let bio = record.bio.clone().unwrap_or_default();
        let captions: Vec<String> = posts.iter().filter_map(|p| p.caption.clone()).collect();

        if record.niche.is_none() {
            record.niche = Some(self.classifier.classify(&bio, &captions).label);
        }
        if record.public_contact_email.is_none() {
            record.public_contact_email = extract_email(&bio);
        }

        let followers = record.follower_count.unwrap_or(0);
        for post in &mut posts {
            let has_counts = post.likes.is_some() || post.comments.is_some();
            if post.engagement_rate.is_none() && has_counts {
                post.engagement_rate = engagement_rate(post.interactions(), followers);
            }
        }
        if record.engagement_rate.is_none() {
            record.engagement_rate = overall_engagement(&posts, followers);
        }

        record.top_posts = top_posts(&posts, TOP_POSTS);
        record.recent_posts = recent_posts(&posts, RECENT_POSTS);

        record.validate().map_err(|e| e.to_string())?;
        Ok(record)
    }
}

#[async_trait]
impl ProfileScraper for ScrapeProtocol {
    async fn scrape(&self, source: Platform, profile_url: &str, prefer_api: bool) -> ScrapeOutcome {
        let handle = match source.parse_profile_url(profile_url) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(platform = %source, "Rejected profile URL: {}", e);
                return ScrapeOutcome::failure(ScrapeErrorKind::InvalidInput, e.to_string(), None);
            }
        };

        if prefer_api {
            if let Some(api) = self.apis.get(&source) {
                match self.scrape_api(api.as_ref(), &handle, profile_url).await {
                    Ok(record) => {
                        tracing::info!(platform = %source, handle = %handle, method = "api", "Scraped profile");
                        return ScrapeOutcome::success(record, ScrapeMethod::Api);
                    }
                    Err(message) => {
                        tracing::warn!(
                            platform = %source,
                            handle = %handle,
                            "API scrape failed, falling back to page extraction: {}",
                            message
                        );
                    }
                }
            } else {
                tracing::debug!(platform = %source, "No API credentials, using page extraction");
            }
        }

        match self.scrape_page(source, &handle, profile_url).await {
            Ok(record) => {
                tracing::info!(platform = %source, handle = %handle, method = "fallback", "Scraped profile");
                ScrapeOutcome::success(record, ScrapeMethod::Fallback)
            }
            Err(message) => {
                tracing::warn!(platform = %source, handle = %handle, "Page extraction failed: {}", message);
                ScrapeOutcome::failure(
                    ScrapeErrorKind::ExtractionError,
                    message,
                    Some(ScrapeMethod::Fallback),
                )
            }
        }
    }
}

/// `min(1, Σ interactions / (followers × posts))` over posts that carry counts.
#[allow(clippy::cast_precision_loss)]
fn overall_engagement(posts: &[Post], followers: u64) -> Option<f64> {
    let counted: Vec<&Post> = posts
        .iter()
        .filter(|p| p.likes.is_some() || p.comments.is_some())
        .collect();
    if counted.is_empty() || followers == 0 {
        return None;
    }
    let total: u64 = counted.iter().map(|p| p.interactions()).sum();
    Some((total as f64 / (followers as f64 * counted.len() as f64)).clamp(0.0, 1.0))
}

/// Highest interactions first; ties keep extraction order.
fn top_posts(posts: &[Post], limit: usize) -> Vec<Post> {
    let mut ranked = posts.to_vec();
    ranked.sort_by(|a, b| b.interactions().cmp(&a.interactions()));
    ranked.truncate(limit);
    ranked
}

/// Newest first, undated posts last; ties keep extraction order.
fn recent_posts(posts: &[Post], limit: usize) -> Vec<Post> {
    let mut ranked = posts.to_vec();
    ranked.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    ranked.truncate(limit);
    ranked
}
