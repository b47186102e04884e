//! Feed discovery.
//!
//! A [`DiscoveryEngine`] drives one page session through a scroll loop:
//! throttle, scroll, pause, extract, dedup, filter. A run ends when enough
//! candidates were emitted or the scroll duration elapsed. A feed that stops
//! yielding new handles is reloaded once per stall threshold.

use crate::error::DiscoveryError;
use crate::filter::CandidateFilter;
use rand::Rng;
use scout_browser::extract::{parse_feed, parse_profile};
use scout_browser::{ExtractorSpec, PageController, PageSession, RawCandidate, SessionOptions};
use scout_budget::{BudgetRegistry, Method};
use scout_core::{Candidate, DiscoveryConfig, Handle, Platform};
use scout_niche::NicheClassifier;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Candidates emitted by a discovery run, plus the fatal error if the run never started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryReport {
    /// Emitted candidates in discovery order
    pub candidates: Vec<Candidate>,
    /// Set when a feed session could not be opened; `candidates` is then empty
    pub error: Option<DiscoveryError>,
}

impl DiscoveryReport {
    fn failed(error: DiscoveryError) -> Self {
        Self {
            candidates: Vec::new(),
            error: Some(error),
        }
    }

    /// Whether the run completed without a fatal error.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Scroll-loop discovery over a page controller.
pub struct DiscoveryEngine {
    platform: Platform,
    controller: Arc<dyn PageController>,
    budgets: BudgetRegistry,
    classifier: Arc<dyn NicheClassifier>,
    filter: CandidateFilter,
    config: DiscoveryConfig,
    enrich_profiles: bool,
}

impl DiscoveryEngine {
    /// Create an Instagram discovery engine.
    #[must_use]
    pub fn new(
        controller: Arc<dyn PageController>,
        budgets: BudgetRegistry,
        classifier: Arc<dyn NicheClassifier>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            platform: Platform::Instagram,
            controller,
            budgets,
            classifier,
            filter: CandidateFilter::from_config(&config),
            config,
            enrich_profiles: true,
        }
    }

    /// Discover on a different platform's feed.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace the filter derived from the discovery config.
    #[must_use]
    pub fn with_filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether to visit profile pages for candidates whose feed entry has no follower count.
    #[must_use]
    pub fn with_profile_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_profiles = enabled;
        self
    }

    /// Starting location of a feed run.
    #[must_use]
    pub fn feed_url(&self) -> &'static str {
        match self.platform {
            Platform::Instagram => "https://www.instagram.com/reels/",
            Platform::LinkedIn => "https://www.linkedin.com/feed/",
        }
    }

    /// Starting location of a tag run. A leading `#` is dropped.
    #[must_use]
    pub fn tag_url(&self, tag: &str) -> String {
        let tag = tag.trim().trim_start_matches('#');
        match self.platform {
            Platform::Instagram => format!("https://www.instagram.com/explore/tags/{tag}/"),
            Platform::LinkedIn => format!("https://www.linkedin.com/feed/hashtag/{tag}/"),
        }
    }

    /// Start a run. Handles emitted by any entry point of the run are never emitted again.
    #[must_use]
    pub fn start_run(&self) -> DiscoveryRun<'_> {
        DiscoveryRun {
            engine: self,
            seen: HashSet::new(),
            rejected: HashSet::new(),
        }
    }

    /// Scroll the feed once, in a fresh run.
    pub async fn discover(&self) -> DiscoveryReport {
        self.start_run().feed().await
    }

    /// Browse each tag in order, in a fresh run.
    pub async fn discover_by_tag(&self, tags: &[String]) -> DiscoveryReport {
        self.start_run().tags(tags).await
    }

    async fn pause(&self) {
        let min = self.config.jitter_min_ms;
        let max = self.config.jitter_max_ms.max(min);
        let millis = rand::thread_rng().gen_range(min..=max);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    async fn extract_step(&self, session: &mut dyn PageSession) -> scout_browser::Result<Vec<RawCandidate>> {
        session.scroll_to_bottom().await?;
        self.pause().await;
        let value = session
            .evaluate(&ExtractorSpec::FeedCandidates(self.platform))
            .await?;
        parse_feed(value)
    }

    async fn build_candidate(&self, handle: Handle, raw: RawCandidate) -> Candidate {
        let mut candidate = Candidate::new(self.platform, handle);
        candidate.display_name = raw.display_name.filter(|s| !s.trim().is_empty());
        candidate.bio = raw.bio.filter(|s| !s.trim().is_empty());
        candidate.follower_count = raw.followers;

        if candidate.follower_count.is_none() && self.enrich_profiles {
            self.enrich(&mut candidate).await;
        }

        if candidate.niche.is_none() {
            if let Some(bio) = candidate.bio.as_deref() {
                candidate.niche = Some(self.classifier.classify(bio, &[]).label);
            }
        }
        candidate
    }

    /// Fill counts and bio from the candidate's profile page. Failures leave the candidate as is.
    async fn enrich(&self, candidate: &mut Candidate) {
        let options = SessionOptions::profile(self.platform);
        let mut session = match self.controller.open(&candidate.profile_url, &options).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(handle = %candidate.handle, "Failed to open profile page: {}", e);
                return;
            }
        };

        let extracted = match session
            .evaluate(&ExtractorSpec::ProfileFields(self.platform))
            .await
        {
            Ok(value) => parse_profile(value),
            Err(e) => Err(e),
        };
        if let Err(e) = session.close().await {
            tracing::debug!(handle = %candidate.handle, "Failed to close profile page: {}", e);
        }

        match extracted {
            Ok(profile) => {
                candidate.follower_count = profile.followers;
                if candidate.display_name.is_none() {
                    candidate.display_name = profile.display_name;
                }
                if candidate.bio.is_none() {
                    candidate.bio = profile.bio;
                }
            }
            Err(e) => {
                tracing::warn!(handle = %candidate.handle, "Failed to read profile page: {}", e);
            }
        }
    }
}

/// One discovery run. Owns the dedup state shared by its entry points.
pub struct DiscoveryRun<'a> {
    engine: &'a DiscoveryEngine,
    seen: HashSet<Handle>,
    rejected: HashSet<Handle>,
}

impl DiscoveryRun<'_> {
    /// Handles emitted so far in this run.
    #[must_use]
    pub fn seen(&self) -> &HashSet<Handle> {
        &self.seen
    }

    /// Scroll the platform feed until `max_creators` or the scroll duration is reached.
    pub async fn feed(&mut self) -> DiscoveryReport {
        let url = self.engine.feed_url();
        let cap = self.engine.config.max_creators;
        tracing::info!(
            platform = %self.engine.platform,
            max_creators = cap,
            "Starting feed discovery for {:?}",
            self.engine.config.scroll_duration()
        );

        match self.session(url, cap).await {
            Ok(candidates) => {
                tracing::info!("Discovery completed: {} creators found", candidates.len());
                DiscoveryReport {
                    candidates,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!("Discovery failed: {}", e);
                DiscoveryReport::failed(e)
            }
        }
    }

    /// Browse each tag in order with its own session and per-tag cap.
    ///
    /// A tag whose session cannot be opened is skipped. The report carries an
    /// error only when every tag failed to open.
    pub async fn tags(&mut self, tags: &[String]) -> DiscoveryReport {
        let cap = self.engine.config.max_creators_per_hashtag;
        let mut candidates = Vec::new();
        let mut last_error = None;
        let mut opened = 0;

        for tag in tags {
            let url = self.engine.tag_url(tag);
            match self.session(&url, cap).await {
                Ok(found) => {
                    opened += 1;
                    tracing::info!("Found {} creators for tag #{}", found.len(), tag.trim_start_matches('#'));
                    candidates.extend(found);
                }
                Err(e) => {
                    tracing::error!(tag = %tag, "Skipping tag: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(error) if opened == 0 => DiscoveryReport::failed(error),
            _ => DiscoveryReport {
                candidates,
                error: None,
            },
        }
    }

    async fn session(&mut self, url: &str, cap: usize) -> Result<Vec<Candidate>, DiscoveryError> {
        let engine = self.engine;
        let options = SessionOptions::feed(engine.platform);
        let mut session = engine
            .controller
            .open(url, &options)
            .await
            .map_err(|e| DiscoveryError::SessionOpen {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let output = self.scroll(session.as_mut(), cap).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close feed session: {}", e);
        }
        Ok(output)
    }

    async fn scroll(&mut self, session: &mut dyn PageSession, cap: usize) -> Vec<Candidate> {
        let engine = self.engine;
        let platform = engine.platform;
        let scroll_duration = engine.config.scroll_duration();
        let stall_threshold = engine.config.stall_threshold();

        let start = Instant::now();
        let mut last_new = start;
        let mut output = Vec::new();

        while output.len() < cap && start.elapsed() < scroll_duration {
            engine.budgets.wait_for(platform.as_str(), Method::Scraping, 1).await;

            let raw = match engine.extract_step(session).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(platform = %platform, "Error during discovery scroll: {}", e);
                    Vec::new()
                }
            };

            let mut found_new = false;
            for entry in raw {
                if output.len() >= cap {
                    break;
                }
                let Ok(handle) = platform.parse_handle(&entry.handle) else {
                    tracing::debug!(handle = %entry.handle, "Ignoring malformed handle");
                    continue;
                };
                if self.seen.contains(&handle) || self.rejected.contains(&handle) {
                    continue;
                }
                found_new = true;

                let candidate = engine.build_candidate(handle, entry).await;
                if !engine.filter.matches(&candidate) {
                    tracing::debug!(
                        handle = %candidate.handle,
                        followers = ?candidate.follower_count,
                        niche = ?candidate.niche,
                        "Candidate filtered out"
                    );
                    self.rejected.insert(candidate.handle);
                    continue;
                }

                tracing::info!(
                    handle = %candidate.handle,
                    "Discovered creator: {} ({} followers)",
                    candidate.handle,
                    candidate.follower_count.unwrap_or(0)
                );
                self.seen.insert(candidate.handle.clone());
                output.push(candidate);
            }

            if found_new {
                last_new = Instant::now();
            } else if last_new.elapsed() > stall_threshold {
                tracing::warn!(platform = %platform, "No new content detected, reloading feed");
                if let Err(e) = session.reload().await {
                    tracing::warn!("Feed reload failed: {}", e);
                }
                last_new = Instant::now();
            }
        }

        output
    }
}
