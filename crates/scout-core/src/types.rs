//! Shared types used across the creator-scout workspace.
//!
//! This module defines the domain newtypes and value objects that flow from
//! discovery through scraping to storage.

use crate::error::ScoutError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Maximum number of posts kept in either bounded post list of a profile.
pub const MAX_POSTS: usize = 10;

/// Social platforms the scout knows how to discover and scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// instagram.com
    Instagram,
    /// linkedin.com
    #[serde(rename = "linkedin")]
    LinkedIn,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 2] = [Platform::Instagram, Platform::LinkedIn];

    /// Lowercase identifier used in budget keys, storage and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Registrable domain of the platform.
    #[must_use]
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram.com",
            Self::LinkedIn => "linkedin.com",
        }
    }

    /// Canonical profile URL for a handle on this platform.
    #[must_use]
    pub fn profile_url(&self, handle: &Handle) -> String {
        match self {
            Self::Instagram => format!("https://www.instagram.com/{}/", handle.as_str()),
            Self::LinkedIn => format!("https://www.linkedin.com/in/{}/", handle.as_str()),
        }
    }

    /// Validate a profile URL against this platform's URL shape and extract the handle.
    ///
    /// Instagram profiles look like `https://www.instagram.com/<handle>/`,
    /// LinkedIn profiles like `https://www.linkedin.com/in/<handle>/`.
    ///
    /// # Errors
    /// Returns `ScoutError::Validation` if the URL is malformed, points at a
    /// different host, or carries no valid handle.
    pub fn parse_profile_url(&self, profile_url: &str) -> Result<Handle, ScoutError> {
        let parsed = url::Url::parse(profile_url.trim())
            .map_err(|e| ScoutError::Validation(format!("invalid profile URL '{profile_url}': {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScoutError::Validation(format!(
                "profile URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        let domain = self.domain();
        if host != domain && !host.ends_with(&format!(".{domain}")) {
            return Err(ScoutError::Validation(format!(
                "profile URL host '{host}' does not belong to {}",
                self.as_str()
            )));
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let raw = match (self, segments.as_slice()) {
            (Self::Instagram, [first, ..]) if !INSTAGRAM_RESERVED.contains(first) => *first,
            (Self::LinkedIn, ["in", handle, ..]) => *handle,
            _ => {
                return Err(ScoutError::Validation(format!(
                    "no {} handle found in '{profile_url}'",
                    self.as_str()
                )))
            }
        };

        self.parse_handle(raw)
    }

    /// Validate a bare handle (an optional leading `@` is stripped) for this platform.
    ///
    /// # Errors
    /// Returns `ScoutError::Validation` if the handle has characters the platform never issues.
    pub fn parse_handle(&self, raw: &str) -> Result<Handle, ScoutError> {
        static INSTAGRAM: OnceLock<Regex> = OnceLock::new();
        static LINKEDIN: OnceLock<Regex> = OnceLock::new();

        let regex = match self {
            Self::Instagram => INSTAGRAM
                .get_or_init(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").expect("valid regex")),
            Self::LinkedIn => LINKEDIN
                .get_or_init(|| Regex::new(r"^[A-Za-z0-9-]{1,100}$").expect("valid regex")),
        };

        let candidate = raw.trim().trim_start_matches('@');
        if regex.is_match(candidate) {
            Ok(Handle(candidate.to_string()))
        } else {
            Err(ScoutError::Validation(format!(
                "invalid {} handle '{raw}'",
                self.as_str()
            )))
        }
    }
}

/// First path segments on instagram.com that are routes, not accounts.
const INSTAGRAM_RESERVED: &[&str] = &[
    "p", "reel", "reels", "explore", "stories", "accounts", "direct", "tv",
];

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Self::Instagram),
            "linkedin" => Ok(Self::LinkedIn),
            other => Err(ScoutError::Validation(format!(
                "unsupported source '{other}': expected instagram or linkedin"
            ))),
        }
    }
}

/// Platform-unique account identifier, used as the dedup key during discovery.
///
/// Construct through [`Platform::parse_handle`] or [`Platform::parse_profile_url`]
/// so the platform's character rules are applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An account discovered but not yet fully scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Platform the account lives on
    pub platform: Platform,
    /// Account handle (unique within a discovery run)
    pub handle: Handle,
    /// Full profile URL
    pub profile_url: String,
    /// Display name, if visible during discovery
    pub display_name: Option<String>,
    /// Bio text, if visible during discovery
    pub bio: Option<String>,
    /// Niche label assigned during discovery
    pub niche: Option<String>,
    /// Follower count, if visible during discovery
    pub follower_count: Option<u64>,
}

impl Candidate {
    /// Create a candidate with the platform's canonical profile URL and no descriptive fields.
    #[must_use]
    pub fn new(platform: Platform, handle: Handle) -> Self {
        let profile_url = platform.profile_url(&handle);
        Self {
            platform,
            handle,
            profile_url,
            display_name: None,
            bio: None,
            niche: None,
            follower_count: None,
        }
    }

    /// Set the follower count.
    #[must_use]
    pub fn with_followers(mut self, followers: u64) -> Self {
        self.follower_count = Some(followers);
        self
    }

    /// Set the niche label.
    #[must_use]
    pub fn with_niche(mut self, niche: impl Into<String>) -> Self {
        self.niche = Some(niche.into());
        self
    }
}

/// A single post sampled from a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Permalink of the post
    pub url: String,
    /// When the post was published
    pub timestamp: Option<DateTime<Utc>>,
    /// Like count
    pub likes: Option<u64>,
    /// Comment count
    pub comments: Option<u64>,
    /// Caption (truncated)
    pub caption: Option<String>,
    /// Per-post engagement relative to followers, in `[0, 1]`
    pub engagement_rate: Option<f64>,
}

impl Post {
    /// Likes plus comments, treating missing counts as zero.
    #[must_use]
    pub fn interactions(&self) -> u64 {
        self.likes.unwrap_or(0).saturating_add(self.comments.unwrap_or(0))
    }
}

/// Fully scraped profile, ready to hand to the storage adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Platform the profile was scraped from
    pub source: Platform,
    /// Profile URL
    pub profile_url: String,
    /// Account handle
    pub handle: Handle,
    /// Display name
    pub display_name: Option<String>,
    /// Bio or headline/summary text
    pub bio: Option<String>,
    /// Niche label assigned by the classifier
    pub niche: Option<String>,
    /// First email address found in public profile text
    pub public_contact_email: Option<String>,
    /// Free-form location
    pub location: Option<String>,
    /// Followers (connections on LinkedIn)
    pub follower_count: Option<u64>,
    /// Accounts followed
    pub following_count: Option<u64>,
    /// Number of posts published
    pub post_count: Option<u64>,
    /// Overall engagement rate in `[0, 1]`
    pub engagement_rate: Option<f64>,
    /// Highest-engagement posts (at most [`MAX_POSTS`])
    pub top_posts: Vec<Post>,
    /// Most recent posts (at most [`MAX_POSTS`])
    pub recent_posts: Vec<Post>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Raw scrape metadata, kept only when configured
    pub raw: Option<serde_json::Value>,
    /// When the record was built
    pub scraped_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Create an empty record for a handle on a platform.
    #[must_use]
    pub fn new(source: Platform, handle: Handle, profile_url: impl Into<String>) -> Self {
        Self {
            source,
            profile_url: profile_url.into(),
            handle,
            display_name: None,
            bio: None,
            niche: None,
            public_contact_email: None,
            location: None,
            follower_count: None,
            following_count: None,
            post_count: None,
            engagement_rate: None,
            top_posts: Vec::new(),
            recent_posts: Vec::new(),
            avatar_url: None,
            raw: None,
            scraped_at: Utc::now(),
        }
    }

    /// Check the record invariants: engagement rates in `[0, 1]` and bounded post lists.
    ///
    /// # Errors
    /// Returns `ScoutError::Validation` describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if !self.profile_url.starts_with("http://") && !self.profile_url.starts_with("https://") {
            return Err(ScoutError::Validation(format!(
                "profile URL must start with http:// or https://, got '{}'",
                self.profile_url
            )));
        }
        if let Some(rate) = self.engagement_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ScoutError::Validation(format!(
                    "engagement rate {rate} outside [0, 1]"
                )));
            }
        }
        for (name, posts) in [("top_posts", &self.top_posts), ("recent_posts", &self.recent_posts)] {
            if posts.len() > MAX_POSTS {
                return Err(ScoutError::Validation(format!(
                    "{name} has {} entries, limit is {MAX_POSTS}",
                    posts.len()
                )));
            }
            if posts
                .iter()
                .filter_map(|p| p.engagement_rate)
                .any(|rate| !(0.0..=1.0).contains(&rate))
            {
                return Err(ScoutError::Validation(format!(
                    "{name} contains an engagement rate outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Which tier of the scrape protocol produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeMethod {
    /// Structured, credentialed API
    Api,
    /// Page extraction through the page controller
    Fallback,
}

impl fmt::Display for ScrapeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Classification of a failed scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeErrorKind {
    /// Malformed URL or handle; never retried
    InvalidInput,
    /// Credentialed API path failed; falls through to page extraction
    ApiError,
    /// Page extraction failed; terminal for the call
    ExtractionError,
    /// Anything not already classified, caught at the batch boundary
    Unexpected,
}

impl fmt::Display for ScrapeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::ApiError => write!(f, "api_error"),
            Self::ExtractionError => write!(f, "extraction_error"),
            Self::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// Result of resolving one account to a profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrapeOutcome {
    /// A profile record was built
    Success {
        /// The scraped profile
        profile: Box<ProfileRecord>,
        /// Tier that produced the profile
        method_used: ScrapeMethod,
    },
    /// No profile could be built
    Failure {
        /// Failure classification
        kind: ScrapeErrorKind,
        /// Human-readable detail
        message: String,
        /// Tier that failed last; `None` when no network action was taken
        method_used: Option<ScrapeMethod>,
    },
}

impl ScrapeOutcome {
    /// Build a successful outcome.
    #[must_use]
    pub fn success(profile: ProfileRecord, method_used: ScrapeMethod) -> Self {
        Self::Success {
            profile: Box::new(profile),
            method_used,
        }
    }

    /// Build a failed outcome.
    #[must_use]
    pub fn failure(
        kind: ScrapeErrorKind,
        message: impl Into<String>,
        method_used: Option<ScrapeMethod>,
    ) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
            method_used,
        }
    }

    /// Whether a profile was produced.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Tier used, if any.
    #[must_use]
    pub fn method_used(&self) -> Option<ScrapeMethod> {
        match self {
            Self::Success { method_used, .. } => Some(*method_used),
            Self::Failure { method_used, .. } => *method_used,
        }
    }

    /// Failure kind, if the outcome is a failure.
    #[must_use]
    pub fn error_kind(&self) -> Option<ScrapeErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The scraped profile, if the outcome is a success.
    #[must_use]
    pub fn profile(&self) -> Option<&ProfileRecord> {
        match self {
            Self::Success { profile, .. } => Some(profile),
            Self::Failure { .. } => None,
        }
    }
}

/// One batch outcome, paired with the candidate it was produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Originating candidate
    pub candidate: Candidate,
    /// What happened when scraping it
    pub outcome: ScrapeOutcome,
}

/// Aggregated outcomes of a batch run.
///
/// `items` is in completion order, not input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Number of candidates submitted
    pub total: usize,
    /// Outcomes that produced a profile
    pub successful: usize,
    /// Outcomes that did not
    pub failed: usize,
    /// Per-candidate outcomes
    pub items: Vec<BatchItem>,
}

impl BatchResult {
    /// Aggregate counts from a completed list of items.
    #[must_use]
    pub fn from_items(total: usize, items: Vec<BatchItem>) -> Self {
        let successful = items.iter().filter(|i| i.outcome.is_success()).count();
        let failed = items.len() - successful;
        Self {
            total,
            successful,
            failed,
            items,
        }
    }

    /// Profiles from successful items.
    pub fn profiles(&self) -> impl Iterator<Item = &ProfileRecord> {
        self.items.iter().filter_map(|i| i.outcome.profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instagram_url_parsing() {
        let handle = Platform::Instagram
            .parse_profile_url("https://www.instagram.com/nat.geo_1/?hl=en")
            .expect("valid instagram url");
        assert_eq!(handle.as_str(), "nat.geo_1");

        let handle = Platform::Instagram
            .parse_profile_url("http://instagram.com/someone")
            .expect("bare domain");
        assert_eq!(handle.as_str(), "someone");
    }

    #[test]
    fn test_instagram_url_rejects_routes_and_hosts() {
        assert!(Platform::Instagram
            .parse_profile_url("https://www.instagram.com/reel/abc123/")
            .is_err());
        assert!(Platform::Instagram
            .parse_profile_url("https://www.instagram.com/")
            .is_err());
        assert!(Platform::Instagram
            .parse_profile_url("https://evilinstagram.com/someone")
            .is_err());
        assert!(Platform::Instagram.parse_profile_url("not a url").is_err());
        assert!(Platform::Instagram
            .parse_profile_url("ftp://instagram.com/someone")
            .is_err());
    }

    #[test]
    fn test_linkedin_url_parsing() {
        let handle = Platform::LinkedIn
            .parse_profile_url("https://www.linkedin.com/in/jane-doe-42/")
            .expect("valid linkedin url");
        assert_eq!(handle.as_str(), "jane-doe-42");

        assert!(Platform::LinkedIn
            .parse_profile_url("https://www.linkedin.com/company/acme/")
            .is_err());
        assert!(Platform::LinkedIn
            .parse_profile_url("https://www.instagram.com/jane/")
            .is_err());
    }

    #[test]
    fn test_parse_handle_strips_at() {
        let handle = Platform::Instagram.parse_handle("@creator").expect("valid");
        assert_eq!(handle.as_str(), "creator");
        assert!(Platform::Instagram.parse_handle("has space").is_err());
        assert!(Platform::LinkedIn.parse_handle("dots.not.allowed").is_err());
    }

    #[test]
    fn test_profile_url_round_trips_through_parser() {
        let handle = Platform::LinkedIn.parse_handle("jane-doe").expect("valid");
        let url = Platform::LinkedIn.profile_url(&handle);
        assert_eq!(url, "https://www.linkedin.com/in/jane-doe/");
        assert_eq!(
            Platform::LinkedIn.parse_profile_url(&url).expect("parse"),
            handle
        );
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("Instagram".parse::<Platform>().expect("parse"), Platform::Instagram);
        assert_eq!(" linkedin ".parse::<Platform>().expect("parse"), Platform::LinkedIn);
        assert!("tiktok".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_names() {
        let json = serde_json::to_string(&Platform::LinkedIn).expect("serialize");
        assert_eq!(json, "\"linkedin\"");
        let parsed: Platform = serde_json::from_str("\"instagram\"").expect("deserialize");
        assert_eq!(parsed, Platform::Instagram);
    }

    #[test]
    fn test_record_validation() {
        let handle = Platform::Instagram.parse_handle("creator").expect("valid");
        let mut record = ProfileRecord::new(
            Platform::Instagram,
            handle.clone(),
            Platform::Instagram.profile_url(&handle),
        );
        assert!(record.validate().is_ok());

        record.engagement_rate = Some(1.5);
        assert!(record.validate().is_err());

        record.engagement_rate = Some(0.2);
        record.top_posts = (0..=MAX_POSTS)
            .map(|i| Post {
                url: format!("https://www.instagram.com/p/{i}/"),
                timestamp: None,
                likes: None,
                comments: None,
                caption: None,
                engagement_rate: None,
            })
            .collect();
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_batch_result_counts() {
        let handle = Platform::Instagram.parse_handle("a").expect("valid");
        let candidate = Candidate::new(Platform::Instagram, handle.clone());
        let profile = ProfileRecord::new(Platform::Instagram, handle, candidate.profile_url.clone());

        let items = vec![
            BatchItem {
                candidate: candidate.clone(),
                outcome: ScrapeOutcome::success(profile, ScrapeMethod::Fallback),
            },
            BatchItem {
                candidate,
                outcome: ScrapeOutcome::failure(
                    ScrapeErrorKind::ExtractionError,
                    "no data",
                    Some(ScrapeMethod::Fallback),
                ),
            },
        ];

        let result = BatchResult::from_items(2, items);
        assert_eq!(result.total, 2);
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.profiles().count(), 1);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = ScrapeOutcome::failure(ScrapeErrorKind::InvalidInput, "bad url", None);
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "invalid_input");
        assert!(json["method_used"].is_null());
    }
}
