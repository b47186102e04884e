//! Extractor scripts and the shapes of the data they return.
//!
//! Scripts run in the page and return plain JSON. Counts may come back as
//! display text (`"12.5K"`) or numbers; both deserialize into `u64`.

use crate::error::{BrowserError, Result};
use scout_core::parse::parse_human_number;
use scout_core::Platform;
use serde::{Deserialize, Deserializer};

/// Which extractor to run against the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorSpec {
    /// Accounts visible in a scrolling feed (reels or tag page)
    FeedCandidates(Platform),
    /// Fields of a profile page
    ProfileFields(Platform),
}

impl ExtractorSpec {
    /// JavaScript expression evaluated in the page.
    pub fn script(&self) -> &'static str {
        match self {
            Self::FeedCandidates(Platform::Instagram) => INSTAGRAM_FEED_JS,
            Self::FeedCandidates(Platform::LinkedIn) => LINKEDIN_FEED_JS,
            Self::ProfileFields(Platform::Instagram) => INSTAGRAM_PROFILE_JS,
            Self::ProfileFields(Platform::LinkedIn) => LINKEDIN_PROFILE_JS,
        }
    }
}

/// One account seen in a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCandidate {
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub followers: Option<u64>,
}

/// Fields read from a profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub followers: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub following: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub posts: Option<u64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub recent_posts: Vec<RawPost>,
}

impl RawProfile {
    /// Whether the page yielded nothing that identifies a profile.
    pub fn is_empty(&self) -> bool {
        self.display_name.as_deref().map_or(true, str::is_empty)
            && self.bio.as_deref().map_or(true, str::is_empty)
            && self.followers.is_none()
    }
}

/// A post link read from a profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawPost {
    pub url: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub comments: Option<u64>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Decode feed extractor output. `null` means nothing was visible.
pub fn parse_feed(value: serde_json::Value) -> Result<Vec<RawCandidate>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
        .map_err(|e| BrowserError::ExtractionError(format!("unexpected feed data: {e}")))
}

/// Decode profile extractor output.
pub fn parse_profile(value: serde_json::Value) -> Result<RawProfile> {
    if value.is_null() {
        return Err(BrowserError::ExtractionError(
            "no profile data on page".to_string(),
        ));
    }
    let profile: RawProfile = serde_json::from_value(value)
        .map_err(|e| BrowserError::ExtractionError(format!("unexpected profile data: {e}")))?;
    if profile.is_empty() {
        return Err(BrowserError::ExtractionError(
            "profile page had no identifying fields".to_string(),
        ));
    }
    Ok(profile)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(n)) => Some(n),
        Some(Count::Float(f)) if f.is_finite() && f >= 0.0 => Some(f.round() as u64),
        Some(Count::Text(text)) => parse_human_number(&text),
        Some(Count::Float(_)) | None => None,
    })
}

const INSTAGRAM_FEED_JS: &str = r#"(() => {
    const reserved = new Set(['p', 'reel', 'reels', 'explore', 'stories', 'accounts', 'direct']);
    const seen = new Set();
    const out = [];
    const containers = document.querySelectorAll('article, [data-testid="reel-item"]');
    containers.forEach(container => {
        container.querySelectorAll('a[href^="/"]').forEach(link => {
            const parts = (link.getAttribute('href') || '').split('/').filter(Boolean);
            if (parts.length !== 1) return;
            const handle = parts[0].replace('@', '');
            if (!handle || reserved.has(handle) || seen.has(handle)) return;
            seen.add(handle);
            out.push({ handle: handle, display_name: (link.textContent || '').trim() || null });
        });
    });
    return out;
})()"#;

const LINKEDIN_FEED_JS: &str = r#"(() => {
    const seen = new Set();
    const out = [];
    document.querySelectorAll('a[href*="/in/"]').forEach(link => {
        const match = (link.getAttribute('href') || '').match(/\/in\/([^\/?]+)/);
        if (!match || seen.has(match[1])) return;
        seen.add(match[1]);
        out.push({ handle: match[1], display_name: (link.textContent || '').trim() || null });
    });
    return out;
})()"#;

const INSTAGRAM_PROFILE_JS: &str = r#"(() => {
    const meta = name => {
        const el = document.querySelector(`meta[property="${name}"]`);
        return el ? el.content : null;
    };
    const text = selector => {
        const el = document.querySelector(selector);
        return el ? el.textContent.trim() : null;
    };
    const title = meta('og:title');
    const posts = Array.from(document.querySelectorAll('a[href*="/p/"], a[href*="/reel/"]'))
        .slice(0, 12)
        .map(a => ({ url: new URL(a.getAttribute('href'), location.origin).href }));
    return {
        display_name: title ? title.split(' (@')[0] : null,
        bio: meta('og:description'),
        followers: text('a[href*="/followers/"] span'),
        following: text('a[href*="/following/"] span'),
        posts: text('header li span'),
        avatar_url: meta('og:image'),
        recent_posts: posts
    };
})()"#;

const LINKEDIN_PROFILE_JS: &str = r#"(() => {
    const text = selector => {
        const el = document.querySelector(selector);
        return el ? el.textContent.trim() : '';
    };
    const headline = text('.text-body-medium.break-words');
    const summary = text('.pv-about-section .pv-about__summary-text');
    const avatar = document.querySelector('img.pv-top-card-profile-picture__image');
    return {
        display_name: text('h1.text-heading-xlarge') || null,
        bio: [headline, summary].filter(Boolean).join('\n') || null,
        location: text('.text-body-small.inline.t-black--light.break-words') || null,
        followers: text('.pv-top-card--list-bullet li:first-child span') || null,
        avatar_url: avatar ? avatar.src : null,
        recent_posts: []
    };
})()"#;
