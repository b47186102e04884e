//! Text parsers shared by the API and page-extraction paths.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Captions longer than this many characters are truncated.
pub const MAX_CAPTION_CHARS: usize = 500;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

/// Parse a human-formatted count such as `1.2M`, `5.4K`, `3B` or `1,234`.
///
/// Surrounding words are ignored (`"12.5k followers"` parses). Returns `None`
/// when no number is present.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn parse_human_number(text: &str) -> Option<u64> {
    let cleaned: String = text.trim().replace(',', "");
    let start = cleaned.find(|c: char| c.is_ascii_digit())?;
    let rest = &cleaned[start..];

    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let value: f64 = rest[..end].parse().ok()?;

    let multiplier = match rest[end..].chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('K') => 1_000.0,
        Some('M') => 1_000_000.0,
        Some('B') => 1_000_000_000.0,
        _ => 1.0,
    };

    let scaled = (value * multiplier).round();
    if scaled.is_finite() && scaled >= 0.0 && scaled <= u64::MAX as f64 {
        Some(scaled as u64)
    } else {
        None
    }
}

/// First email address found in free text.
#[must_use]
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_REGEX.find(text).map(|m| m.as_str().to_string())
}

/// Engagement of `interactions` (likes plus comments) relative to `followers`, clamped to `[0, 1]`.
///
/// Returns `None` when the follower count is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_rate(interactions: u64, followers: u64) -> Option<f64> {
    if followers == 0 {
        return None;
    }
    Some((interactions as f64 / followers as f64).clamp(0.0, 1.0))
}

/// Truncate a caption to [`MAX_CAPTION_CHARS`] characters on a char boundary.
#[must_use]
pub fn truncate_caption(caption: &str) -> String {
    match caption.char_indices().nth(MAX_CAPTION_CHARS) {
        Some((idx, _)) => caption[..idx].to_string(),
        None => caption.to_string(),
    }
}

/// Parse a post timestamp: RFC 3339, `+0000`-style offsets, or Unix epoch milliseconds.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(ts.with_timezone(&Utc));
    }
    text.parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}
