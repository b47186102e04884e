//! Candidate filtering by follower bounds and niche.

use scout_core::{Candidate, DiscoveryConfig};

/// Follower bounds and an optional niche allow-list applied during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    /// Inclusive lower bound; a missing count is treated as zero
    pub min_followers: u64,
    /// Inclusive upper bound
    pub max_followers: u64,
    /// Empty means every niche is allowed
    pub niches: Vec<String>,
}

impl CandidateFilter {
    /// Filter on follower bounds only.
    #[must_use]
    pub fn new(min_followers: u64, max_followers: u64) -> Self {
        Self {
            min_followers,
            max_followers,
            niches: Vec::new(),
        }
    }

    /// Restrict to these niche labels, compared case-insensitively.
    #[must_use]
    pub fn with_niches(mut self, niches: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.niches = niches.into_iter().map(Into::into).collect();
        self
    }

    /// Filter from the `discovery` config section.
    #[must_use]
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(config.min_followers, config.max_followers).with_niches(config.niches.clone())
    }

    /// Whether a candidate passes both bounds (inclusive) and the niche allow-list.
    ///
    /// A missing follower count is treated as zero.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        let followers = candidate.follower_count.unwrap_or(0);
        if followers < self.min_followers || followers > self.max_followers {
            return false;
        }

        if self.niches.is_empty() {
            return true;
        }
        candidate
            .niche
            .as_deref()
            .is_some_and(|niche| self.niches.iter().any(|n| n.eq_ignore_ascii_case(niche)))
    }
}
