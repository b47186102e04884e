//! Scout Niche - label a creator's niche from their bio and captions.
//!
//! [`KeywordClassifier`] scores each category by keyword hits and picks the
//! best one. Confidence is advisory: callers must not branch on it.
//!
//! # Example
//!
//! ```rust
//! use scout_niche::{KeywordClassifier, NicheClassifier};
//!
//! let classifier = KeywordClassifier::default();
//! let result = classifier.classify("Personal trainer. Gym, cardio and yoga.", &[]);
//! assert_eq!(result.label, "Fitness");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod categories;

use once_cell::sync::Lazy;
use regex::Regex;

/// Label used when no category matches.
pub const OTHER: &str = "Other";

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// A niche label with an advisory confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Niche label, or [`OTHER`]
    pub label: String,
    /// Advisory confidence
    pub confidence: f64,
}

impl Classification {
    fn other() -> Self {
        Self {
            label: OTHER.to_string(),
            confidence: 0.0,
        }
    }
}

/// Assigns a niche label to an account.
pub trait NicheClassifier: Send + Sync {
    /// Classify from bio text and recent captions.
    fn classify(&self, bio: &str, captions: &[String]) -> Classification;
}

/// A category and the keywords that vote for it.
#[derive(Debug, Clone)]
pub struct Category {
    /// Label returned when this category wins
    pub name: String,
    /// Lowercase keywords; entries with spaces or punctuation match as phrases
    pub keywords: Vec<String>,
    /// Score added per hit
    pub weight: f64,
}

/// Keyword-scoring classifier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    categories: Vec<Category>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            categories: categories::builtin(),
        }
    }
}

impl KeywordClassifier {
    /// Classifier with no categories; everything is [`OTHER`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Add or replace a category.
    #[must_use]
    pub fn with_category(mut self, name: &str, keywords: &[&str], weight: f64) -> Self {
        let category = Category {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            weight,
        };
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
        tracing::debug!(category = name, keywords = keywords.len(), "added niche category");
        self
    }

    /// Names of all categories, in scoring order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Score every category, highest first. Ties keep category order.
    #[must_use]
    pub fn rank(&self, bio: &str, captions: &[String]) -> Vec<Classification> {
        let texts: Vec<String> = std::iter::once(bio)
            .chain(captions.iter().map(String::as_str))
            .filter(|t| !t.trim().is_empty())
            .map(str::to_lowercase)
            .collect();

        let words: Vec<&str> = texts
            .iter()
            .flat_map(|t| WORD_REGEX.find_iter(t).map(|m| m.as_str()))
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        #[allow(clippy::cast_precision_loss)]
        let total_words = words.len() as f64;

        let mut ranked: Vec<Classification> = self
            .categories
            .iter()
            .map(|category| {
                let score = Self::score(category, &texts, &words);
                Classification {
                    label: category.name.clone(),
                    confidence: (score / total_words).min(1.0),
                }
            })
            .filter(|c| c.confidence > 0.0)
            .collect();

        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(category: &Category, texts: &[String], words: &[&str]) -> f64 {
        let hits: usize = category
            .keywords
            .iter()
            .map(|keyword| {
                if keyword.contains(|c: char| !(c.is_alphanumeric() || c == '_')) {
                    texts.iter().map(|t| t.matches(keyword.as_str()).count()).sum()
                } else {
                    words.iter().filter(|w| **w == keyword.as_str()).count()
                }
            })
            .sum();
        hits as f64 * category.weight
    }
}

impl NicheClassifier for KeywordClassifier {
    fn classify(&self, bio: &str, captions: &[String]) -> Classification {
        let result = self
            .rank(bio, captions)
            .into_iter()
            .next()
            .unwrap_or_else(Classification::other);
        tracing::debug!(
            niche = %result.label,
            confidence = result.confidence,
            "niche detection"
        );
        result
    }
}
