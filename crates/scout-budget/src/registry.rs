//! Process-wide registry of rate budgets keyed by platform and method.

use crate::bucket::RateBudget;
use scout_core::{Platform, RateLimitConfig, ScoutError};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

const HOUR: Duration = Duration::from_secs(3_600);
const DAY: Duration = Duration::from_secs(86_400);

/// Kind of outbound action a budget throttles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Credentialed API requests
    Api,
    /// Page loads, scrolls and extractions through the browser
    Scraping,
}

impl Method {
    /// Lowercase identifier used in configuration and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Scraping => "scraping",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "scraping" => Ok(Self::Scraping),
            other => Err(ScoutError::Validation(format!(
                "unknown budget method '{other}': expected api or scraping"
            ))),
        }
    }
}

/// Registry key: a platform identifier plus a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BudgetKey {
    /// Lowercase platform identifier
    pub platform: String,
    /// Throttled method
    pub method: Method,
}

impl BudgetKey {
    /// Build a key, normalizing the platform to lowercase.
    #[must_use]
    pub fn new(platform: &str, method: Method) -> Self {
        Self {
            platform: platform.trim().to_ascii_lowercase(),
            method,
        }
    }
}

/// Capacity and window of a budget: `count` requests per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSpec {
    /// Requests allowed per window, also the bucket capacity
    pub count: u32,
    /// Window length
    pub window: Duration,
}

impl BudgetSpec {
    /// Build a spec.
    #[must_use]
    pub const fn new(count: u32, window: Duration) -> Self {
        Self { count, window }
    }

    /// Spec applied to keys with no built-in default or override.
    pub const FALLBACK: Self = Self::new(10, HOUR);

    /// Built-in default for a key.
    #[must_use]
    pub fn default_for(platform: &str, method: Method) -> Self {
        match (platform.parse::<Platform>(), method) {
            (Ok(Platform::Instagram), Method::Api) => Self::new(200, HOUR),
            (Ok(Platform::Instagram), Method::Scraping) => Self::new(20, HOUR),
            (Ok(Platform::LinkedIn), Method::Api) => Self::new(500, DAY),
            (Ok(Platform::LinkedIn), Method::Scraping) => Self::new(10, HOUR),
            (Err(_), _) => Self::FALLBACK,
        }
    }

    fn build(self) -> RateBudget {
        RateBudget::per_window(self.count, self.window)
    }
}

/// Owns one [`RateBudget`] per `(platform, method)` key.
///
/// Budgets are created on first use and live as long as the registry;
/// there is no eviction. Clones share the same budgets.
#[derive(Clone, Default)]
pub struct BudgetRegistry {
    /// Live budgets, indexed by key
    budgets: Arc<RwLock<HashMap<BudgetKey, Arc<RateBudget>>>>,
    /// Configured specs that take precedence over built-in defaults
    overrides: Arc<HashMap<BudgetKey, BudgetSpec>>,
}

impl BudgetRegistry {
    /// Create a registry using only the built-in defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Create a registry with configured overrides.
    ///
    /// Entries with an unrecognized method are skipped with a warning.
    #[must_use]
    pub fn from_config(limits: &[RateLimitConfig]) -> Self {
        let mut overrides = HashMap::new();
        for limit in limits {
            let method = match limit.method.parse::<Method>() {
                Ok(method) => method,
                Err(e) => {
                    warn!(platform = %limit.platform, "skipping rate limit override: {e}");
                    continue;
                }
            };
            let key = BudgetKey::new(&limit.platform, method);
            debug!(
                platform = %key.platform,
                method = %method,
                capacity = limit.capacity,
                per_seconds = limit.per_seconds,
                "rate limit override"
            );
            overrides.insert(
                key,
                BudgetSpec::new(limit.capacity, Duration::from_secs(limit.per_seconds)),
            );
        }

        Self {
            budgets: Arc::default(),
            overrides: Arc::new(overrides),
        }
    }

    /// Override the spec for a key before first use.
    #[must_use]
    pub fn with_budget(mut self, platform: &str, method: Method, spec: BudgetSpec) -> Self {
        Arc::make_mut(&mut self.overrides).insert(BudgetKey::new(platform, method), spec);
        self
    }

    /// Spec a new budget for this key would be created with.
    #[must_use]
    pub fn spec_for(&self, platform: &str, method: Method) -> BudgetSpec {
        let key = BudgetKey::new(platform, method);
        self.overrides
            .get(&key)
            .copied()
            .unwrap_or_else(|| BudgetSpec::default_for(&key.platform, method))
    }

    /// Budget for a key, created on first use. Never fails.
    pub fn get(&self, platform: &str, method: Method) -> Arc<RateBudget> {
        let key = BudgetKey::new(platform, method);

        {
            let budgets = self.budgets.read().expect("acquire read lock on budgets");
            if let Some(budget) = budgets.get(&key) {
                return Arc::clone(budget);
            }
        }

        let spec = self.spec_for(&key.platform, method);
        let mut budgets = self.budgets.write().expect("acquire write lock on budgets");
        let budget = budgets.entry(key).or_insert_with_key(|key| {
            info!(
                platform = %key.platform,
                method = %key.method,
                capacity = spec.count,
                window_secs = spec.window.as_secs(),
                "created rate budget"
            );
            Arc::new(spec.build())
        });
        Arc::clone(budget)
    }

    /// Wait for and take `n` tokens from the budget for a key.
    pub async fn wait_for(&self, platform: &str, method: Method, n: u32) -> Duration {
        self.get(platform, method).wait_and_acquire(n).await
    }

    /// Number of budgets created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.budgets.read().expect("acquire read lock on budgets").len()
    }

    /// Whether no budget has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_specs() {
        assert_eq!(
            BudgetSpec::default_for("instagram", Method::Api),
            BudgetSpec::new(200, HOUR)
        );
        assert_eq!(
            BudgetSpec::default_for("instagram", Method::Scraping),
            BudgetSpec::new(20, HOUR)
        );
        assert_eq!(
            BudgetSpec::default_for("linkedin", Method::Api),
            BudgetSpec::new(500, DAY)
        );
        assert_eq!(
            BudgetSpec::default_for("linkedin", Method::Scraping),
            BudgetSpec::new(10, HOUR)
        );
        assert_eq!(
            BudgetSpec::default_for("tiktok", Method::Api),
            BudgetSpec::FALLBACK
        );
    }

    #[tokio::test]
    async fn test_get_returns_same_budget() {
        let registry = BudgetRegistry::with_defaults();
        assert!(registry.is_empty());

        let a = registry.get("instagram", Method::Scraping);
        let b = registry.get("Instagram", Method::Scraping);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);

        let c = registry.get("instagram", Method::Api);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_budgets() {
        let registry = BudgetRegistry::with_defaults();
        let clone = registry.clone();

        assert!(registry.get("linkedin", Method::Scraping).acquire(10).await);
        assert!(!clone.get("linkedin", Method::Scraping).acquire(1).await);
    }

    #[tokio::test]
    async fn test_config_overrides() {
        let registry = BudgetRegistry::from_config(&[
            RateLimitConfig {
                platform: "instagram".to_string(),
                method: "scraping".to_string(),
                capacity: 2,
                per_seconds: 60,
            },
            RateLimitConfig {
                platform: "instagram".to_string(),
                method: "teleport".to_string(),
                capacity: 99,
                per_seconds: 1,
            },
        ]);

        let budget = registry.get("instagram", Method::Scraping);
        assert!((budget.capacity() - 2.0).abs() < f64::EPSILON);
        assert_eq!(
            registry.spec_for("instagram", Method::Api),
            BudgetSpec::new(200, HOUR)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_consumes_token() {
        let registry = BudgetRegistry::with_defaults().with_budget(
            "instagram",
            Method::Api,
            BudgetSpec::new(1, Duration::from_secs(10)),
        );

        assert_eq!(registry.wait_for("instagram", Method::Api, 1).await, Duration::ZERO);
        let waited = registry.wait_for("instagram", Method::Api, 1).await;
        assert!(waited >= Duration::from_secs(9), "waited {waited:?}");
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("API".parse::<Method>().expect("parse"), Method::Api);
        assert_eq!("scraping".parse::<Method>().expect("parse"), Method::Scraping);
        assert!("fetch".parse::<Method>().is_err());
    }
}
