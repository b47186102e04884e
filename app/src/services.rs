//! Service wiring for the binary.

use anyhow::{Context, Result};
use scout_budget::BudgetRegistry;
use scout_core::{AppConfig, Credentials};
use scout_db::Database;
use scout_engine::{BatchOrchestrator, DiscoveryEngine, ScrapeProtocol};
use scout_browser::{ChromeController, PageController, ProxyPool};
use scout_niche::{KeywordClassifier, NicheClassifier};
use scout_scheduler::{AutoCycle, JobQueue};
use std::path::Path;
use std::sync::Arc;

/// Load config from `path` if given, else from the XDG location, then apply the environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.credentials = Credentials::from_env();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Everything a command needs, built once from config.
pub struct Services {
    pub config: AppConfig,
    pub db: Arc<Database>,
    browser: Arc<ChromeController>,
    proxies: ProxyPool,
    budgets: BudgetRegistry,
    classifier: Arc<dyn NicheClassifier>,
}

impl Services {
    /// Open the database and launch the browser, through a random proxy if any are configured.
    pub async fn start(config: AppConfig) -> Result<Self> {
        let proxies = ProxyPool::from_config(&config.proxies).context("invalid proxy list")?;

        let db_path = config.database_path()?;
        let db = Database::new(&db_path)
            .await
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        db.run_migrations().await?;
        tracing::info!("Database ready at {}", db_path.display());

        let browser_proxy = if proxies.is_empty() { None } else { proxies.random() };
        let browser = ChromeController::launch(&config.browser, browser_proxy.as_ref())
            .await
            .context("failed to launch browser")?;

        Ok(Self {
            budgets: BudgetRegistry::from_config(&config.rate_limits),
            classifier: Arc::new(KeywordClassifier::default()),
            db: Arc::new(db),
            browser: Arc::new(browser),
            proxies,
            config,
        })
    }

    /// Discovery engine over the shared browser and budgets.
    pub fn discovery(&self) -> DiscoveryEngine {
        DiscoveryEngine::new(
            self.controller(),
            self.budgets.clone(),
            Arc::clone(&self.classifier),
            self.config.discovery.clone(),
        )
    }

    /// Orchestrator over a protocol with every credentialed API client.
    /// API clients take the next proxy in rotation.
    pub fn orchestrator(&self) -> Result<BatchOrchestrator> {
        let api_proxy = if self.proxies.is_empty() { None } else { self.proxies.next_proxy() };
        let apis = scout_api::clients_from_credentials(&self.config.credentials, api_proxy.as_ref())?;
        if apis.is_empty() {
            tracing::info!("No API credentials configured, scraping pages only");
        }
        let protocol = ScrapeProtocol::new(
            self.controller(),
            self.budgets.clone(),
            Arc::clone(&self.classifier),
        )
        .with_apis(apis)
        .with_store_raw(self.config.scraping.store_raw);
        Ok(BatchOrchestrator::new(Arc::new(protocol)))
    }

    /// Auto cycle wired to discovery, a job queue and the database.
    pub fn auto_cycle(&self, export: Option<&Path>) -> Result<AutoCycle> {
        let queue = JobQueue::from_config(Arc::new(self.orchestrator()?), &self.config.scraping);
        let cycle = AutoCycle::new(
            Arc::new(self.discovery()),
            Arc::new(queue),
            self.db.clone(),
            self.config.cycle.clone(),
        )
        .with_hashtags(self.config.discovery.hashtags.clone());
        Ok(match export {
            Some(path) => cycle.with_csv_export(path),
            None => cycle,
        })
    }

    /// Close the browser and the database.
    pub async fn shutdown(self) {
        match Arc::try_unwrap(self.browser) {
            Ok(browser) => {
                if let Err(e) = browser.shutdown().await {
                    tracing::warn!("Failed to close browser: {}", e);
                }
            }
            Err(_) => tracing::warn!("Browser still in use at shutdown"),
        }
        match Arc::try_unwrap(self.db) {
            Ok(db) => db.close().await,
            Err(_) => tracing::debug!("Database still shared at shutdown"),
        }
    }

    fn controller(&self) -> Arc<dyn PageController> {
        self.browser.clone()
    }
}
