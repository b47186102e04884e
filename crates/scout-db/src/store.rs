//! The storage capability used by the auto cycle.

use crate::error::Result;
use crate::profiles::{self, StoreStats};
use crate::Database;
use async_trait::async_trait;
use scout_core::ProfileRecord;

/// Persists scraped profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or update a profile keyed by its URL. Returns `true` when it was new.
    async fn upsert(&self, record: &ProfileRecord) -> Result<bool>;

    /// Whether a profile with this URL is already stored.
    async fn exists(&self, profile_url: &str) -> Result<bool>;

    /// Counts by source and niche.
    async fn stats(&self) -> Result<StoreStats>;
}

#[async_trait]
impl ProfileStore for Database {
    async fn upsert(&self, record: &ProfileRecord) -> Result<bool> {
        profiles::upsert_profile(self.pool(), record).await
    }

    async fn exists(&self, profile_url: &str) -> Result<bool> {
        profiles::profile_exists(self.pool(), profile_url).await
    }

    async fn stats(&self) -> Result<StoreStats> {
        profiles::profile_stats(self.pool()).await
    }
}
