//! Profile operations on the `profiles` table.
//!
//! Rows are keyed by profile URL. Upserting never clears a stored field:
//! a `None` in the incoming record keeps whatever value is already there.

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use scout_core::{Handle, Platform, Post, ProfileRecord};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::collections::BTreeMap;

/// Row counts across the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total stored profiles
    pub total: u64,
    /// Profiles per source platform
    pub by_source: BTreeMap<String, u64>,
    /// Profiles per niche label; profiles without a niche are not counted
    pub by_niche: BTreeMap<String, u64>,
}

/// Insert or update a profile. Returns `true` when a new row was created.
///
/// # Errors
/// Returns `StoreError::Invalid` if the record breaks its invariants.
pub async fn upsert_profile(pool: &Pool<Sqlite>, record: &ProfileRecord) -> Result<bool> {
    record
        .validate()
        .map_err(|e| StoreError::Invalid(e.to_string()))?;

    let existed = profile_exists(pool, &record.profile_url).await?;
    let top_posts = serde_json::to_string(&record.top_posts)?;
    let recent_posts = serde_json::to_string(&record.recent_posts)?;
    let raw = record.raw.as_ref().map(serde_json::to_string).transpose()?;

    sqlx::query(
        "INSERT INTO profiles (profile_url, source, handle, display_name, bio, niche,
                               public_contact_email, location, follower_count, following_count,
                               post_count, engagement_rate, top_posts, recent_posts, avatar_url,
                               raw, scraped_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(profile_url) DO UPDATE SET
             source = excluded.source,
             handle = excluded.handle,
             display_name = COALESCE(excluded.display_name, profiles.display_name),
             bio = COALESCE(excluded.bio, profiles.bio),
             niche = COALESCE(excluded.niche, profiles.niche),
             public_contact_email = COALESCE(excluded.public_contact_email, profiles.public_contact_email),
             location = COALESCE(excluded.location, profiles.location),
             follower_count = COALESCE(excluded.follower_count, profiles.follower_count),
             following_count = COALESCE(excluded.following_count, profiles.following_count),
             post_count = COALESCE(excluded.post_count, profiles.post_count),
             engagement_rate = COALESCE(excluded.engagement_rate, profiles.engagement_rate),
             top_posts = excluded.top_posts,
             recent_posts = excluded.recent_posts,
             avatar_url = COALESCE(excluded.avatar_url, profiles.avatar_url),
             raw = COALESCE(excluded.raw, profiles.raw),
             scraped_at = excluded.scraped_at,
             updated_at = excluded.updated_at",
    )
    .bind(&record.profile_url)
    .bind(record.source.as_str())
    .bind(record.handle.as_str())
    .bind(&record.display_name)
    .bind(&record.bio)
    .bind(&record.niche)
    .bind(&record.public_contact_email)
    .bind(&record.location)
    .bind(record.follower_count.map(to_i64))
    .bind(record.following_count.map(to_i64))
    .bind(record.post_count.map(to_i64))
    .bind(record.engagement_rate)
    .bind(&top_posts)
    .bind(&recent_posts)
    .bind(&record.avatar_url)
    .bind(&raw)
    .bind(record.scraped_at.to_rfc3339())
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    tracing::info!(
        platform = %record.source,
        handle = %record.handle,
        created = !existed,
        "Upserted creator profile"
    );
    Ok(!existed)
}

/// Whether a profile with this URL is stored.
pub async fn profile_exists(pool: &Pool<Sqlite>, profile_url: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE profile_url = ?")
        .bind(profile_url)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Fetch one profile by URL.
pub async fn get_profile(pool: &Pool<Sqlite>, profile_url: &str) -> Result<Option<ProfileRecord>> {
    let row = sqlx::query("SELECT * FROM profiles WHERE profile_url = ?")
        .bind(profile_url)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(profile_from_row).transpose()
}

/// Profiles from one source, most recently scraped first.
pub async fn list_by_source(
    pool: &Pool<Sqlite>,
    source: Platform,
    limit: u32,
) -> Result<Vec<ProfileRecord>> {
    let rows = sqlx::query("SELECT * FROM profiles WHERE source = ? ORDER BY scraped_at DESC LIMIT ?")
        .bind(source.as_str())
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows.iter().map(profile_from_row).collect()
}

/// Profiles with a niche label, most recently scraped first.
pub async fn list_by_niche(pool: &Pool<Sqlite>, niche: &str, limit: u32) -> Result<Vec<ProfileRecord>> {
    let rows = sqlx::query("SELECT * FROM profiles WHERE niche = ? ORDER BY scraped_at DESC LIMIT ?")
        .bind(niche)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows.iter().map(profile_from_row).collect()
}

/// Profiles with a known follower count, largest audience first.
pub async fn top_profiles(
    pool: &Pool<Sqlite>,
    source: Option<Platform>,
    niche: Option<&str>,
    limit: u32,
) -> Result<Vec<ProfileRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM profiles
         WHERE follower_count IS NOT NULL
           AND (?1 IS NULL OR source = ?1)
           AND (?2 IS NULL OR niche = ?2)
         ORDER BY follower_count DESC
         LIMIT ?3",
    )
    .bind(source.map(|s| s.as_str()))
    .bind(niche)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.iter().map(profile_from_row).collect()
}

/// Delete a profile. Returns `false` if no row matched.
pub async fn delete_profile(pool: &Pool<Sqlite>, profile_url: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM profiles WHERE profile_url = ?")
        .bind(profile_url)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!("Deleted creator: {}", profile_url);
    } else {
        tracing::warn!("Creator not found for deletion: {}", profile_url);
    }
    Ok(deleted)
}

/// Total, per-source and per-niche counts.
pub async fn profile_stats(pool: &Pool<Sqlite>) -> Result<StoreStats> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(pool)
        .await?;

    let by_source = sqlx::query_as::<_, (String, i64)>(
        "SELECT source, COUNT(*) FROM profiles GROUP BY source",
    )
    .fetch_all(pool)
    .await?;

    let by_niche = sqlx::query_as::<_, (String, i64)>(
        "SELECT niche, COUNT(*) FROM profiles WHERE niche IS NOT NULL GROUP BY niche",
    )
    .fetch_all(pool)
    .await?;

    Ok(StoreStats {
        total: to_u64(total),
        by_source: by_source.into_iter().map(|(k, v)| (k, to_u64(v))).collect(),
        by_niche: by_niche.into_iter().map(|(k, v)| (k, to_u64(v))).collect(),
    })
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn profile_from_row(row: &SqliteRow) -> Result<ProfileRecord> {
    let source: String = row.try_get("source")?;
    let source: Platform = source
        .parse()
        .map_err(|e| StoreError::Decode(format!("invalid source '{source}': {e}")))?;

    let handle: String = row.try_get("handle")?;
    let handle: Handle = source
        .parse_handle(&handle)
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    let profile_url: String = row.try_get("profile_url")?;
    let mut record = ProfileRecord::new(source, handle, profile_url);

    record.display_name = row.try_get("display_name")?;
    record.bio = row.try_get("bio")?;
    record.niche = row.try_get("niche")?;
    record.public_contact_email = row.try_get("public_contact_email")?;
    record.location = row.try_get("location")?;
    record.follower_count = row.try_get::<Option<i64>, _>("follower_count")?.map(to_u64);
    record.following_count = row.try_get::<Option<i64>, _>("following_count")?.map(to_u64);
    record.post_count = row.try_get::<Option<i64>, _>("post_count")?.map(to_u64);
    record.engagement_rate = row.try_get("engagement_rate")?;
    record.avatar_url = row.try_get("avatar_url")?;

    let top_posts: String = row.try_get("top_posts")?;
    record.top_posts = decode_posts(&top_posts)?;
    let recent_posts: String = row.try_get("recent_posts")?;
    record.recent_posts = decode_posts(&recent_posts)?;

    let raw: Option<String> = row.try_get("raw")?;
    record.raw = raw.as_deref().map(serde_json::from_str).transpose()?;

    let scraped_at: String = row.try_get("scraped_at")?;
    record.scraped_at = DateTime::parse_from_rfc3339(&scraped_at)
        .map_err(|e| StoreError::Decode(format!("invalid scraped_at '{scraped_at}': {e}")))?
        .with_timezone(&Utc);

    Ok(record)
}

fn decode_posts(json: &str) -> Result<Vec<Post>> {
    serde_json::from_str(json).map_err(|e| StoreError::Decode(format!("invalid posts column: {e}")))
}
