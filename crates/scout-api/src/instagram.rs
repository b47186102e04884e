//! Instagram Graph API client.

use crate::client::{get_json, http_client, ApiProfile, ProfileApi};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use scout_core::parse::{parse_timestamp, truncate_caption};
use scout_core::{Handle, Platform, Post};
use serde::Deserialize;
use url::Url;

const PROFILE_FIELDS: &str =
    "id,username,biography,followers_count,follows_count,media_count,profile_picture_url,website";
const MEDIA_FIELDS: &str =
    "id,media_type,media_url,permalink,timestamp,caption,like_count,comments_count";

/// Instagram Graph API client.
pub struct InstagramGraphClient {
    access_token: String,
    client: Client,
    base_url: String,
}

impl InstagramGraphClient {
    /// Create a client against the public Graph API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_token, "https://graph.instagram.com/v18.0")
    }

    /// Create a client against a custom base URL.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            access_token: access_token.into(),
            client: http_client(None)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Send this client's requests through `proxy`.
    ///
    /// # Errors
    /// Returns error if the proxy URL is rejected by the HTTP client.
    pub fn with_proxy(mut self, proxy: &Url) -> Result<Self> {
        self.client = http_client(Some(proxy))?;
        Ok(self)
    }

    fn profile_from_response(raw: serde_json::Value) -> Option<ApiProfile> {
        let user: GraphUser = serde_json::from_value(raw.clone()).ok()?;
        Some(ApiProfile {
            display_name: user.username,
            bio: user.biography.filter(|b| !b.is_empty()),
            location: None,
            follower_count: user.followers_count,
            following_count: user.follows_count,
            post_count: user.media_count,
            avatar_url: user.profile_picture_url.filter(|u| !u.is_empty()),
            raw,
        })
    }

    fn posts_from_media(media: Vec<GraphMedia>) -> Vec<Post> {
        media
            .into_iter()
            .filter_map(|m| {
                Some(Post {
                    url: m.permalink.filter(|p| !p.is_empty())?,
                    timestamp: m.timestamp.as_deref().and_then(parse_timestamp),
                    likes: m.like_count,
                    comments: m.comments_count,
                    caption: m.caption.as_deref().map(truncate_caption),
                    engagement_rate: None,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProfileApi for InstagramGraphClient {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn resolve_identity(&self, handle: &Handle) -> Result<Option<String>> {
        let request = self
            .client
            .get(format!("{}/{}", self.base_url, handle.as_str()))
            .query(&[("fields", "id"), ("access_token", self.access_token.as_str())]);

        let body: Option<GraphId> = get_json(Platform::Instagram, request).await?;
        Ok(body.and_then(|b| b.id).filter(|id| !id.is_empty()))
    }

    async fn fetch_profile(&self, id: &str) -> Result<Option<ApiProfile>> {
        let request = self
            .client
            .get(format!("{}/{id}", self.base_url))
            .query(&[
                ("fields", PROFILE_FIELDS),
                ("access_token", self.access_token.as_str()),
            ]);

        let body: Option<serde_json::Value> = get_json(Platform::Instagram, request).await?;
        Ok(body.and_then(Self::profile_from_response))
    }

    async fn fetch_recent_content(&self, id: &str, limit: usize) -> Result<Vec<Post>> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(format!("{}/{id}/media", self.base_url))
            .query(&[
                ("fields", MEDIA_FIELDS),
                ("limit", limit.as_str()),
                ("access_token", self.access_token.as_str()),
            ]);

        let body: Option<GraphList<GraphMedia>> = get_json(Platform::Instagram, request).await?;
        Ok(body.map(|b| Self::posts_from_media(b.data)).unwrap_or_default())
    }
}

// Graph API types

#[derive(Debug, Deserialize)]
struct GraphId {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphUser {
    username: Option<String>,
    biography: Option<String>,
    followers_count: Option<u64>,
    follows_count: Option<u64>,
    media_count: Option<u64>,
    profile_picture_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GraphMedia {
    permalink: Option<String>,
    timestamp: Option<String>,
    caption: Option<String>,
    like_count: Option<u64>,
    comments_count: Option<u64>,
}
