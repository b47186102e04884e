//! LinkedIn v2 API client.

use crate::client::{get_json, http_client, ApiProfile, ProfileApi};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use scout_core::parse::{parse_timestamp, truncate_caption};
use scout_core::{Handle, Platform, Post};
use serde_json::Value;
use url::Url;

const PROFILE_PROJECTION: &str = "(id,firstName,lastName,headline,summary,location,industry,numConnections,profilePicture(displayImage~:playableStreams))";

/// LinkedIn API client using a bearer token.
pub struct LinkedInClient {
    access_token: String,
    client: Client,
    base_url: String,
}

impl LinkedInClient {
    /// Create a client against the public v2 API.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_token, "https://api.linkedin.com/v2")
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

    fn person_url(&self, id: &str) -> String {
        format!("{}/people/(id:{id})", self.base_url)
    }

    fn profile_from_response(raw: Value) -> ApiProfile {
        let localized = |field: &str| {
            raw.pointer(&format!("/{field}/localized/en_US"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };

        let display_name = [localized("firstName"), localized("lastName")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let bio = [localized("headline"), localized("summary")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n");

        let avatar_url = raw
            .pointer("/profilePicture/displayImage~/elements/0/identifiers/0/identifier")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let location = raw
            .pointer("/location/name")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let follower_count = raw.get("numConnections").and_then(Value::as_u64);

        ApiProfile {
            display_name: Some(display_name).filter(|s| !s.is_empty()),
            bio: Some(bio).filter(|s| !s.is_empty()),
            location,
            follower_count,
            following_count: None,
            post_count: None,
            avatar_url,
            raw,
        }
    }

    /// Articles from an activity feed; other activity types are dropped.
    fn posts_from_activities(elements: &[Value]) -> Vec<Post> {
        elements
            .iter()
            .filter(|a| a.get("activityType").and_then(Value::as_str) == Some("ARTICLE"))
            .filter_map(|a| {
                let url = a.get("permalink").and_then(Value::as_str)?;
                let timestamp = match a.get("created") {
                    Some(Value::String(s)) => parse_timestamp(s),
                    Some(Value::Number(n)) => parse_timestamp(&n.to_string()),
                    _ => None,
                };
                Some(Post {
                    url: url.to_string(),
                    timestamp,
                    likes: a.get("numLikes").and_then(Value::as_u64),
                    comments: a.get("numComments").and_then(Value::as_u64),
                    caption: a.get("title").and_then(Value::as_str).map(truncate_caption),
                    engagement_rate: None,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProfileApi for LinkedInClient {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    /// LinkedIn addresses people by their public vanity name, so no lookup is needed.
    async fn resolve_identity(&self, handle: &Handle) -> Result<Option<String>> {
        Ok(Some(handle.as_str().to_string()))
    }

    async fn fetch_profile(&self, id: &str) -> Result<Option<ApiProfile>> {
        let request = self
            .client
            .get(self.person_url(id))
            .bearer_auth(&self.access_token)
            .query(&[("projection", PROFILE_PROJECTION)]);

        let body: Option<Value> = get_json(Platform::LinkedIn, request).await?;
        Ok(body.map(Self::profile_from_response))
    }

    async fn fetch_recent_content(&self, id: &str, limit: usize) -> Result<Vec<Post>> {
        let request = self
            .client
            .get(format!("{}/activities", self.person_url(id)))
            .bearer_auth(&self.access_token)
            .query(&[("count", limit)]);

        let body: Option<Value> = get_json(Platform::LinkedIn, request).await?;
        let elements = body
            .as_ref()
            .and_then(|b| b.get("elements"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(Self::posts_from_activities(elements))
    }
}
