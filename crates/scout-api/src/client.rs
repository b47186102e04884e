//! The profile API capability and shared HTTP plumbing.

use crate::error::{ApiError, Result};
use crate::instagram::InstagramGraphClient;
use crate::linkedin::LinkedInClient;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use scout_core::{Credentials, Handle, Platform, Post};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Profile fields returned by a platform API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiProfile {
    /// Display name
    pub display_name: Option<String>,
    /// Bio, or headline and summary
    pub bio: Option<String>,
    /// Free-form location
    pub location: Option<String>,
    /// Followers or connections
    pub follower_count: Option<u64>,
    /// Accounts followed
    pub following_count: Option<u64>,
    /// Published media count
    pub post_count: Option<u64>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Response body as received
    pub raw: serde_json::Value,
}

/// Credentialed API for one platform.
///
/// The three calls run in order: resolve the handle to a platform id, fetch
/// the profile, then fetch recent content. `Ok(None)` means the platform has
/// no such account or refused to expose it.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// Platform this client talks to.
    fn platform(&self) -> Platform;

    /// Map a public handle to the platform's internal id.
    async fn resolve_identity(&self, handle: &Handle) -> Result<Option<String>>;

    /// Fetch profile fields for an id.
    async fn fetch_profile(&self, id: &str) -> Result<Option<ApiProfile>>;

    /// Fetch up to `limit` recent posts for an id. Engagement rates are left unset.
    async fn fetch_recent_content(&self, id: &str, limit: usize) -> Result<Vec<Post>>;
}

/// Build a client for every platform that has an access token, sending
/// requests through `proxy` when given.
pub fn clients_from_credentials(
    credentials: &Credentials,
    proxy: Option<&Url>,
) -> Result<Vec<Arc<dyn ProfileApi>>> {
    let mut clients: Vec<Arc<dyn ProfileApi>> = Vec::new();
    if let Some(token) = credentials.token_for(Platform::Instagram) {
        let client = InstagramGraphClient::new(token)?;
        clients.push(Arc::new(match proxy {
            Some(proxy) => client.with_proxy(proxy)?,
            None => client,
        }));
    }
    if let Some(token) = credentials.token_for(Platform::LinkedIn) {
        let client = LinkedInClient::new(token)?;
        clients.push(Arc::new(match proxy {
            Some(proxy) => client.with_proxy(proxy)?,
            None => client,
        }));
    }
    tracing::debug!(
        count = clients.len(),
        proxied = proxy.is_some(),
        "configured API clients"
    );
    Ok(clients)
}

pub(crate) fn http_client(proxy: Option<&Url>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(std::time::Duration::from_secs(30));
    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
            ApiError::Internal(format!("invalid proxy {}: {e}", proxy.host_str().unwrap_or_default()))
        })?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| ApiError::Internal(format!("failed to create HTTP client: {e}")))
}

/// Send a request and decode a JSON body. A 404 is `Ok(None)`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    platform: Platform,
    request: RequestBuilder,
) -> Result<Option<T>> {
    let response = request.send().await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::Status {
            platform: platform.to_string(),
            status: status.as_u16(),
            message: error_text,
        });
    }

    let body = response.json().await.map_err(|e| ApiError::Parse {
        platform: platform.to_string(),
        message: format!("Failed to parse response: {e}"),
    })?;
    Ok(Some(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_follow_credentials() {
        let none = clients_from_credentials(&Credentials::default(), None).expect("build clients");
        assert!(none.is_empty());

        let creds = Credentials {
            instagram_access_token: None,
            linkedin_access_token: Some("li-token".to_string()),
        };
        let clients = clients_from_credentials(&creds, None).expect("build clients");
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].platform(), Platform::LinkedIn);
    }

    #[test]
    fn test_clients_accept_proxies() {
        let creds = Credentials {
            instagram_access_token: Some("ig-token".to_string()),
            linkedin_access_token: Some("li-token".to_string()),
        };
        for raw in ["http://user:pw@127.0.0.1:8080", "socks5://127.0.0.1:1080"] {
            let proxy = Url::parse(raw).expect("url");
            let clients = clients_from_credentials(&creds, Some(&proxy)).expect("build clients");
            assert_eq!(clients.len(), 2);
        }
    }

    #[test]
    fn test_http_client_with_proxy() {
        let proxy = Url::parse("https://proxy.example.com:3128").expect("url");
        assert!(http_client(Some(&proxy)).is_ok());
        assert!(http_client(None).is_ok());
    }
}
