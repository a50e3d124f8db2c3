use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{CachedToken, TokenProvider};
use crate::config::DEFAULT_METADATA_BASE_URL;
use crate::error::{GatewayError, Result};

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// Service-account token from the compute metadata server.
///
/// The token is cached and refreshed once it gets within five minutes of
/// expiry. The cache lock is held across the refresh, so concurrent requests
/// wait for a single fetch instead of racing.
pub struct MetadataTokenProvider {
    client: Client,
    base_url: String,
    cache: Mutex<Option<CachedToken>>,
}

impl MetadataTokenProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_METADATA_BASE_URL.to_string(),
            cache: Mutex::new(None),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn fetch(&self) -> Result<CachedToken> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), TOKEN_PATH);
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| GatewayError::Auth(format!("metadata server unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!(
                "metadata server returned HTTP {}: {}",
                status, text
            )));
        }

        let body: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Auth(format!("invalid metadata token response: {}", e)))?;

        Ok(CachedToken::new(body.access_token, body.expires_in))
    }
}

#[async_trait]
impl TokenProvider for MetadataTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref().filter(|cached| cached.is_valid()) {
            return Ok(cached.token.clone());
        }

        let fresh = self.fetch().await?;
        log::info!(
            "Refreshed access token from metadata server ({}s remaining)",
            fresh.remaining_seconds()
        );
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}
