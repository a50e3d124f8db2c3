//! Bearer token sources for outbound backend calls.
//!
//! Token sources:
//! 1. A fixed token handed over at startup ([`StaticTokenProvider`])
//! 2. The compute metadata server, cached until shortly before expiry
//!    ([`MetadataTokenProvider`])

mod cache;
mod metadata;

pub use cache::CachedToken;
pub use metadata::MetadataTokenProvider;

use async_trait::async_trait;

use crate::error::{GatewayError, Result};

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a bearer token valid for at least the next backend call.
    async fn access_token(&self) -> Result<String>;
}

pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(GatewayError::Auth("no access token configured".to_string()));
        }
        Ok(self.token.clone())
    }
}
