use std::time::Duration;

use crate::types::DocumentEngine;

pub const DEFAULT_DISCOVERY_BASE_URL: &str = "https://discoveryengine.googleapis.com";
pub const DEFAULT_METADATA_BASE_URL: &str = "http://metadata.google.internal";

/// Static backend settings, built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub project_id: String,
    pub location: String,
    pub collection_id: String,
    pub engine_id: String,
    pub serving_config_id: String,
    pub reasoning_engine_location: String,
    pub discovery_base_url: String,
    /// Overrides `https://{location}-aiplatform.googleapis.com` when set.
    pub reasoning_base_url: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: "global".to_string(),
            collection_id: "default_collection".to_string(),
            engine_id: String::new(),
            serving_config_id: "default_search".to_string(),
            reasoning_engine_location: "us-central1".to_string(),
            discovery_base_url: DEFAULT_DISCOVERY_BASE_URL.to_string(),
            reasoning_base_url: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(120),
        }
    }
}

impl BackendConfig {
    pub fn document_engine(&self) -> DocumentEngine {
        DocumentEngine {
            project_id: self.project_id.clone(),
            location: self.location.clone(),
            collection_id: self.collection_id.clone(),
            engine_id: self.engine_id.clone(),
            serving_config_id: self.serving_config_id.clone(),
        }
    }

    pub(crate) fn discovery_base(&self) -> &str {
        self.discovery_base_url.trim_end_matches('/')
    }

    pub(crate) fn reasoning_base(&self, location: &str) -> String {
        match &self.reasoning_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", location),
        }
    }
}
