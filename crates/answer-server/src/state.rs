use std::sync::Arc;

use answer_core::{
    AnswerService, BackendClient, BackendConfig, MetadataTokenProvider, StaticTokenProvider,
    TokenProvider,
};

pub struct AppState {
    pub answers: AnswerService,
}

impl AppState {
    pub fn new(answers: AnswerService) -> Self {
        Self { answers }
    }

    /// Build the process-wide state: one HTTP client, one token source.
    ///
    /// A configured access token is used as-is; otherwise tokens come from the
    /// metadata server.
    pub fn new_with_config(
        backend: BackendConfig,
        access_token: Option<String>,
        metadata_base_url: Option<String>,
    ) -> answer_core::Result<Self> {
        log::info!(
            "Creating backend client for project '{}' (location: {}, engine: {}, reasoning location: {})",
            backend.project_id,
            backend.location,
            backend.engine_id,
            backend.reasoning_engine_location
        );

        let client = BackendClient::new(backend)?;

        let tokens: Arc<dyn TokenProvider> = match access_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                log::info!("Using static access token");
                Arc::new(StaticTokenProvider::new(token))
            }
            None => {
                log::info!("Using metadata server access tokens");
                let provider = MetadataTokenProvider::new(client.http().clone());
                match metadata_base_url {
                    Some(url) => Arc::new(provider.with_base_url(url)),
                    None => Arc::new(provider),
                }
            }
        };

        Ok(Self::new(AnswerService::new(client, tokens)))
    }
}
