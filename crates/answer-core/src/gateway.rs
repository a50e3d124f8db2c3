use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;

use crate::aggregate::{fold_stream_answer_body, project_answer, ReasoningAccumulator};
use crate::auth::TokenProvider;
use crate::client::BackendClient;
use crate::decode::{decode_unary, line_chunks};
use crate::error::{GatewayError, Result};
use crate::session::SessionManager;
use crate::types::{AnswerEnvelope, AnswerMode, BackendTarget, Query};

/// Answers one query end to end: validate, authenticate, resolve the session,
/// call the backend, decode and fold.
///
/// Holds only process-scoped, read-only state; every request gets its own
/// decoder and accumulator.
pub struct AnswerService {
    backend: BackendClient,
    tokens: Arc<dyn TokenProvider>,
}

impl AnswerService {
    pub fn new(backend: BackendClient, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { backend, tokens }
    }

    pub async fn answer(&self, query: &Query, mode: AnswerMode) -> Result<AnswerEnvelope> {
        query.validate()?;

        let target = BackendTarget::select(self.backend.config(), query, mode);
        let backend = target.kind();

        let token = self.tokens.access_token().await.map_err(|e| {
            log::error!("Error getting access token: {}", e);
            e
        })?;

        let session = SessionManager::new(&self.backend)
            .ensure(&target, query.session(), &token)
            .await;

        let started = Instant::now();
        let response = self
            .backend
            .send(&target, query, session.as_deref(), &token)
            .await?;

        let envelope = match &target {
            BackendTarget::ReasoningEngine { .. } => {
                let mut accumulator = ReasoningAccumulator::new();
                let mut chunks = line_chunks(response.bytes_stream());
                while let Some(chunk) = chunks.next().await {
                    accumulator.push(&chunk);
                }
                accumulator.finish(session)
            }
            BackendTarget::DocumentAnswer(_) => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::transport(backend, e))?;
                project_answer(&decode_unary(backend, &body)?)
            }
            BackendTarget::DocumentStreamAnswer(_) => {
                // The whole body is buffered before decoding.
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::transport(backend, e))?;
                fold_stream_answer_body(&body, session)
            }
        };

        log::info!(
            "{:?} call took: {:.4} seconds",
            backend,
            started.elapsed().as_secs_f64()
        );

        Ok(envelope)
    }
}
