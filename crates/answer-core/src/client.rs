use std::time::Instant;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::BackendConfig;
use crate::error::{GatewayError, Result};
use crate::types::{BackendTarget, DocumentEngine, Query};

/// User id sent to the reasoning engine.
const REASONING_USER_ID: &str = "test";
/// Pseudo user the document engine sessions are created for.
const SESSION_PSEUDO_USER: &str = "test-user";
const ANSWER_LANGUAGE: &str = "en";

#[derive(Debug, Deserialize)]
struct CreatedSession {
    name: Option<String>,
}

/// Performs the single outbound call of a request against the selected backend.
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn answer_url(&self, target: &BackendTarget) -> String {
        match target {
            BackendTarget::ReasoningEngine {
                project_id,
                location,
                engine_id,
            } => format!(
                "{}/v1/projects/{}/locations/{}/reasoningEngines/{}:streamQuery?alt=sse",
                self.config.reasoning_base(location),
                project_id,
                location,
                engine_id
            ),
            BackendTarget::DocumentAnswer(engine) => format!(
                "{}/v1/{}/servingConfigs/{}:answer",
                self.config.discovery_base(),
                engine_path(engine),
                engine.serving_config_id
            ),
            BackendTarget::DocumentStreamAnswer(engine) => format!(
                "{}/v1beta/{}/servingConfigs/{}:streamAnswer",
                self.config.discovery_base(),
                engine_path(engine),
                engine.serving_config_id
            ),
        }
    }

    pub fn session_url(&self, engine: &DocumentEngine) -> String {
        format!(
            "{}/v1/{}/sessions",
            self.config.discovery_base(),
            engine_path(engine)
        )
    }

    /// Send the main answer request. Fails on transport errors and non-2xx statuses;
    /// the body is left unread for the decoder.
    pub async fn send(
        &self,
        target: &BackendTarget,
        query: &Query,
        session: Option<&str>,
        token: &str,
    ) -> Result<Response> {
        let backend = target.kind();
        let url = self.answer_url(target);
        let body = request_body(target, query, session);

        log::debug!("POST {} ({:?})", url, backend);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::transport(backend, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            log::warn!("{:?} backend returned HTTP {}: {}", backend, status, text);
            return Err(GatewayError::Transport {
                backend,
                status: Some(status.as_u16()),
                message: if text.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    text
                },
            });
        }

        Ok(response)
    }

    /// Create a document engine session and return its resource name.
    pub async fn create_session(&self, engine: &DocumentEngine, token: &str) -> Result<String> {
        let url = self.session_url(engine);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .json(&json!({ "userPseudoId": SESSION_PSEUDO_USER }))
            .send()
            .await
            .map_err(|e| GatewayError::Session(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Session(format!("HTTP {}: {}", status, text)));
        }

        let created: CreatedSession = response
            .json()
            .await
            .map_err(|e| GatewayError::Session(format!("invalid session response: {}", e)))?;

        log::debug!(
            "Session creation took: {:.4} seconds",
            started.elapsed().as_secs_f64()
        );

        created
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| GatewayError::Session("session response has no name".to_string()))
    }
}

fn engine_path(engine: &DocumentEngine) -> String {
    format!(
        "projects/{}/locations/{}/collections/{}/engines/{}",
        engine.project_id, engine.location, engine.collection_id, engine.engine_id
    )
}

/// Build the backend-specific JSON body for the main call.
pub fn request_body(target: &BackendTarget, query: &Query, session: Option<&str>) -> Value {
    match target {
        BackendTarget::ReasoningEngine { .. } => json!({
            "class_method": "async_stream_query",
            "input": {
                "message": query.text,
                "session_id": session.unwrap_or_default(),
                "user_id": REASONING_USER_ID,
            }
        }),
        BackendTarget::DocumentAnswer(_) => {
            let mut body = document_body(query, session);
            if let Some(filter) = query.filter() {
                body["searchSpec"] = json!({ "searchParams": { "filter": filter } });
            }
            body
        }
        BackendTarget::DocumentStreamAnswer(_) => document_body(query, session),
    }
}

fn document_body(query: &Query, session: Option<&str>) -> Value {
    let mut generation = json!({
        "includeCitations": true,
        "answerLanguageCode": ANSWER_LANGUAGE,
    });
    if let Some(preamble) = query.preamble() {
        generation["promptSpec"] = json!({ "preamble": preamble });
    }

    json!({
        "query": { "text": query.text },
        "session": session,
        "answerGenerationSpec": generation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> BackendConfig {
        BackendConfig {
            project_id: "proj".to_string(),
            engine_id: "eng".to_string(),
            ..BackendConfig::default()
        }
    }

    fn reasoning() -> BackendTarget {
        BackendTarget::ReasoningEngine {
            project_id: "proj".to_string(),
            location: "us-central1".to_string(),
            engine_id: "42".to_string(),
        }
    }

    #[test]
    fn builds_default_urls() {
        let client = BackendClient::with_client(Client::new(), config());
        let engine = client.config().document_engine();

        assert_eq!(
            client.answer_url(&reasoning()),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/proj/locations/us-central1/reasoningEngines/42:streamQuery?alt=sse"
        );
        assert_eq!(
            client.answer_url(&BackendTarget::DocumentAnswer(engine.clone())),
            "https://discoveryengine.googleapis.com/v1/projects/proj/locations/global/collections/default_collection/engines/eng/servingConfigs/default_search:answer"
        );
        assert_eq!(
            client.answer_url(&BackendTarget::DocumentStreamAnswer(engine.clone())),
            "https://discoveryengine.googleapis.com/v1beta/projects/proj/locations/global/collections/default_collection/engines/eng/servingConfigs/default_search:streamAnswer"
        );
        assert_eq!(
            client.session_url(&engine),
            "https://discoveryengine.googleapis.com/v1/projects/proj/locations/global/collections/default_collection/engines/eng/sessions"
        );
    }

    #[test]
    fn base_url_overrides_are_respected() {
        let config = BackendConfig {
            discovery_base_url: "http://127.0.0.1:9000/".to_string(),
            reasoning_base_url: Some("http://127.0.0.1:9001".to_string()),
            ..config()
        };
        let client = BackendClient::with_client(Client::new(), config);

        assert!(client
            .answer_url(&reasoning())
            .starts_with("http://127.0.0.1:9001/v1/projects/proj/"));
        assert!(client
            .session_url(&client.config().document_engine())
            .starts_with("http://127.0.0.1:9000/v1/projects/proj/"));
    }

    #[test]
    fn reasoning_body_shape() {
        let body = request_body(&reasoning(), &Query::new("hello"), Some(""));
        assert_eq!(
            body,
            json!({
                "class_method": "async_stream_query",
                "input": {"message": "hello", "session_id": "", "user_id": "test"}
            })
        );
    }

    #[test]
    fn document_body_optional_specs() {
        let engine = config().document_engine();
        let query = Query::new("q").with_preamble("Be brief").with_filter("lang: ANY(\"en\")");

        let body = request_body(&BackendTarget::DocumentAnswer(engine.clone()), &query, Some("s"));
        assert_eq!(body["session"], json!("s"));
        assert_eq!(body["answerGenerationSpec"]["promptSpec"]["preamble"], json!("Be brief"));
        assert_eq!(body["searchSpec"]["searchParams"]["filter"], json!("lang: ANY(\"en\")"));

        let body = request_body(&BackendTarget::DocumentStreamAnswer(engine.clone()), &query, None);
        assert_eq!(body["session"], Value::Null);
        assert!(body.get("searchSpec").is_none());

        let body = request_body(&BackendTarget::DocumentAnswer(engine), &Query::new("q"), None);
        assert_eq!(
            body,
            json!({
                "query": {"text": "q"},
                "session": null,
                "answerGenerationSpec": {"includeCitations": true, "answerLanguageCode": "en"}
            })
        );
    }

    #[tokio::test]
    async fn non_success_status_surfaces_body_text() {
        let mock_server = MockServer::start().await;
        let client = BackendClient::with_client(
            Client::new(),
            BackendConfig {
                discovery_base_url: mock_server.uri(),
                ..config()
            },
        );
        let target = BackendTarget::DocumentAnswer(client.config().document_engine());

        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/proj/locations/global/collections/default_collection/engines/eng/servingConfigs/default_search:answer",
            ))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&mock_server)
            .await;

        match client.send(&target, &Query::new("q"), None, "tok").await {
            Err(GatewayError::Transport {
                status, message, ..
            }) => {
                assert_eq!(status, Some(403));
                assert_eq!(message, "permission denied");
            }
            other => panic!("expected transport error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn create_session_returns_name() {
        let mock_server = MockServer::start().await;
        let client = BackendClient::with_client(
            Client::new(),
            BackendConfig {
                discovery_base_url: mock_server.uri(),
                ..config()
            },
        );

        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/proj/locations/global/collections/default_collection/engines/eng/sessions",
            ))
            .and(body_json(json!({"userPseudoId": "test-user"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "projects/proj/sessions/123"})),
            )
            .mount(&mock_server)
            .await;

        let name = client
            .create_session(&client.config().document_engine(), "tok")
            .await
            .unwrap();
        assert_eq!(name, "projects/proj/sessions/123");
    }
}
