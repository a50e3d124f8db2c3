use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BackendConfig;
use crate::error::{GatewayError, Result};

/// One backend-native JSON unit decoded from a response body.
pub type RawChunk = Value;

/// A natural-language question plus the optional knobs a caller may set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub text: String,
    pub session_ref: Option<String>,
    pub preamble: Option<String>,
    pub filter: Option<String>,
    pub backend_selector: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session_ref = Some(session.into());
        self
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_backend_selector(mut self, selector: impl Into<String>) -> Self {
        self.backend_selector = Some(selector.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(GatewayError::Validation("Query is required".to_string()));
        }
        Ok(())
    }

    pub(crate) fn preamble(&self) -> Option<&str> {
        non_empty(self.preamble.as_deref())
    }

    pub(crate) fn filter(&self) -> Option<&str> {
        non_empty(self.filter.as_deref())
    }

    pub(crate) fn session(&self) -> Option<&str> {
        non_empty(self.session_ref.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Which inbound operation the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    /// Unary answer, or the reasoning engine when a selector is present.
    Answer,
    /// Streamed document answer; the backend selector is ignored.
    StreamAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    ReasoningEngine,
    DocumentAnswer,
    DocumentStreamAnswer,
}

impl BackendKind {
    pub fn failure_prefix(self) -> &'static str {
        match self {
            BackendKind::ReasoningEngine => "Reasoning Engine Request failed",
            BackendKind::DocumentAnswer => "API request failed",
            BackendKind::DocumentStreamAnswer => "StreamAnswer request failed",
        }
    }
}

/// Identifiers of a document answer engine serving config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEngine {
    pub project_id: String,
    pub location: String,
    pub collection_id: String,
    pub engine_id: String,
    pub serving_config_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTarget {
    ReasoningEngine {
        project_id: String,
        location: String,
        engine_id: String,
    },
    DocumentAnswer(DocumentEngine),
    DocumentStreamAnswer(DocumentEngine),
}

impl BackendTarget {
    pub fn select(config: &BackendConfig, query: &Query, mode: AnswerMode) -> Self {
        let selector = non_empty(query.backend_selector.as_deref());
        match (mode, selector) {
            (AnswerMode::Answer, Some(engine_id)) => BackendTarget::ReasoningEngine {
                project_id: config.project_id.clone(),
                location: config.reasoning_engine_location.clone(),
                engine_id: engine_id.to_string(),
            },
            (AnswerMode::Answer, None) => BackendTarget::DocumentAnswer(config.document_engine()),
            (AnswerMode::StreamAnswer, _) => {
                BackendTarget::DocumentStreamAnswer(config.document_engine())
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            BackendTarget::ReasoningEngine { .. } => BackendKind::ReasoningEngine,
            BackendTarget::DocumentAnswer(_) => BackendKind::DocumentAnswer,
            BackendTarget::DocumentStreamAnswer(_) => BackendKind::DocumentStreamAnswer,
        }
    }

    pub fn document_engine(&self) -> Option<&DocumentEngine> {
        match self {
            BackendTarget::ReasoningEngine { .. } => None,
            BackendTarget::DocumentAnswer(engine) | BackendTarget::DocumentStreamAnswer(engine) => {
                Some(engine)
            }
        }
    }
}

/// The normalized answer returned to callers, whatever backend produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    #[serde(rename = "answer")]
    pub answer_text: String,
    pub citations: Vec<Value>,
    pub references: Vec<Value>,
    #[serde(rename = "session")]
    pub session_ref: Option<String>,
    pub related_questions: Vec<Value>,
}
