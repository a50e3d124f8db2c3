//! Folding decoded chunks into an [`AnswerEnvelope`].
//!
//! Merge rules differ per backend:
//! - reasoning engine: every `content.parts[].text` is appended in order
//! - unary document answer: direct projection of the single `answer` object
//! - streamed document answer: last non-empty text wins, the last chunk
//!   carrying `citations`/`references`/`relatedQuestions` wins, last session wins

use serde_json::Value;

use crate::decode::ConcatenatedChunks;
use crate::types::{AnswerEnvelope, RawChunk};

pub const NO_ANSWER_FALLBACK: &str = "No answer found.";
pub const NO_STREAM_TEXT_FALLBACK: &str = "No text returned from stream.";

fn text_or(text: String, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn sequence(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Session name from a `session` value: the `name` of an object, or the string itself.
fn session_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::Object(session) => session.get("name").and_then(Value::as_str),
        Value::String(name) => Some(name.as_str()),
        _ => None,
    };
    name.filter(|name| !name.is_empty()).map(str::to_string)
}

/// Resolve the session of a unary answer: `session`, then `sessionInfo.name`.
pub fn resolve_session(response: &RawChunk) -> Option<String> {
    response
        .get("session")
        .and_then(session_name)
        .or_else(|| {
            response
                .get("sessionInfo")
                .and_then(|info| info.get("name"))
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
}

/// Project a unary document answer response.
pub fn project_answer(response: &RawChunk) -> AnswerEnvelope {
    let answer = response.get("answer");
    let field = |key: &str| answer.and_then(|answer| answer.get(key));

    let text = field("answerText")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    AnswerEnvelope {
        answer_text: text_or(text, NO_ANSWER_FALLBACK),
        citations: sequence(field("citations")),
        references: sequence(field("references")),
        session_ref: resolve_session(response),
        related_questions: sequence(field("relatedQuestions")),
    }
}

/// Concatenates the text parts of reasoning engine chunks.
#[derive(Debug, Default)]
pub struct ReasoningAccumulator {
    text: String,
}

impl ReasoningAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &RawChunk) {
        let Some(parts) = chunk
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
        else {
            return;
        };

        for text in parts.iter().filter_map(|part| part.get("text")?.as_str()) {
            self.text.push_str(text);
        }
    }

    /// The reasoning engine never reports a session; echo the one sent.
    pub fn finish(self, session_ref: Option<String>) -> AnswerEnvelope {
        AnswerEnvelope {
            answer_text: text_or(self.text, NO_STREAM_TEXT_FALLBACK),
            citations: Vec::new(),
            references: Vec::new(),
            session_ref,
            related_questions: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct StreamAnswerAccumulator {
    text: String,
    citations: Option<Vec<Value>>,
    references: Option<Vec<Value>>,
    related_questions: Option<Vec<Value>>,
    session: Option<Value>,
}

impl StreamAnswerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &RawChunk) {
        if let Some(answer) = chunk.get("answer") {
            if let Some(text) = answer
                .get("answerText")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
            {
                self.text = text.to_string();
            }
            if let Some(citations) = answer.get("citations") {
                self.citations = Some(sequence(Some(citations)));
            }
            if let Some(references) = answer.get("references") {
                self.references = Some(sequence(Some(references)));
            }
            if let Some(related) = answer.get("relatedQuestions") {
                self.related_questions = Some(sequence(Some(related)));
            }
        }

        if let Some(session) = chunk.get("session") {
            self.session = Some(session.clone());
        }
    }

    /// Falls back to `request_session` when no chunk named a session.
    pub fn finish(self, request_session: Option<String>) -> AnswerEnvelope {
        AnswerEnvelope {
            answer_text: text_or(self.text, NO_ANSWER_FALLBACK),
            citations: self.citations.unwrap_or_default(),
            references: self.references.unwrap_or_default(),
            session_ref: self
                .session
                .as_ref()
                .and_then(session_name)
                .or(request_session),
            related_questions: self.related_questions.unwrap_or_default(),
        }
    }
}

/// Decode and fold a complete stream-answer body.
pub fn fold_stream_answer_body(body: &[u8], request_session: Option<String>) -> AnswerEnvelope {
    let mut accumulator = StreamAnswerAccumulator::new();
    for chunk in ConcatenatedChunks::new(body) {
        accumulator.push(&chunk);
    }
    accumulator.finish(request_session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::line_chunks;
    use bytes::Bytes;
    use futures::stream;
    use futures_util::StreamExt;
    use serde_json::json;

    async fn fold_reasoning(body: &'static [u8], session_ref: Option<String>) -> AnswerEnvelope {
        let parts: Vec<Result<Bytes, String>> = vec![Ok(Bytes::from_static(body))];
        let mut chunks = line_chunks(stream::iter(parts));
        let mut accumulator = ReasoningAccumulator::new();
        while let Some(chunk) = chunks.next().await {
            accumulator.push(&chunk);
        }
        accumulator.finish(session_ref)
    }

    #[tokio::test]
    async fn reasoning_text_is_concatenated_in_order() {
        let body = concat!(
            "data: {\"content\":{\"parts\":[{\"text\":\"A\"}]}}\n",
            "\n",
            "{\"unrelated\":1}\n",
            "data: {\"content\":{\"parts\":[{\"text\":\"B\"}]}}",
        );
        let envelope = fold_reasoning(body.as_bytes(), Some("sess".to_string())).await;
        assert_eq!(envelope.answer_text, "AB");
        assert_eq!(envelope.session_ref.as_deref(), Some("sess"));
        assert!(envelope.citations.is_empty());
        assert!(envelope.references.is_empty());
        assert!(envelope.related_questions.is_empty());
    }

    #[test]
    fn reasoning_parts_without_text_are_skipped() {
        let mut acc = ReasoningAccumulator::new();
        acc.push(&json!({"content": {"parts": [
            {"text": "one "},
            {"function_call": {"name": "lookup"}},
            {"text": "two"}
        ]}}));
        acc.push(&json!({"content": "not an object"}));
        acc.push(&json!([1, 2, 3]));
        assert_eq!(acc.finish(None).answer_text, "one two");
    }

    #[tokio::test]
    async fn reasoning_without_text_uses_stream_fallback() {
        let envelope = fold_reasoning(b": ping\n\n", Some(String::new())).await;
        assert_eq!(envelope.answer_text, NO_STREAM_TEXT_FALLBACK);
        assert_eq!(envelope.session_ref.as_deref(), Some(""));
    }

    #[test]
    fn stream_answer_merge_rules() {
        let body = r#"{"answer":{"answerText":"x"}}{"session":"s1"}{"answer":{"answerText":"y","citations":[1]}}"#;
        let envelope = fold_stream_answer_body(body.as_bytes(), None);
        assert_eq!(envelope.answer_text, "y");
        assert_eq!(envelope.citations, vec![json!(1)]);
        assert_eq!(envelope.session_ref.as_deref(), Some("s1"));
    }

    #[test]
    fn stream_answer_empty_text_does_not_erase() {
        let body = r#"{"answer":{"answerText":"kept","references":[{"id":"r1"}]}}
                      {"answer":{"answerText":"","references":[]}}"#;
        let envelope = fold_stream_answer_body(body.as_bytes(), None);
        assert_eq!(envelope.answer_text, "kept");
        // the key reappeared, so the later (empty) sequence replaces the earlier one
        assert!(envelope.references.is_empty());
    }

    #[test]
    fn stream_answer_keys_absent_later_are_kept() {
        let body = r#"{"answer":{"citations":[{"a":1}],"relatedQuestions":["q?"]}}{"answer":{"answerText":"t"}}"#;
        let envelope = fold_stream_answer_body(body.as_bytes(), None);
        assert_eq!(envelope.citations, vec![json!({"a": 1})]);
        assert_eq!(envelope.related_questions, vec![json!("q?")]);
    }

    #[test]
    fn stream_answer_session_object_and_request_fallback() {
        let body = r#"[{"session":{"name":"projects/p/sessions/1"}},{"session":{"name":"projects/p/sessions/2"}}]"#;
        let envelope = fold_stream_answer_body(body.as_bytes(), Some("req".to_string()));
        assert_eq!(envelope.session_ref.as_deref(), Some("projects/p/sessions/2"));

        let body = br#"{"answer":{"answerText":"t"}}"#;
        let envelope = fold_stream_answer_body(body, Some("req".to_string()));
        assert_eq!(envelope.session_ref.as_deref(), Some("req"));

        let envelope = fold_stream_answer_body(br#"{"session":null}"#, Some("req".to_string()));
        assert_eq!(envelope.session_ref.as_deref(), Some("req"));
    }

    #[test]
    fn stream_answer_keeps_prefix_before_corruption() {
        let body = r#"{"answer":{"answerText":"partial"}}{"session":"s9"}{"answer":{"answerTe"#;
        let envelope = fold_stream_answer_body(body.as_bytes(), None);
        assert_eq!(envelope.answer_text, "partial");
        assert_eq!(envelope.session_ref.as_deref(), Some("s9"));
    }

    #[test]
    fn stream_answer_without_text_uses_answer_fallback() {
        let envelope = fold_stream_answer_body(b"", None);
        assert_eq!(envelope.answer_text, NO_ANSWER_FALLBACK);
        assert_eq!(envelope.session_ref, None);
    }

    #[test]
    fn folding_is_deterministic() {
        let body =
            br#"{"answer":{"answerText":"a","citations":[{"x":1}]}}{"session":{"name":"s"}}"#;
        assert_eq!(
            fold_stream_answer_body(body, None),
            fold_stream_answer_body(body, None)
        );
    }

    #[test]
    fn unary_empty_text_falls_back() {
        let envelope = project_answer(&json!({"answer": {"answerText": "", "citations": []}}));
        assert_eq!(envelope.answer_text, NO_ANSWER_FALLBACK);
        assert!(envelope.citations.is_empty());
        assert_eq!(envelope.session_ref, None);
    }

    #[test]
    fn unary_projection_copies_sequences() {
        let envelope = project_answer(&json!({
            "answer": {
                "answerText": "Rust is a language.",
                "citations": [{"startIndex": "0"}],
                "references": [{"chunkInfo": {}}],
                "relatedQuestions": ["What is Cargo?"]
            },
            "session": {"name": "projects/p/sessions/42"}
        }));
        assert_eq!(envelope.answer_text, "Rust is a language.");
        assert_eq!(envelope.citations.len(), 1);
        assert_eq!(envelope.references.len(), 1);
        assert_eq!(envelope.related_questions, vec![json!("What is Cargo?")]);
        assert_eq!(envelope.session_ref.as_deref(), Some("projects/p/sessions/42"));
    }

    #[test]
    fn unary_session_resolution_order() {
        assert_eq!(
            resolve_session(&json!({"session": "plain", "sessionInfo": {"name": "info"}})),
            Some("plain".to_string())
        );
        assert_eq!(
            resolve_session(&json!({
                "session": {"state": "IN_PROGRESS"},
                "sessionInfo": {"name": "info"}
            })),
            Some("info".to_string())
        );
        assert_eq!(resolve_session(&json!({"sessionInfo": {}})), None);
        assert_eq!(resolve_session(&json!({})), None);
    }
}
