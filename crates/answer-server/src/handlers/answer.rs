use actix_web::{web, HttpResponse};
use answer_core::{AnswerMode, Query};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

/// Inbound body shared by `/answer` and `/answer2`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnswerRequest {
    pub query: Option<String>,
    pub session: Option<String>,
    pub preamble: Option<String>,
    pub filter: Option<String>,
    pub reasoning_engine: Option<String>,
}

impl AnswerRequest {
    fn into_query(self) -> Query {
        Query {
            text: self.query.unwrap_or_default(),
            session_ref: self.session,
            preamble: self.preamble,
            filter: self.filter,
            backend_selector: self.reasoning_engine,
        }
    }
}

/// `POST /answer`: unary document answer, or the reasoning engine when
/// `reasoning_engine` is set.
pub async fn handler(
    state: web::Data<AppState>,
    req: web::Json<AnswerRequest>,
) -> Result<HttpResponse> {
    let query = req.into_inner().into_query();
    log::debug!(
        "Answer request (session: {:?}, reasoning engine: {:?})",
        query.session_ref,
        query.backend_selector
    );

    let envelope = state.answers.answer(&query, AnswerMode::Answer).await?;
    Ok(HttpResponse::Ok().json(envelope))
}

/// `POST /answer2`: streamed document answer. `filter` and `reasoning_engine`
/// are not forwarded.
pub async fn stream_handler(
    state: web::Data<AppState>,
    req: web::Json<AnswerRequest>,
) -> Result<HttpResponse> {
    let mut query = req.into_inner().into_query();
    query.filter = None;
    query.backend_selector = None;
    log::debug!("Stream answer request (session: {:?})", query.session_ref);

    let envelope = state.answers.answer(&query, AnswerMode::StreamAnswer).await?;
    Ok(HttpResponse::Ok().json(envelope))
}
