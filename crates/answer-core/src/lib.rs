pub mod aggregate;
pub mod auth;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod gateway;
pub mod session;
pub mod types;

pub use aggregate::{
    project_answer, ReasoningAccumulator, StreamAnswerAccumulator, NO_ANSWER_FALLBACK,
    NO_STREAM_TEXT_FALLBACK,
};
pub use auth::{MetadataTokenProvider, StaticTokenProvider, TokenProvider};
pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::{GatewayError, Result};
pub use gateway::AnswerService;
pub use session::SessionManager;
pub use types::{
    AnswerEnvelope, AnswerMode, BackendKind, BackendTarget, DocumentEngine, Query, RawChunk,
};
