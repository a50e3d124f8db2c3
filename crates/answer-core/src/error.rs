use thiserror::Error;

use crate::types::BackendKind;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to authenticate: {0}")]
    Auth(String),

    /// Connection failure or a non-2xx status before any body was decoded.
    #[error("{}: {}", .backend.failure_prefix(), .message)]
    Transport {
        backend: BackendKind,
        status: Option<u16>,
        message: String,
    },

    #[error("{}: {}", .backend.failure_prefix(), .message)]
    Decode { backend: BackendKind, message: String },

    #[error("Session creation failed: {0}")]
    Session(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn transport(backend: BackendKind, err: reqwest::Error) -> Self {
        GatewayError::Transport {
            backend,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
