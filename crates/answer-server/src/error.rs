use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use answer_core::GatewayError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Unauthorized")]
    Unauthorized,
}

#[derive(Serialize)]
struct JsonError {
    error: String,
}

impl AppError {
    fn message(&self) -> String {
        match self {
            // Credential details stay in the log.
            AppError::Gateway(GatewayError::Auth(_)) => "Failed to authenticate".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Gateway(GatewayError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonError {
            error: self.message(),
        })
    }
}
