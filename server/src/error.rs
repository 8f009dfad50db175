use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Mutation target absent or not owned by the caller. Deliberately a
    // single signal so non-owners cannot probe for existence.
    #[error("Agent not found")]
    NotFoundOrForbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) | AppError::NotFoundOrForbidden => {
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "not_found".to_string(),
                    message: self.to_string(),
                })
            }
            AppError::InvalidInput(_) => HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_input".to_string(),
                message: self.to_string(),
            }),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(ErrorResponse {
                error: "unauthorized".to_string(),
                message: self.to_string(),
            }),
            AppError::Database(_) | AppError::Config(_) | AppError::Io(_) | AppError::Internal(_) => {
                // Store and infrastructure failures are logged in full but
                // surfaced generically; no storage details leave the process.
                tracing::error!("Internal failure: {}", self);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "internal_error".to_string(),
                    message: "An unexpected internal error occurred".to_string(),
                })
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
