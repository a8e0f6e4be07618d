use actix_identity::error::{GetIdentityError, LoginError};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Identity error: {0}")]
    Identity(#[from] GetIdentityError),

    #[error("Session error: {0}")]
    Session(#[from] LoginError),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::Template(_)
            | AppError::Identity(_)
            | AppError::Session(_)
            | AppError::Password(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
