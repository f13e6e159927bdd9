//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` shared by the repositories,
//! the token service and the request handlers. Each variant maps to exactly one
//! HTTP status code; the response body is the plain-text rendering of the error.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers simply
//! return `Result<_, AppError>`. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and
//! `bcrypt::BcryptError` make the `?` operator do the mapping.

use actix_web::{error::ResponseError, http::header::ContentType, http::StatusCode, HttpResponse};
use thiserror::Error;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more request fields are missing or have the wrong shape (HTTP 400).
    #[error("Validation Error: {0}")]
    Validation(String),
    /// The request itself is malformed: empty body, broken JSON, bad id (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Missing, invalid or expired identity token, or bad credentials (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// No row matches the requested id for the calling owner (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// The route exists but not for this HTTP method (HTTP 405).
    #[error("Method Not Allowed: {0}")]
    MethodNotAllowed(String),
    /// A unique constraint would be violated, e.g. duplicate email (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The relational store failed (HTTP 500).
    #[error("Database Error: {0}")]
    Persistence(String),
    /// A response body could not be encoded (HTTP 500).
    #[error("Serialization Error: {0}")]
    Serialization(String),
    /// Password hashing failed (HTTP 500).
    #[error("Hashing Error: {0}")]
    Hashing(String),
    /// The signing key is absent or a token could not be signed (HTTP 500).
    #[error("Signing Error: {0}")]
    Signing(String),
    /// Any other server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Persistence(_)
            | AppError::Serialization(_)
            | AppError::Hashing(_)
            | AppError::Signing(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status)
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }
}

/// `RowNotFound` becomes `NotFound`, a unique-constraint violation becomes
/// `Conflict`, everything else is a `Persistence` failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                AppError::Conflict(db_error.message().to_string())
            }
            _ => AppError::Persistence(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Hashing(error.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::Internal(format!("blocking task failed: {}", error))
    }
}
