use thiserror::Error;
use actix_web::{ResponseError, HttpResponse, http::StatusCode};
use serde_json::json;

use crate::store::models::RoleName;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Notification error: {0}")]
    NotifierError(#[from] NotifierError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreError(err.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

// Client-facing responses carry only a status and a human-readable message.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.to_string();
        let response = json!({
            "error": {
                "status": status.as_u16(),
                "message": message
            }
        });
        HttpResponse::build(status).json(response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(e) => match e {
                AuthError::DuplicateUsername => StatusCode::BAD_REQUEST,
                AuthError::DuplicateEmail => StatusCode::BAD_REQUEST,
                AuthError::BadCredentials => StatusCode::UNAUTHORIZED,
                AuthError::TokenNotFound => StatusCode::UNAUTHORIZED,
                AuthError::NotVerified => StatusCode::FORBIDDEN,
                AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
                // Missing catalog entries are a deployment fault, not a client error.
                AuthError::RoleNotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::NotifierError(_) => StatusCode::BAD_GATEWAY,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StoreError(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::StoreError(StoreError::Duplicate) => StatusCode::BAD_REQUEST,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Email is already in use")]
    DuplicateEmail,

    #[error("Role {} is not configured", .0.as_str())]
    RoleNotConfigured(RoleName),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Please click on the verification link to login")]
    NotVerified,

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Verification token is not in the database")]
    TokenNotFound,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("delivery request failed: {0}")]
    Request(String),

    #[error("delivery rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::QueryError(err.to_string()),
        }
    }
}
