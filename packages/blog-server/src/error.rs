use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::auth::{PasswordError, TokenError};
use crate::storage::StorageError;

/// Errors surfaced to API clients.
///
/// Every variant renders as a JSON body with a string `msg`. Internal
/// failures are logged where they are converted and never leak detail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("User already exists")]
    DuplicateEmail,

    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub msg: String,
    pub code: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::DuplicateEmail => "DUPLICATE_EMAIL",
            ApiError::InvalidCredentials => "AUTH_FAILED",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BadRequest(_) => "INVALID_INPUT",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                msg: self.to_string(),
                code: self.code().to_string(),
            }),
        )
            .into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateEmail(_) => ApiError::DuplicateEmail,
            StorageError::UserNotFound(_) => ApiError::NotFound("User"),
            StorageError::BlogNotFound(_) => ApiError::NotFound("Blog"),
            StorageError::CommentNotFound(_) => ApiError::NotFound("Comment"),
            err @ (StorageError::Database(_) | StorageError::Internal(_)) => {
                error!("Storage failure: {}", err);
                ApiError::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => {
                debug!("Rejected session token: {}", err);
                ApiError::Unauthorized
            }
            TokenError::Encoding(_) => {
                error!("Token signing failed: {}", err);
                ApiError::Internal
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        error!("Password hashing failed: {}", err);
        ApiError::Internal
    }
}
