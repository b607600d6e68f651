mod auth;
mod blogs;
mod comments;
mod health;

pub use auth::*;
pub use blogs::*;
pub use comments::*;
pub use health::*;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use uuid::Uuid;

use crate::error::ApiError;

/// Unwrap a JSON body, turning extractor rejections into a 400 with the usual error shape
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Parse a path identifier. Malformed ids cannot name an existing resource.
fn parse_id(raw: &str, resource: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(resource))
}

/// Reject missing or whitespace-only required fields
fn require(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}
