use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{json_body, require};
use crate::error::ApiError;
use crate::state::ServerState;
use crate::storage::{User, UserId};

/// Minimum password length accepted at registration
const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user account; never carries the password hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: String,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: &str) -> Json<Self> {
        Json(Self {
            msg: msg.to_string(),
        })
    }
}

/// Register endpoint
pub async fn register(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let request = json_body(payload)?;

    let full_name = require(request.full_name, "Please provide name")?;
    let email = require(request.email, "Please provide email")?;
    let password = request.password.unwrap_or_default();

    if !email.contains('@') {
        return Err(ApiError::BadRequest("Please provide a valid email".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let user = state
        .credentials
        .register(&full_name, &email, &password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            msg: "User Created Successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Login endpoint. Issues a token both in the body and as an HttpOnly cookie.
pub async fn login(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload)?;

    let (Some(email), Some(password)) = (
        request.email.filter(|e| !e.trim().is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    };

    let user = state.credentials.authenticate(&email, &password).await?;
    let token = state.auth_state.tokens.issue(user.id)?;

    info!("User {} logged in successfully", user.email);

    let cookie = state.auth_state.session_cookie(&token);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user: LoginUser {
                name: user.full_name,
            },
            token,
        }),
    )
        .into_response())
}

/// Logout endpoint. Tokens are stateless, so this only expires the cookie.
pub async fn logout(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.auth_state.cleared_cookie())],
        MessageResponse::new("Logged out successfully"),
    )
}
