use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use cookie::{time::Duration, Cookie, SameSite};
use std::sync::Arc;
use tracing::debug;

use crate::auth::token::{TokenConfig, TokenService};
use crate::error::ApiError;
use crate::storage::UserId;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

/// Authentication state shared with middleware
#[derive(Clone)]
pub struct AuthState {
    pub tokens: TokenService,
    pub cookie_secure: bool,
}

impl AuthState {
    pub fn new(token_config: &TokenConfig, cookie_secure: bool) -> Self {
        Self {
            tokens: TokenService::new(token_config),
            cookie_secure,
        }
    }

    /// Build the `Set-Cookie` value delivering a freshly issued token
    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = i64::try_from(self.tokens.lifetime_seconds()).unwrap_or(i64::MAX);
        self.cookie(token, Duration::seconds(max_age))
    }

    /// Build the `Set-Cookie` value that clears the session cookie
    pub fn cleared_cookie(&self) -> String {
        self.cookie("", Duration::ZERO)
    }

    fn cookie(&self, value: &str, max_age: Duration) -> String {
        Cookie::build((SESSION_COOKIE, value.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.cookie_secure)
            .max_age(max_age)
            .build()
            .to_string()
    }
}

/// Identity of the caller, attached to the request by `auth_middleware`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Authentication middleware for protected routes.
///
/// Reads the session cookie, falling back to a bearer token, and rejects the
/// request with 401 unless the token verifies.
pub async fn auth_middleware(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| bearer_token(&request));

    let Some(token) = token else {
        debug!("Rejected request to {} without session token", request.uri().path());
        return ApiError::Unauthorized.into_response();
    };

    match state.tokens.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.user_id(),
            });
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Extract a token from an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_state(cookie_secure: bool) -> AuthState {
        AuthState::new(
            &TokenConfig {
                secret: "test-secret-0123456789".to_string(),
                lifetime_seconds: 900,
            },
            cookie_secure,
        )
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = auth_state(false).session_cookie("abc");

        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=900"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_secure_cookie() {
        let state = auth_state(true);

        assert!(state.session_cookie("abc").contains("; Secure"));

        let cleared = state.cleared_cookie();
        assert!(cleared.starts_with("token=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert!(cleared.contains("Path=/"));
        assert!(cleared.contains("; Secure"));
    }
}
