use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers::{
    create_blog, create_comment, delete_blog, delete_comment, get_blog, get_comment,
    health_check, like_blog, list_blogs, list_comments, login, logout, register, update_blog,
    update_comment,
};
use crate::state::ServerState;

/// Limit request body size for all API requests
const MAX_API_BODY_SIZE: usize = 1024 * 1024;

/// Build the application router with all routes and layers
pub fn build_router(state: Arc<ServerState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/blogs/{blog_id}/comments", get(list_comments))
        .route("/blogs/{blog_id}/comments/{comment_id}", get(get_comment));

    let protected_routes = Router::new()
        .route("/blogs", get(list_blogs).post(create_blog))
        .route(
            "/blogs/{blog_id}",
            get(get_blog).patch(update_blog).delete(delete_blog),
        )
        .route("/blogs/{blog_id}/like", patch(like_blog))
        .route("/blogs/{blog_id}/comments", post(create_comment))
        .route(
            "/blogs/{blog_id}/comments/{comment_id}",
            patch(update_comment).delete(delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth_state.clone(),
            auth_middleware,
        ));

    let api = Router::new().merge(public_routes).merge(protected_routes);

    let cors_origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(RequestBodyLimitLayer::new(MAX_API_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
