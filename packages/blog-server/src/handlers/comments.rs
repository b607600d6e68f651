use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{json_body, parse_id, require, MessageResponse};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::CommentView;
use crate::state::ServerState;
use crate::storage::Comment;

/// Create or update comment request
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CommentViewResponse {
    pub comment: CommentView,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

/// List the comments on a blog
pub async fn list_comments(
    State(state): State<Arc<ServerState>>,
    Path(blog_id): Path<String>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;

    let comments = state.comments.list_for_blog(blog_id).await?;
    Ok(Json(CommentListResponse { comments }))
}

/// Comment on a blog as the caller
pub async fn create_comment(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
    Path(blog_id): Path<String>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;
    let content = require(json_body(payload)?.content, "Please provide content")?;

    let comment = state.comments.create(auth.user_id, blog_id, content).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

/// Fetch a single comment
pub async fn get_comment(
    State(state): State<Arc<ServerState>>,
    Path((blog_id, comment_id)): Path<(String, String)>,
) -> Result<Json<CommentViewResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;
    let comment_id = parse_id(&comment_id, "Comment")?;

    let comment = state.comments.get(blog_id, comment_id).await?;
    Ok(Json(CommentViewResponse { comment }))
}

/// Edit the caller's own comment
pub async fn update_comment(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
    Path((blog_id, comment_id)): Path<(String, String)>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;
    let comment_id = parse_id(&comment_id, "Comment")?;
    let content = require(json_body(payload)?.content, "Please provide content")?;

    let comment = state
        .comments
        .update(auth.user_id, blog_id, comment_id, &content)
        .await?;
    Ok(Json(CommentResponse { comment }))
}

/// Delete the caller's own comment
pub async fn delete_comment(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
    Path((blog_id, comment_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;
    let comment_id = parse_id(&comment_id, "Comment")?;

    state
        .comments
        .delete(auth.user_id, blog_id, comment_id)
        .await?;
    Ok(MessageResponse::new("Comment deleted successfully"))
}
