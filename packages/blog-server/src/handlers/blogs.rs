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
use crate::services::{BlogChanges, BlogDraft, BlogView};
use crate::state::ServerState;

/// Create blog request
#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Co-author emails; unknown addresses are ignored
    #[serde(default)]
    pub co_authors: Vec<String>,
}

/// Update blog request
#[derive(Debug, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub co_authors: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct BlogListResponse {
    pub blogs: Vec<BlogView>,
}

#[derive(Debug, Serialize)]
pub struct BlogResponse {
    pub blog: BlogView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedBlogResponse {
    pub updated_blog: BlogView,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub msg: String,
    pub likes: usize,
}

/// List the caller's blogs
pub async fn list_blogs(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<BlogListResponse>, ApiError> {
    let blogs = state.blogs.list_for_author(auth.user_id).await?;
    Ok(Json(BlogListResponse { blogs }))
}

/// Create a blog authored by the caller
pub async fn create_blog(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<CreateBlogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogResponse>), ApiError> {
    let request = json_body(payload)?;

    let draft = BlogDraft {
        title: require(request.title, "Please provide title")?,
        content: require(request.content, "Please provide content")?,
        co_author_emails: request.co_authors,
    };

    let blog = state.blogs.create(auth.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(BlogResponse { blog })))
}

/// Fetch a blog and count the view
pub async fn get_blog(
    State(state): State<Arc<ServerState>>,
    Path(blog_id): Path<String>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;

    let blog = state.blogs.get(blog_id).await?;
    Ok(Json(BlogResponse { blog }))
}

/// Update title, content and co-authors of a blog
pub async fn update_blog(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
    Path(blog_id): Path<String>,
    payload: Result<Json<UpdateBlogRequest>, JsonRejection>,
) -> Result<Json<UpdatedBlogResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;
    let request = json_body(payload)?;

    let changes = BlogChanges {
        title: request.title,
        content: request.content,
        co_author_emails: request.co_authors,
    };

    let updated_blog = state.blogs.update(auth.user_id, blog_id, changes).await?;
    Ok(Json(UpdatedBlogResponse { updated_blog }))
}

/// Delete a blog
pub async fn delete_blog(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
    Path(blog_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;

    state.blogs.delete(auth.user_id, blog_id).await?;
    Ok(MessageResponse::new("Blog deleted successfully"))
}

/// Toggle the caller's like on a blog
pub async fn like_blog(
    State(state): State<Arc<ServerState>>,
    Extension(auth): Extension<AuthUser>,
    Path(blog_id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let blog_id = parse_id(&blog_id, "Blog")?;

    let outcome = state.blogs.toggle_like(auth.user_id, blog_id).await?;
    let msg = if outcome.liked {
        "Blog liked successfully"
    } else {
        "Blog like removed successfully"
    };

    Ok(Json(LikeResponse {
        msg: msg.to_string(),
        likes: outcome.likes,
    }))
}
