use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::types::{Blog, Comment, NewBlog, NewComment, UserId};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Blog not found: {0}")]
    BlogNotFound(Uuid),

    #[error("Comment not found: {0}")]
    CommentNotFound(Uuid),

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage backend for blogs
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Create a new blog with zero views and no likes
    async fn create_blog(&self, blog: NewBlog) -> StorageResult<Blog>;

    /// Get blog by ID
    async fn get_blog(&self, id: Uuid) -> StorageResult<Blog>;

    /// List blogs written by an author, oldest first
    async fn list_author_blogs(&self, author_id: UserId) -> StorageResult<Vec<Blog>>;

    /// Replace the mutable fields of an existing blog.
    /// The author is never changed.
    async fn update_blog(&self, blog: &Blog) -> StorageResult<()>;

    /// Delete a blog
    async fn delete_blog(&self, id: Uuid) -> StorageResult<()>;
}

/// Storage backend for comments
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Create a new comment
    async fn create_comment(&self, comment: NewComment) -> StorageResult<Comment>;

    /// Get comment by ID
    async fn get_comment(&self, id: Uuid) -> StorageResult<Comment>;

    /// List comments on a blog, oldest first
    async fn list_blog_comments(&self, blog_id: Uuid) -> StorageResult<Vec<Comment>>;

    /// Replace a comment's content and return the updated comment
    async fn update_comment(&self, id: Uuid, content: &str) -> StorageResult<Comment>;

    /// Delete a comment
    async fn delete_comment(&self, id: Uuid) -> StorageResult<()>;

    /// Delete every comment on a blog, returning how many were removed
    async fn delete_blog_comments(&self, blog_id: Uuid) -> StorageResult<u64>;
}
