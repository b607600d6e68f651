use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::{
    BlogStore, Comment, CommentStore, NewComment, StorageError, UserId, UserStore,
};

/// Comment as presented to API clients, with the commenter's name resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub user_name: String,
}

/// Comment CRUD. Only a comment's owner may change or delete it.
#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    blogs: Arc<dyn BlogStore>,
    users: Arc<dyn UserStore>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        blogs: Arc<dyn BlogStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            comments,
            blogs,
            users,
        }
    }

    /// List the comments on a blog
    pub async fn list_for_blog(&self, blog_id: Uuid) -> Result<Vec<CommentView>, ApiError> {
        self.blogs.get_blog(blog_id).await?;

        let comments = self.comments.list_blog_comments(blog_id).await?;
        let mut views = Vec::with_capacity(comments.len());
        for comment in &comments {
            views.push(self.view(comment).await?);
        }
        Ok(views)
    }

    /// Leave a comment on a blog as the caller
    pub async fn create(
        &self,
        actor: UserId,
        blog_id: Uuid,
        content: String,
    ) -> Result<Comment, ApiError> {
        self.blogs.get_blog(blog_id).await?;

        // A valid token can still name a user that no longer exists
        self.users.get_user(actor).await?;

        let comment = self
            .comments
            .create_comment(NewComment {
                content,
                user_id: actor,
                blog_id,
            })
            .await?;

        Ok(comment)
    }

    /// Fetch a single comment on a blog
    pub async fn get(&self, blog_id: Uuid, comment_id: Uuid) -> Result<CommentView, ApiError> {
        let comment = self.find_in_blog(blog_id, comment_id).await?;
        self.view(&comment).await
    }

    /// Replace the content of the caller's own comment
    pub async fn update(
        &self,
        actor: UserId,
        blog_id: Uuid,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Comment, ApiError> {
        let comment = self.find_in_blog(blog_id, comment_id).await?;
        ensure_owner(&comment, actor, "update")?;

        Ok(self.comments.update_comment(comment_id, content).await?)
    }

    /// Delete the caller's own comment
    pub async fn delete(
        &self,
        actor: UserId,
        blog_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), ApiError> {
        let comment = self.find_in_blog(blog_id, comment_id).await?;
        ensure_owner(&comment, actor, "delete")?;

        Ok(self.comments.delete_comment(comment_id).await?)
    }

    /// A comment addressed under a blog it does not belong to is treated as missing
    async fn find_in_blog(&self, blog_id: Uuid, comment_id: Uuid) -> Result<Comment, ApiError> {
        let comment = self.comments.get_comment(comment_id).await?;
        if comment.blog_id != blog_id {
            return Err(ApiError::NotFound("Comment"));
        }
        Ok(comment)
    }

    async fn view(&self, comment: &Comment) -> Result<CommentView, ApiError> {
        let user_name = match self.users.get_user(comment.user_id).await {
            Ok(user) => user.full_name,
            Err(StorageError::UserNotFound(_)) => "Unknown User".to_string(),
            Err(e) => return Err(e.into()),
        };

        Ok(CommentView {
            id: comment.id,
            content: comment.content.clone(),
            user_name,
        })
    }
}

fn ensure_owner(comment: &Comment, actor: UserId, action: &str) -> Result<(), ApiError> {
    if comment.user_id != actor {
        warn!("User {} denied {} of comment {}", actor, action, comment.id);
        return Err(ApiError::Forbidden(format!(
            "You are not authorized to {} this comment",
            action
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CreateUser, MemoryStore, NewBlog, User};

    struct Fixture {
        store: Arc<MemoryStore>,
        service: CommentService,
        author: User,
        reader: User,
        blog_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = CommentService::new(store.clone(), store.clone(), store.clone());

        let mut users = Vec::new();
        for (name, email) in [("Author", "author@x.com"), ("Reader", "reader@x.com")] {
            users.push(
                store
                    .create_user(CreateUser {
                        full_name: name.to_string(),
                        email: email.to_string(),
                        password_hash: "hash".to_string(),
                    })
                    .await
                    .unwrap(),
            );
        }
        let reader = users.pop().unwrap();
        let author = users.pop().unwrap();

        let blog = store
            .create_blog(NewBlog {
                title: "Title".to_string(),
                content: "Content".to_string(),
                author_id: author.id,
                co_authors: Vec::new(),
            })
            .await
            .unwrap();

        Fixture {
            store,
            service,
            author,
            reader,
            blog_id: blog.id,
        }
    }

    #[tokio::test]
    async fn test_owner_can_update_content_only() {
        let f = fixture().await;
        let comment = f
            .service
            .create(f.reader.id, f.blog_id, "First!".to_string())
            .await
            .unwrap();

        let updated = f
            .service
            .update(f.reader.id, f.blog_id, comment.id, "Edited")
            .await
            .unwrap();

        assert_eq!(updated.content, "Edited");
        assert_eq!(updated.id, comment.id);
        assert_eq!(updated.user_id, comment.user_id);
        assert_eq!(updated.blog_id, comment.blog_id);
        assert_eq!(updated.created_at, comment.created_at);
    }

    #[tokio::test]
    async fn test_non_owner_update_forbidden() {
        let f = fixture().await;
        let comment = f
            .service
            .create(f.reader.id, f.blog_id, "First!".to_string())
            .await
            .unwrap();

        let result = f
            .service
            .update(f.author.id, f.blog_id, comment.id, "Hijacked")
            .await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        let stored = f.service.get(f.blog_id, comment.id).await.unwrap();
        assert_eq!(stored.content, "First!");
    }

    #[tokio::test]
    async fn test_non_owner_delete_forbidden() {
        let f = fixture().await;
        let comment = f
            .service
            .create(f.reader.id, f.blog_id, "First!".to_string())
            .await
            .unwrap();

        let result = f.service.delete(f.author.id, f.blog_id, comment.id).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert_eq!(f.store.comment_count(), 1);

        f.service.delete(f.reader.id, f.blog_id, comment.id).await.unwrap();
        assert_eq!(f.store.comment_count(), 0);
    }

    #[tokio::test]
    async fn test_comment_on_missing_blog() {
        let f = fixture().await;

        let result = f
            .service
            .create(f.reader.id, Uuid::new_v4(), "Hello?".to_string())
            .await;

        assert!(matches!(result, Err(ApiError::NotFound("Blog"))));
        assert_eq!(f.store.comment_count(), 0);
    }

    #[tokio::test]
    async fn test_comment_by_missing_user() {
        let f = fixture().await;

        let result = f
            .service
            .create(Uuid::new_v4(), f.blog_id, "ghost".to_string())
            .await;

        assert!(matches!(result, Err(ApiError::NotFound("User"))));
        assert_eq!(f.store.comment_count(), 0);
    }

    #[tokio::test]
    async fn test_comment_under_wrong_blog_is_not_found() {
        let f = fixture().await;
        let comment = f
            .service
            .create(f.reader.id, f.blog_id, "First!".to_string())
            .await
            .unwrap();

        let result = f.service.get(Uuid::new_v4(), comment.id).await;

        assert!(matches!(result, Err(ApiError::NotFound("Comment"))));
    }

    #[tokio::test]
    async fn test_list_resolves_user_names() {
        let f = fixture().await;
        f.service
            .create(f.reader.id, f.blog_id, "First!".to_string())
            .await
            .unwrap();
        f.service
            .create(f.author.id, f.blog_id, "Thanks".to_string())
            .await
            .unwrap();

        let comments = f.service.list_for_blog(f.blog_id).await.unwrap();

        assert_eq!(comments.len(), 2);
        assert!(comments.iter().any(|c| c.user_name == "Reader" && c.content == "First!"));
        assert!(comments.iter().any(|c| c.user_name == "Author" && c.content == "Thanks"));
    }
}
