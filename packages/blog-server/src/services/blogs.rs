use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::normalize_email;
use crate::config::BlogEditPolicy;
use crate::error::ApiError;
use crate::storage::{Blog, BlogStore, CommentStore, NewBlog, StorageError, UserId, UserStore};

/// Blog as presented to API clients, with author and co-authors resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub blog_id: Uuid,
    pub author_id: UserId,
    pub author_name: String,
    pub title: String,
    pub content: String,
    /// Co-author emails
    pub co_authors: Vec<String>,
    /// Number of likers
    pub likes: usize,
    #[serde(rename = "view_count")]
    pub view_count: i64,
}

/// Fields accepted when creating a blog
#[derive(Debug, Clone)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub co_author_emails: Vec<String>,
}

/// Fields accepted when updating a blog; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Emails to add as co-authors. Existing co-authors are never removed.
    pub co_author_emails: Option<Vec<String>>,
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: usize,
}

/// Blog CRUD, likes and view counting with authorization checks
#[derive(Clone)]
pub struct BlogService {
    blogs: Arc<dyn BlogStore>,
    comments: Arc<dyn CommentStore>,
    users: Arc<dyn UserStore>,
    policy: BlogEditPolicy,
}

impl BlogService {
    pub fn new(
        blogs: Arc<dyn BlogStore>,
        comments: Arc<dyn CommentStore>,
        users: Arc<dyn UserStore>,
        policy: BlogEditPolicy,
    ) -> Self {
        Self {
            blogs,
            comments,
            users,
            policy,
        }
    }

    /// List the blogs written by the caller
    pub async fn list_for_author(&self, actor: UserId) -> Result<Vec<BlogView>, ApiError> {
        let blogs = self.blogs.list_author_blogs(actor).await?;

        let mut views = Vec::with_capacity(blogs.len());
        for blog in &blogs {
            views.push(self.view(blog).await?);
        }
        Ok(views)
    }

    /// Create a blog authored by the caller
    pub async fn create(&self, actor: UserId, draft: BlogDraft) -> Result<BlogView, ApiError> {
        // A valid token can still name a user that no longer exists
        self.users.get_user(actor).await.map_err(|e| match e {
            StorageError::UserNotFound(_) => ApiError::NotFound("Author"),
            other => other.into(),
        })?;

        let co_authors = self
            .resolve_co_authors(&draft.co_author_emails, actor, &[])
            .await?;

        let blog = self
            .blogs
            .create_blog(NewBlog {
                title: draft.title,
                content: draft.content,
                author_id: actor,
                co_authors,
            })
            .await?;

        info!("User {} created blog {}", actor, blog.id);
        self.view(&blog).await
    }

    /// Fetch a blog, counting the read as a view
    pub async fn get(&self, blog_id: Uuid) -> Result<BlogView, ApiError> {
        let mut blog = self.blogs.get_blog(blog_id).await?;

        blog.view_count += 1;
        self.blogs.update_blog(&blog).await?;

        self.view(&blog).await
    }

    /// Apply changes to a blog, appending any new co-authors
    pub async fn update(
        &self,
        actor: UserId,
        blog_id: Uuid,
        changes: BlogChanges,
    ) -> Result<BlogView, ApiError> {
        let mut blog = self.blogs.get_blog(blog_id).await?;
        self.authorize_edit(&blog, actor)?;

        if let Some(title) = changes.title {
            blog.title = title;
        }
        if let Some(content) = changes.content {
            blog.content = content;
        }
        if let Some(emails) = changes.co_author_emails {
            let added = self
                .resolve_co_authors(&emails, blog.author_id, &blog.co_authors)
                .await?;
            blog.add_co_authors(added);
        }

        self.blogs.update_blog(&blog).await?;
        self.view(&blog).await
    }

    /// Delete a blog and the comments left on it
    pub async fn delete(&self, actor: UserId, blog_id: Uuid) -> Result<(), ApiError> {
        let blog = self.blogs.get_blog(blog_id).await?;
        self.authorize_delete(&blog, actor)?;

        self.blogs.delete_blog(blog_id).await?;
        let removed = self.comments.delete_blog_comments(blog_id).await?;

        info!("User {} deleted blog {} ({} comments)", actor, blog_id, removed);
        Ok(())
    }

    /// Like the blog, or remove the like if the caller already likes it
    pub async fn toggle_like(
        &self,
        actor: UserId,
        blog_id: Uuid,
    ) -> Result<LikeOutcome, ApiError> {
        let mut blog = self.blogs.get_blog(blog_id).await?;

        let liked = blog.toggle_like(actor);
        self.blogs.update_blog(&blog).await?;

        Ok(LikeOutcome {
            liked,
            likes: blog.like_count(),
        })
    }

    /// Resolve co-author emails to user ids.
    ///
    /// Unknown emails are dropped. Ids already in `existing`, repeated in the
    /// input, or belonging to the author are skipped.
    pub async fn resolve_co_authors(
        &self,
        emails: &[String],
        author_id: UserId,
        existing: &[UserId],
    ) -> Result<Vec<UserId>, ApiError> {
        let mut resolved = Vec::new();

        for email in emails {
            let user = match self.users.get_user_by_email(&normalize_email(email)).await {
                Ok(user) => user,
                Err(StorageError::UserNotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };

            if user.id != author_id && !existing.contains(&user.id) && !resolved.contains(&user.id)
            {
                resolved.push(user.id);
            }
        }

        Ok(resolved)
    }

    fn authorize_edit(&self, blog: &Blog, actor: UserId) -> Result<(), ApiError> {
        match self.policy {
            BlogEditPolicy::Open => Ok(()),
            BlogEditPolicy::Authors if blog.is_author(actor) || blog.is_co_author(actor) => Ok(()),
            BlogEditPolicy::Authors => {
                warn!("User {} denied update of blog {}", actor, blog.id);
                Err(ApiError::Forbidden(
                    "You are not authorized to update this blog".to_string(),
                ))
            }
        }
    }

    fn authorize_delete(&self, blog: &Blog, actor: UserId) -> Result<(), ApiError> {
        match self.policy {
            BlogEditPolicy::Open => Ok(()),
            BlogEditPolicy::Authors if blog.is_author(actor) => Ok(()),
            BlogEditPolicy::Authors => {
                warn!("User {} denied deletion of blog {}", actor, blog.id);
                Err(ApiError::Forbidden(
                    "You are not authorized to delete this blog".to_string(),
                ))
            }
        }
    }

    async fn view(&self, blog: &Blog) -> Result<BlogView, ApiError> {
        let author_name = match self.users.get_user(blog.author_id).await {
            Ok(author) => author.full_name,
            Err(StorageError::UserNotFound(_)) => "Unknown Author".to_string(),
            Err(e) => return Err(e.into()),
        };

        let mut co_authors = Vec::with_capacity(blog.co_authors.len());
        for id in &blog.co_authors {
            match self.users.get_user(*id).await {
                Ok(user) => co_authors.push(user.email),
                Err(StorageError::UserNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(BlogView {
            blog_id: blog.id,
            author_id: blog.author_id,
            author_name,
            title: blog.title.clone(),
            content: blog.content.clone(),
            co_authors,
            likes: blog.like_count(),
            view_count: blog.view_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CreateUser, MemoryStore, NewComment, User};

    struct Fixture {
        store: Arc<MemoryStore>,
        service: BlogService,
    }

    fn fixture(policy: BlogEditPolicy) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = BlogService::new(store.clone(), store.clone(), store.clone(), policy);
        Fixture { store, service }
    }

    async fn user(store: &MemoryStore, name: &str, email: &str) -> User {
        store
            .create_user(CreateUser {
                full_name: name.to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    fn draft(co_authors: &[&str]) -> BlogDraft {
        BlogDraft {
            title: "First post".to_string(),
            content: "Hello".to_string(),
            co_author_emails: co_authors.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_resolve_co_authors_drops_unknown() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        let known = user(&f.store, "Known", "known@x.com").await;

        let resolved = f
            .service
            .resolve_co_authors(
                &["known@x.com".to_string(), "unknown@x.com".to_string()],
                author.id,
                &[],
            )
            .await
            .unwrap();

        assert_eq!(resolved, vec![known.id]);
    }

    #[tokio::test]
    async fn test_resolve_co_authors_skips_existing_and_author() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        let known = user(&f.store, "Known", "known@x.com").await;
        let other = user(&f.store, "Other", "other@x.com").await;

        let resolved = f
            .service
            .resolve_co_authors(
                &[
                    "known@x.com".to_string(),
                    "author@x.com".to_string(),
                    "other@x.com".to_string(),
                    "OTHER@x.com".to_string(),
                ],
                author.id,
                &[known.id],
            )
            .await
            .unwrap();

        assert_eq!(resolved, vec![other.id]);
    }

    #[tokio::test]
    async fn test_create_and_get_counts_views() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        user(&f.store, "Known", "known@x.com").await;

        let created = f
            .service
            .create(author.id, draft(&["known@x.com", "unknown@x.com"]))
            .await
            .unwrap();

        assert_eq!(created.author_name, "Author");
        assert_eq!(created.co_authors, vec!["known@x.com".to_string()]);
        assert_eq!(created.view_count, 0);

        f.service.get(created.blog_id).await.unwrap();
        let fetched = f.service.get(created.blog_id).await.unwrap();
        assert_eq!(fetched.view_count, 2);
    }

    #[tokio::test]
    async fn test_create_for_missing_author() {
        let f = fixture(BlogEditPolicy::Open);

        let result = f.service.create(Uuid::new_v4(), draft(&[])).await;

        assert!(matches!(result, Err(ApiError::NotFound("Author"))));
        assert_eq!(f.store.blog_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_count() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        let reader = user(&f.store, "Reader", "reader@x.com").await;
        let blog = f.service.create(author.id, draft(&[])).await.unwrap();

        let first = f.service.toggle_like(reader.id, blog.blog_id).await.unwrap();
        assert_eq!(first, LikeOutcome { liked: true, likes: 1 });

        let second = f.service.toggle_like(reader.id, blog.blog_id).await.unwrap();
        assert_eq!(second, LikeOutcome { liked: false, likes: 0 });
    }

    #[tokio::test]
    async fn test_update_appends_co_authors() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        user(&f.store, "One", "one@x.com").await;
        user(&f.store, "Two", "two@x.com").await;
        let blog = f.service.create(author.id, draft(&["one@x.com"])).await.unwrap();

        let updated = f
            .service
            .update(
                author.id,
                blog.blog_id,
                BlogChanges {
                    title: Some("Renamed".to_string()),
                    content: None,
                    co_author_emails: Some(vec!["two@x.com".to_string(), "one@x.com".to_string()]),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.content, "Hello");
        assert_eq!(
            updated.co_authors,
            vec!["one@x.com".to_string(), "two@x.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_blog_leaves_collection_unchanged() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        f.service.create(author.id, draft(&[])).await.unwrap();

        let result = f.service.delete(author.id, Uuid::new_v4()).await;

        assert!(matches!(result, Err(ApiError::NotFound("Blog"))));
        assert_eq!(f.store.blog_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_comments() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        let blog = f.service.create(author.id, draft(&[])).await.unwrap();
        f.store
            .create_comment(NewComment {
                content: "Nice".to_string(),
                user_id: author.id,
                blog_id: blog.blog_id,
            })
            .await
            .unwrap();

        f.service.delete(author.id, blog.blog_id).await.unwrap();

        assert_eq!(f.store.blog_count(), 0);
        assert_eq!(f.store.comment_count(), 0);
    }

    #[tokio::test]
    async fn test_open_policy_lets_anyone_edit() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        let stranger = user(&f.store, "Stranger", "stranger@x.com").await;
        let blog = f.service.create(author.id, draft(&[])).await.unwrap();

        let changes = BlogChanges {
            content: Some("Edited".to_string()),
            ..Default::default()
        };
        let updated = f.service.update(stranger.id, blog.blog_id, changes).await.unwrap();

        assert_eq!(updated.content, "Edited");
        assert_eq!(updated.author_id, author.id);
        f.service.delete(stranger.id, blog.blog_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_authors_policy() {
        let f = fixture(BlogEditPolicy::Authors);
        let author = user(&f.store, "Author", "author@x.com").await;
        let co_author = user(&f.store, "Co", "co@x.com").await;
        let stranger = user(&f.store, "Stranger", "stranger@x.com").await;
        let blog = f.service.create(author.id, draft(&["co@x.com"])).await.unwrap();

        let changes = || BlogChanges {
            content: Some("Edited".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            f.service.update(stranger.id, blog.blog_id, changes()).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(f.service.update(co_author.id, blog.blog_id, changes()).await.is_ok());

        assert!(matches!(
            f.service.delete(co_author.id, blog.blog_id).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.delete(stranger.id, blog.blog_id).await,
            Err(ApiError::Forbidden(_))
        ));
        assert_eq!(f.store.blog_count(), 1);

        f.service.delete(author.id, blog.blog_id).await.unwrap();
        assert_eq!(f.store.blog_count(), 0);
    }

    #[tokio::test]
    async fn test_list_only_own_blogs() {
        let f = fixture(BlogEditPolicy::Open);
        let author = user(&f.store, "Author", "author@x.com").await;
        let other = user(&f.store, "Other", "other@x.com").await;
        f.service.create(author.id, draft(&[])).await.unwrap();
        f.service.create(author.id, draft(&[])).await.unwrap();
        f.service.create(other.id, draft(&[])).await.unwrap();

        let listed = f.service.list_for_author(author.id).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|blog| blog.author_id == author.id));
    }
}
