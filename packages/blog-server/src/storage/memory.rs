use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::storage::traits::{BlogStore, CommentStore, StorageError, StorageResult};
use crate::storage::types::{Blog, Comment, NewBlog, NewComment, UserId};
use crate::storage::users::{CreateUser, User, UserStore};

/// In-process store backing all three collections.
///
/// Each operation holds the collection lock for its whole duration, so a
/// single document write is atomic. Sequences of calls are not.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    blogs: RwLock<HashMap<Uuid, Blog>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blog_count(&self) -> usize {
        self.blogs.read().len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.read().len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: CreateUser) -> StorageResult<User> {
        let mut users = self.users.write();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StorageError::DuplicateEmail(user.email));
        }

        let created = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> StorageResult<User> {
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::UserNotFound(id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<User> {
        self.users
            .read()
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| StorageError::UserNotFound(email.to_string()))
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_blog(&self, blog: NewBlog) -> StorageResult<Blog> {
        let created = Blog {
            id: Uuid::new_v4(),
            title: blog.title,
            content: blog.content,
            author_id: blog.author_id,
            co_authors: blog.co_authors,
            likes: Vec::new(),
            view_count: 0,
            created_at: Utc::now(),
        };
        self.blogs.write().insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_blog(&self, id: Uuid) -> StorageResult<Blog> {
        self.blogs
            .read()
            .get(&id)
            .cloned()
            .ok_or(StorageError::BlogNotFound(id))
    }

    async fn list_author_blogs(&self, author_id: UserId) -> StorageResult<Vec<Blog>> {
        let mut blogs: Vec<Blog> = self
            .blogs
            .read()
            .values()
            .filter(|blog| blog.author_id == author_id)
            .cloned()
            .collect();
        blogs.sort_by_key(|blog| blog.created_at);
        Ok(blogs)
    }

    async fn update_blog(&self, blog: &Blog) -> StorageResult<()> {
        let mut blogs = self.blogs.write();
        let stored = blogs
            .get_mut(&blog.id)
            .ok_or(StorageError::BlogNotFound(blog.id))?;

        stored.title = blog.title.clone();
        stored.content = blog.content.clone();
        stored.co_authors = blog.co_authors.clone();
        stored.likes = blog.likes.clone();
        stored.view_count = blog.view_count;

        Ok(())
    }

    async fn delete_blog(&self, id: Uuid) -> StorageResult<()> {
        self.blogs
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::BlogNotFound(id))
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, comment: NewComment) -> StorageResult<Comment> {
        let created = Comment {
            id: Uuid::new_v4(),
            content: comment.content,
            user_id: comment.user_id,
            blog_id: comment.blog_id,
            created_at: Utc::now(),
        };
        self.comments.write().insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_comment(&self, id: Uuid) -> StorageResult<Comment> {
        self.comments
            .read()
            .get(&id)
            .cloned()
            .ok_or(StorageError::CommentNotFound(id))
    }

    async fn list_blog_comments(&self, blog_id: Uuid) -> StorageResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .values()
            .filter(|comment| comment.blog_id == blog_id)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.created_at);
        Ok(comments)
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> StorageResult<Comment> {
        let mut comments = self.comments.write();
        let stored = comments
            .get_mut(&id)
            .ok_or(StorageError::CommentNotFound(id))?;
        stored.content = content.to_string();

        Ok(stored.clone())
    }

    async fn delete_comment(&self, id: Uuid) -> StorageResult<()> {
        self.comments
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::CommentNotFound(id))
    }

    async fn delete_blog_comments(&self, blog_id: Uuid) -> StorageResult<u64> {
        let mut comments = self.comments.write();
        let before = comments.len();
        comments.retain(|_, comment| comment.blog_id != blog_id);
        Ok((before - comments.len()) as u64)
    }
}
