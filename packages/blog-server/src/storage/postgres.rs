use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::storage::traits::{BlogStore, CommentStore, StorageError, StorageResult};
use crate::storage::types::{Blog, Comment, NewBlog, NewComment, UserId};

/// PostgreSQL implementation of BlogStore.
///
/// Co-authors and likes are stored inline as `UUID[]` columns so a blog
/// is read and written as a single document.
pub struct PostgresBlogStore {
    pool: PgPool,
}

impl PostgresBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize database schema for blogs. Requires the users table.
    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blogs (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author_id UUID NOT NULL REFERENCES users(id),
                co_authors UUID[] NOT NULL DEFAULT '{}',
                likes UUID[] NOT NULL DEFAULT '{}',
                view_count BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_blogs_author ON blogs(author_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn blog_from_row(row: &PgRow) -> Blog {
    Blog {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        co_authors: row.get("co_authors"),
        likes: row.get("likes"),
        view_count: row.get("view_count"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl BlogStore for PostgresBlogStore {
    async fn create_blog(&self, blog: NewBlog) -> StorageResult<Blog> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO blogs
                (id, title, content, author_id, co_authors, likes, view_count, created_at)
            VALUES ($1, $2, $3, $4, $5, '{}', 0, $6)
            "#,
        )
        .bind(id)
        .bind(&blog.title)
        .bind(&blog.content)
        .bind(blog.author_id)
        .bind(&blog.co_authors)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Blog {
            id,
            title: blog.title,
            content: blog.content,
            author_id: blog.author_id,
            co_authors: blog.co_authors,
            likes: Vec::new(),
            view_count: 0,
            created_at: now,
        })
    }

    async fn get_blog(&self, id: Uuid) -> StorageResult<Blog> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, author_id, co_authors, likes, view_count, created_at
            FROM blogs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::BlogNotFound(id))?;

        Ok(blog_from_row(&row))
    }

    async fn list_author_blogs(&self, author_id: UserId) -> StorageResult<Vec<Blog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, author_id, co_authors, likes, view_count, created_at
            FROM blogs
            WHERE author_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(blog_from_row).collect())
    }

    async fn update_blog(&self, blog: &Blog) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE blogs
            SET title = $2, content = $3, co_authors = $4, likes = $5, view_count = $6
            WHERE id = $1
            "#,
        )
        .bind(blog.id)
        .bind(&blog.title)
        .bind(&blog.content)
        .bind(&blog.co_authors)
        .bind(&blog.likes)
        .bind(blog.view_count)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::BlogNotFound(blog.id));
        }

        Ok(())
    }

    async fn delete_blog(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM blogs WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::BlogNotFound(id));
        }

        Ok(())
    }
}

/// PostgreSQL implementation of CommentStore
pub struct PostgresCommentStore {
    pool: PgPool,
}

impl PostgresCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize database schema for comments. Requires the users and blogs tables.
    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id UUID PRIMARY KEY,
                content TEXT NOT NULL,
                user_id UUID NOT NULL
                    CONSTRAINT comments_user_fk REFERENCES users(id),
                blog_id UUID NOT NULL
                    CONSTRAINT comments_blog_fk REFERENCES blogs(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_comments_blog ON comments(blog_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Map a violated comment foreign key to the record that is missing
fn missing_comment_reference(
    constraint: Option<&str>,
    comment: &NewComment,
) -> Option<StorageError> {
    match constraint? {
        "comments_user_fk" => Some(StorageError::UserNotFound(comment.user_id.to_string())),
        "comments_blog_fk" => Some(StorageError::BlogNotFound(comment.blog_id)),
        _ => None,
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        content: row.get("content"),
        user_id: row.get("user_id"),
        blog_id: row.get("blog_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CommentStore for PostgresCommentStore {
    async fn create_comment(&self, comment: NewComment) -> StorageResult<Comment> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO comments (id, content, user_id, blog_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&comment.content)
        .bind(comment.user_id)
        .bind(comment.blog_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let missing = e
                .as_database_error()
                .filter(|db_err| db_err.is_foreign_key_violation())
                .and_then(|db_err| missing_comment_reference(db_err.constraint(), &comment));
            missing.unwrap_or_else(|| StorageError::Database(e))
        })?;

        Ok(Comment {
            id,
            content: comment.content,
            user_id: comment.user_id,
            blog_id: comment.blog_id,
            created_at: now,
        })
    }

    async fn get_comment(&self, id: Uuid) -> StorageResult<Comment> {
        let row = sqlx::query(
            r#"
            SELECT id, content, user_id, blog_id, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::CommentNotFound(id))?;

        Ok(comment_from_row(&row))
    }

    async fn list_blog_comments(&self, blog_id: Uuid) -> StorageResult<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, content, user_id, blog_id, created_at
            FROM comments
            WHERE blog_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> StorageResult<Comment> {
        let row = sqlx::query(
            r#"
            UPDATE comments SET content = $2 WHERE id = $1
            RETURNING id, content, user_id, blog_id, created_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::CommentNotFound(id))?;

        Ok(comment_from_row(&row))
    }

    async fn delete_comment(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::CommentNotFound(id));
        }

        Ok(())
    }

    async fn delete_blog_comments(&self, blog_id: Uuid) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments WHERE blog_id = $1
            "#,
        )
        .bind(blog_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_comment() -> NewComment {
        NewComment {
            content: "Hello".to_string(),
            user_id: Uuid::new_v4(),
            blog_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_missing_user_is_not_reported_as_missing_blog() {
        let comment = new_comment();

        let err = missing_comment_reference(Some("comments_user_fk"), &comment);

        assert!(matches!(
            err,
            Some(StorageError::UserNotFound(id)) if id == comment.user_id.to_string()
        ));
    }

    #[test]
    fn test_missing_blog_reference() {
        let comment = new_comment();

        let err = missing_comment_reference(Some("comments_blog_fk"), &comment);

        assert!(matches!(err, Some(StorageError::BlogNotFound(id)) if id == comment.blog_id));
    }

    #[test]
    fn test_unknown_constraint_is_not_mapped() {
        let comment = new_comment();

        assert!(missing_comment_reference(Some("something_else"), &comment).is_none());
        assert!(missing_comment_reference(None, &comment).is_none());
    }
}
