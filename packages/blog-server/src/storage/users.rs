use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::traits::{StorageError, StorageResult};

/// User account in the system
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User creation request
#[derive(Debug)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

/// User store trait
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user, failing with `DuplicateEmail` if the email is taken
    async fn create_user(&self, user: CreateUser) -> StorageResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> StorageResult<User>;

    /// Get user by email
    async fn get_user_by_email(&self, email: &str) -> StorageResult<User>;

    /// List all users
    async fn list_users(&self) -> StorageResult<Vec<User>>;
}

/// PostgreSQL implementation of UserStore
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Initialize database schema for users
    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                full_name VARCHAR(255) NOT NULL,
                email VARCHAR(255) UNIQUE NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: CreateUser) -> StorageResult<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return StorageError::DuplicateEmail(user.email.clone());
                }
            }
            StorageError::Database(e)
        })?;

        Ok(User {
            id,
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
        })
    }

    async fn get_user(&self, id: Uuid) -> StorageResult<User> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::UserNotFound(id.to_string()))?;

        Ok(user_from_row(&row))
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<User> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StorageError::UserNotFound(email.to_string()))?;

        Ok(user_from_row(&row))
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, email, password_hash, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }
}
