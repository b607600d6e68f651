use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::storage::{CreateUser, StorageError, User, UserStore};

/// Registers users and checks their passwords.
///
/// Plaintext passwords only ever live on the stack of these calls; the
/// store receives the bcrypt hash.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Create a user account, failing with `DuplicateEmail` if the email is taken
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let email = normalize_email(email);

        match self.users.get_user_by_email(&email).await {
            Ok(_) => return Err(ApiError::DuplicateEmail),
            Err(StorageError::UserNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = hash_password(password, self.bcrypt_cost)?;

        // The store enforces uniqueness too, covering concurrent registrations
        let user = self
            .users
            .create_user(CreateUser {
                full_name: full_name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        info!("Registered user {}", user.email);
        Ok(user)
    }

    /// Check a candidate password against the user's stored hash
    pub fn verify_secret(&self, user: &User, candidate: &str) -> bool {
        match verify_password(candidate, &user.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Stored hash for user {} is unusable: {}", user.id, e);
                false
            }
        }
    }

    /// Resolve an email/password pair to a user
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = normalize_email(email);

        let user = match self.users.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(StorageError::UserNotFound(_)) => {
                warn!("Login attempt for unknown user: {}", email);
                return Err(ApiError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.verify_secret(&user, password) {
            warn!("Invalid password for user: {}", email);
            return Err(ApiError::InvalidCredentials);
        }

        Ok(user)
    }
}

/// Emails are compared case-insensitively and without surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
