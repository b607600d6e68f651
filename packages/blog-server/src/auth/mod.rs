mod credentials;
mod middleware;
mod password;
mod token;

pub use credentials::{normalize_email, CredentialStore};
pub use middleware::{auth_middleware, AuthState, AuthUser, SESSION_COOKIE};
pub use password::{hash_password, verify_password, PasswordError, DEFAULT_BCRYPT_COST};
pub use token::{Claims, TokenConfig, TokenError, TokenService};
