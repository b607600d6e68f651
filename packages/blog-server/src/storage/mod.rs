mod memory;
mod postgres;
mod traits;
mod types;
mod users;

pub use memory::MemoryStore;
pub use postgres::{PostgresBlogStore, PostgresCommentStore};
pub use traits::{BlogStore, CommentStore, StorageError, StorageResult};
pub use types::*;
pub use users::{CreateUser, PostgresUserStore, User, UserStore};

use serde::Serialize;

/// Which backend holds users, blogs and comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    /// Process memory; everything is lost on shutdown
    Memory,
}
