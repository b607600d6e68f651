use std::sync::Arc;
use std::time::Instant;

use crate::auth::{AuthState, CredentialStore};
use crate::config::ServerConfig;
use crate::services::{BlogService, CommentService};
use crate::storage::{BlogStore, CommentStore, StorageBackend, UserStore};

/// Main server state shared across all handlers
pub struct ServerState {
    pub config: ServerConfig,
    pub credentials: CredentialStore,
    pub blogs: BlogService,
    pub comments: CommentService,
    pub auth_state: Arc<AuthState>,
    pub storage_backend: StorageBackend,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        storage_backend: StorageBackend,
        user_store: Arc<dyn UserStore>,
        blog_store: Arc<dyn BlogStore>,
        comment_store: Arc<dyn CommentStore>,
    ) -> Self {
        let auth_state = Arc::new(AuthState::new(&config.token, config.cookie_secure));
        let credentials = CredentialStore::new(user_store.clone(), config.bcrypt_cost);

        let blogs = BlogService::new(
            blog_store.clone(),
            comment_store.clone(),
            user_store.clone(),
            config.blog_edit_policy,
        );
        let comments = CommentService::new(comment_store, blog_store, user_store);

        Self {
            config,
            credentials,
            blogs,
            comments,
            auth_state,
            storage_backend,
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
