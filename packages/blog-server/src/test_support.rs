use std::sync::Arc;

use crate::auth::TokenConfig;
use crate::config::{BlogEditPolicy, ServerConfig};
use crate::state::ServerState;
use crate::storage::{MemoryStore, StorageBackend};

/// Configuration for in-process tests: cheap bcrypt, short-lived tokens
pub fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        bind_addr: "127.0.0.1".to_string(),
        database_url: None,
        token: TokenConfig {
            secret: "test-secret-0123456789".to_string(),
            lifetime_seconds: 900,
        },
        bcrypt_cost: 4,
        blog_edit_policy: BlogEditPolicy::Open,
        cookie_secure: false,
        cors_origins: vec!["http://localhost:3000".to_string()],
    }
}

/// Server state over a fresh in-memory store
pub fn test_state(config: ServerConfig) -> Arc<ServerState> {
    let store = Arc::new(MemoryStore::new());
    Arc::new(ServerState::new(
        config,
        StorageBackend::Memory,
        store.clone(),
        store.clone(),
        store,
    ))
}
