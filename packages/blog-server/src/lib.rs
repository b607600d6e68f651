pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::ServerState;
