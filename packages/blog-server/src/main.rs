use blog_server::{
    build_router,
    cli::{Cli, Commands},
    config::ServerConfig,
    state::ServerState,
    storage::{
        BlogStore, CommentStore, MemoryStore, PostgresBlogStore, PostgresCommentStore,
        PostgresUserStore, StorageBackend, UserStore,
    },
};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backing stores for the three collections
struct Stores {
    backend: StorageBackend,
    users: Arc<dyn UserStore>,
    blogs: Arc<dyn BlogStore>,
    comments: Arc<dyn CommentStore>,
}

impl Stores {
    fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            backend: StorageBackend::Memory,
            users: store.clone(),
            blogs: store.clone(),
            comments: store,
        }
    }

    /// Connect to PostgreSQL and create any missing tables
    async fn postgres(database_url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        // Order matters: blogs reference users, comments reference blogs
        let users = PostgresUserStore::new(pool.clone());
        users.initialize().await?;

        let blogs = PostgresBlogStore::new(pool.clone());
        blogs.initialize().await?;

        let comments = PostgresCommentStore::new(pool);
        comments.initialize().await?;

        Ok(Self {
            backend: StorageBackend::Postgres,
            users: Arc::new(users),
            blogs: Arc::new(blogs),
            comments: Arc::new(comments),
        })
    }
}

async fn connect_pool(config: &ServerConfig) -> Result<PgPool, Box<dyn std::error::Error>> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(config.require_database_url()?)
        .await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Handle CLI commands
    let in_memory = match cli.command {
        Some(Commands::User(cmd)) => {
            let user_store = PostgresUserStore::new(connect_pool(&config).await?);
            user_store.initialize().await?;
            return cmd.execute(Arc::new(user_store), config.bcrypt_cost).await;
        }
        Some(Commands::Serve { in_memory }) => in_memory,
        None => false,
    };

    // Server mode
    info!("🚀 Starting Blog Server v{}", VERSION);
    info!("📋 Configuration loaded:");
    info!("   Port: {}", config.port);
    info!("   Bind address: {}", config.bind_addr);
    info!("   Token lifetime: {}s", config.token.lifetime_seconds);
    info!("   Blog edit policy: {:?}", config.blog_edit_policy);
    info!("   Secure cookies: {}", config.cookie_secure);
    info!("   CORS origins: {:?}", config.cors_origins);

    let stores = if in_memory {
        info!("⚠️  Using in-memory storage, data is lost on shutdown");
        Stores::in_memory()
    } else {
        let stores = Stores::postgres(config.require_database_url()?).await?;
        info!("✅ Database connected and schema initialized");
        stores
    };

    // Create server state
    let state = Arc::new(ServerState::new(
        config.clone(),
        stores.backend,
        stores.users,
        stores.blogs,
        stores.comments,
    ));

    let app = build_router(state);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    info!("🎧 Listening on http://{}", addr);
    info!("🔑 Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
