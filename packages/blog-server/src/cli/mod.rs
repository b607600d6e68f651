mod users;

pub use users::UserCommands;

use clap::{Parser, Subcommand};

/// Blog Server - REST API for blogs, comments and likes
#[derive(Parser)]
#[command(name = "blog-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server (default)
    Serve {
        /// Keep all data in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),
}
