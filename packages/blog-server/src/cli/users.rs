use clap::Subcommand;
use rand::Rng;
use std::sync::Arc;

use crate::auth::{normalize_email, CredentialStore};
use crate::storage::UserStore;

/// Length of generated passwords
const GENERATED_PASSWORD_LENGTH: usize = 16;

/// User management subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    Create {
        /// User's email address
        #[arg(short, long)]
        email: String,

        /// User's full name
        #[arg(short, long)]
        name: String,

        /// Password (if not provided, a random one will be generated)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List,

    /// Show user details
    Show {
        /// User's email address
        email: String,
    },
}

impl UserCommands {
    /// Execute the user command
    pub async fn execute(
        self,
        user_store: Arc<dyn UserStore>,
        bcrypt_cost: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            UserCommands::Create {
                email,
                name,
                password,
            } => {
                let password = password.unwrap_or_else(generate_secure_password);
                let credentials = CredentialStore::new(user_store, bcrypt_cost);

                let user = credentials
                    .register(&name, &email, &password)
                    .await
                    .map_err(|e| format!("Failed to create user: {}", e))?;

                println!("✅ User created successfully!");
                println!();
                println!("   Email:    {}", user.email);
                println!("   Name:     {}", user.full_name);
                println!("   Password: {}", password);
                println!();
                println!("⚠️  Please securely share these credentials with the user.");
            }

            UserCommands::List => {
                let users = user_store.list_users().await?;

                if users.is_empty() {
                    println!("No users found.");
                    return Ok(());
                }

                println!("{:<36} {:<30} {:<20}", "ID", "Email", "Name");
                println!("{}", "-".repeat(88));

                for user in users {
                    println!(
                        "{:<36} {:<30} {:<20}",
                        user.id,
                        truncate(&user.email, 28),
                        truncate(&user.full_name, 18),
                    );
                }
            }

            UserCommands::Show { email } => {
                let user = user_store.get_user_by_email(&normalize_email(&email)).await?;

                println!("User Details:");
                println!("  ID:      {}", user.id);
                println!("  Email:   {}", user.email);
                println!("  Name:    {}", user.full_name);
                println!("  Created: {}", user.created_at);
            }
        }

        Ok(())
    }
}

/// Generate a secure random password
fn generate_secure_password() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789!@#$%&*";
    let mut rng = rand::thread_rng();

    (0..GENERATED_PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Truncate string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_generated_password() {
        let password = generate_secure_password();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert_ne!(password, generate_secure_password());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-name", 8), "a-ver...");
        assert_eq!(truncate("éééééééééé", 5), "éé...");
    }

    #[tokio::test]
    async fn test_create_then_show() {
        let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());

        let create = UserCommands::Create {
            email: "Ada@X.com".to_string(),
            name: "Ada".to_string(),
            password: None,
        };
        tokio_test::assert_ok!(create.execute(store.clone(), 4).await);

        let show = UserCommands::Show {
            email: "ada@x.com".to_string(),
        };
        tokio_test::assert_ok!(show.execute(store.clone(), 4).await);

        let duplicate = UserCommands::Create {
            email: "ada@x.com".to_string(),
            name: "Ada".to_string(),
            password: Some("secret1".to_string()),
        };
        tokio_test::assert_err!(duplicate.execute(store, 4).await);
    }
}
