use std::env;
use std::str::FromStr;

use crate::auth::{TokenConfig, DEFAULT_BCRYPT_COST};

/// Minimum accepted length of the token signing secret
const MIN_JWT_SECRET_LENGTH: usize = 16;

/// Default session lifetime: one day
const DEFAULT_JWT_LIFETIME: &str = "1d";

/// Longest accepted session lifetime: one year
const MAX_JWT_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// PostgreSQL database URL, only required by the postgres backend
    pub database_url: Option<String>,
    /// Token signing secret and lifetime
    pub token: TokenConfig,
    /// bcrypt work factor for stored passwords
    pub bcrypt_cost: u32,
    /// Who may update or delete a blog
    pub blog_edit_policy: BlogEditPolicy,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub cookie_secure: bool,
    /// CORS allowed origins (comma-separated in env var)
    pub cors_origins: Vec<String>,
}

/// Rule deciding who may update or delete a blog.
///
/// Likes and reads are open to every authenticated user under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlogEditPolicy {
    /// Any authenticated user may update or delete any blog
    #[default]
    Open,
    /// Author and co-authors may update, only the author may delete
    Authors,
}

impl FromStr for BlogEditPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "authors" => Ok(Self::Authors),
            other => Err(ConfigError::InvalidValue(format!(
                "BLOG_EDIT_POLICY must be 'open' or 'authors', got '{}'",
                other
            ))),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        // SECURITY: Require an explicit signing secret - no defaults
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let lifetime_seconds = parse_token_lifetime(
            &env::var("JWT_LIFETIME").unwrap_or_else(|_| DEFAULT_JWT_LIFETIME.to_string()),
        )?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or_else(|| {
                    ConfigError::InvalidValue("BCRYPT_COST must be between 4 and 31".to_string())
                })?,
            Err(_) => DEFAULT_BCRYPT_COST,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            database_url: env::var("DATABASE_URL").ok(),
            token: TokenConfig {
                secret: jwt_secret,
                lifetime_seconds,
            },
            bcrypt_cost,
            blog_edit_policy: env::var("BLOG_EDIT_POLICY")
                .map(|v| v.parse::<BlogEditPolicy>())
                .unwrap_or(Ok(BlogEditPolicy::Open))?,
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| {
                    vec![
                        "http://localhost:3000".to_string(),
                        "http://127.0.0.1:3000".to_string(),
                    ]
                }),
        })
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Database URL, required when running against PostgreSQL
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

/// Parse a lifetime such as `3600`, `45s`, `90m`, `12h` or `30d` into seconds
pub fn parse_duration_secs(value: &str) -> Result<u64, ConfigError> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidValue(format!("Invalid duration: '{}'", value));

    let (digits, multiplier) = match value.chars().last() {
        Some('s') => (&value[..value.len() - 1], 1),
        Some('m') => (&value[..value.len() - 1], 60),
        Some('h') => (&value[..value.len() - 1], 60 * 60),
        Some('d') => (&value[..value.len() - 1], 24 * 60 * 60),
        Some(c) if c.is_ascii_digit() => (value, 1),
        _ => return Err(invalid()),
    };

    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(invalid());
    }
    amount.checked_mul(multiplier).ok_or_else(invalid)
}

/// Parse `JWT_LIFETIME`, rejecting values longer than a year
pub fn parse_token_lifetime(value: &str) -> Result<u64, ConfigError> {
    let seconds = parse_duration_secs(value)?;
    if seconds > MAX_JWT_LIFETIME_SECS {
        return Err(ConfigError::InvalidValue(format!(
            "JWT_LIFETIME must not exceed {} seconds, got {}",
            MAX_JWT_LIFETIME_SECS, seconds
        )));
    }
    Ok(seconds)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration_secs("3600").unwrap(), 3600);
        assert_eq!(parse_duration_secs("45s").unwrap(), 45);
        assert_eq!(parse_duration_secs("90m").unwrap(), 5400);
        assert_eq!(parse_duration_secs("12h").unwrap(), 43200);
        assert_eq!(parse_duration_secs("30d").unwrap(), 2_592_000);
        assert_eq!(parse_duration_secs(" 1d ").unwrap(), 86400);
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration_secs("").is_err());
        assert!(parse_duration_secs("d").is_err());
        assert!(parse_duration_secs("0").is_err());
        assert!(parse_duration_secs("10w").is_err());
        assert!(parse_duration_secs("-5m").is_err());
    }

    #[test]
    fn test_token_lifetime_bound() {
        assert_eq!(parse_token_lifetime("1d").unwrap(), 86400);
        assert_eq!(parse_token_lifetime("365d").unwrap(), MAX_JWT_LIFETIME_SECS);
        assert!(matches!(
            parse_token_lifetime("366d"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(parse_token_lifetime("100000000d").is_err());
        assert!(parse_token_lifetime("200000000000d").is_err());
    }

    #[test]
    fn test_blog_edit_policy_parse() {
        assert_eq!("open".parse::<BlogEditPolicy>().unwrap(), BlogEditPolicy::Open);
        assert_eq!("Authors".parse::<BlogEditPolicy>().unwrap(), BlogEditPolicy::Authors);
        assert!("owner".parse::<BlogEditPolicy>().is_err());
    }
}
