//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub realtime: RealtimeConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "social.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://social.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Authentication configuration (OAuth provider + sessions)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session secret key (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
    pub provider: OAuthProviderConfig,
}

/// OAuth 2.0 provider configuration
///
/// Provider-agnostic authorization code flow. The provider name prefixes
/// user ids so identities from different providers never collide.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProviderConfig {
    /// Short provider name used as the user id prefix (e.g., "replit")
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    /// Authorization endpoint the browser is redirected to
    pub authorize_url: String,
    /// Token endpoint for the code exchange
    pub token_url: String,
    /// Userinfo endpoint returning the OpenID profile claims
    pub userinfo_url: String,
    /// Scopes requested during authorization
    #[serde(default = "default_oauth_scope")]
    pub scope: String,
}

fn default_oauth_scope() -> String {
    "openid email profile".to_string()
}

/// Realtime broadcast configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Broadcast channel capacity; slow subscribers that fall further
    /// behind than this skip ahead and lose messages (at-most-once).
    pub channel_capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (MIKROMATTER_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.protocol", "http")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("realtime.channel_capacity", 256)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (MIKROMATTER_*)
            .add_source(
                Environment::with_prefix("MIKROMATTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.auth.session_secret.len() < 32 {
            return Err(crate::error::AppError::Config(
                "auth.session_secret must be at least 32 bytes".to_string(),
            ));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be positive".to_string(),
            ));
        }

        if self.realtime.channel_capacity == 0 {
            return Err(crate::error::AppError::Config(
                "realtime.channel_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
