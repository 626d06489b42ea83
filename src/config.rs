//! Configuration management for Octavo server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::env;
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix OCTAVO_)
            .add_source(
                Environment::with_prefix("OCTAVO")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override database URL from DATABASE_URL env var if present
            .set_override_option(
                "database.url",
                env::var("DATABASE_URL").ok(),
            )?
            .build()?;

        config.try_deserialize()
    }
}

impl DatabaseConfig {
    /// Pool options for this database URL.
    ///
    /// An in-memory SQLite database lives and dies with its connection, so
    /// `:memory:` URLs are pinned to a single connection with recycling
    /// disabled: a replacement connection would open an empty, schemaless
    /// database.
    pub fn pool_options(&self) -> SqlitePoolOptions {
        if self.url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .max_lifetime(None)
                .idle_timeout(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(self.max_connections)
                .min_connections(self.min_connections)
        }
    }

    /// Open the connection pool this configuration describes.
    pub async fn connect(&self) -> Result<Pool<Sqlite>, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&self.url)?.create_if_missing(true);
        self.pool_options().connect_with(options).await
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            // An in-memory SQLite database exists per connection, so the pool
            // must stay at a single connection for the default URL.
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_pin_the_pool_to_one_unrecycled_connection() {
        let options = DatabaseConfig::default().pool_options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        // A recycled connection would come back without the schema, so both
        // retirement timers must stay off.
        assert!(options.get_max_lifetime().is_none());
        assert!(options.get_idle_timeout().is_none());
    }

    #[test]
    fn file_urls_use_the_configured_pool_limits() {
        let config = DatabaseConfig {
            url: "sqlite://octavo.db".to_string(),
            max_connections: 5,
            min_connections: 2,
        };
        let options = config.pool_options();
        assert_eq!(options.get_max_connections(), 5);
        assert_eq!(options.get_min_connections(), 2);
    }
}
