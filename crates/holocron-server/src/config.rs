//! Server configuration
//!
//! Configuration is read from environment variables (via `.env` when
//! present), with sensible defaults for local development. `SWAPI_*`
//! variables for the import pipeline live in
//! [`crate::ingest::swapi::SwapiConfig`].

use anyhow::Result;
use std::env;

/// Default host the HTTP server binds to
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default port the HTTP server binds to
const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default seconds to wait for in-flight requests during shutdown
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default PostgreSQL connection string
const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/holocron";

/// Default maximum connections in the PostgreSQL pool
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum idle connections in the PostgreSQL pool
const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 1;

/// Default seconds to wait when acquiring a connection
const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default seconds before an idle connection is closed
const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default allowed CORS origin
const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// PostgreSQL pool settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            server: ServerConfig {
                host: env::var("HOLOCRON_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env::var("HOLOCRON_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env::var("HOLOCRON_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: env::var("DATABASE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("HOLOCRON_PORT must be greater than 0");
        }
        if self.database.url.is_empty() {
            anyhow::bail!("DATABASE_URL cannot be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
        }
        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!("DATABASE_MIN_CONNECTIONS cannot exceed DATABASE_MAX_CONNECTIONS");
        }
        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty, browsers will reject cross-origin calls");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
        }
    }
}
