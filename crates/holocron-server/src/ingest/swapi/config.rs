//! Import pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL of the remote catalog API
pub const DEFAULT_BASE_URL: &str = "https://swapi.dev/api";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default maximum fetch attempts per page
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default HTTP status codes that trigger a retry
pub const DEFAULT_RETRYABLE_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Default number of records committed per transaction
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Remote catalog import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapiConfig {
    /// Base URL of the remote catalog API, without a trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum fetch attempts per page
    pub max_retries: u32,
    /// HTTP status codes that trigger a retry with backoff
    pub retryable_codes: Vec<u16>,
    /// Records committed per transaction by the chunked writer
    pub chunk_size: usize,
}

impl SwapiConfig {
    /// Load import settings from `SWAPI_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            base_url: std::env::var("SWAPI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: std::env::var("SWAPI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_retries: std::env::var("SWAPI_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_RETRIES),
            retryable_codes: std::env::var("SWAPI_RETRYABLE_CODES")
                .ok()
                .map(|s| {
                    s.split(',')
                        .filter_map(|code| code.trim().parse().ok())
                        .collect()
                })
                .unwrap_or_else(|| DEFAULT_RETRYABLE_CODES.to_vec()),
            chunk_size: std::env::var("SWAPI_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CHUNK_SIZE),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("SWAPI_BASE_URL cannot be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("SWAPI_TIMEOUT_SECS must be greater than 0");
        }
        if self.max_retries == 0 {
            anyhow::bail!("SWAPI_MAX_RETRIES must be greater than 0");
        }
        if self.retryable_codes.is_empty() {
            anyhow::bail!("SWAPI_RETRYABLE_CODES cannot be empty");
        }
        if self.chunk_size == 0 {
            anyhow::bail!("SWAPI_CHUNK_SIZE must be greater than 0");
        }
        Ok(())
    }

    /// Per-request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SwapiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retryable_codes: DEFAULT_RETRYABLE_CODES.to_vec(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = SwapiConfig::default();
        assert_eq!(config.base_url, "https://swapi.dev/api");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retryable_codes, vec![429, 500, 502, 503, 504]);
        assert_eq!(config.chunk_size, 100);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SwapiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_timeout_duration() {
        let config = SwapiConfig {
            timeout_secs: 25,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(25));
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let config = SwapiConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = SwapiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let config = SwapiConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_retryable_codes() {
        let config = SwapiConfig {
            retryable_codes: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let config = SwapiConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
