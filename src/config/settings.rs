//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub provider: ProviderSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Authentication and session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// HMAC secret for signing session tokens
    pub jwt_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session validity window in hours
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Whether session cookies carry the Secure attribute
    #[serde(default)]
    pub cookie_secure: bool,
    /// Credits granted to every newly registered user
    #[serde(default = "default_starting_credits")]
    pub starting_credits: i32,
}

fn default_cookie_name() -> String {
    "auth_token".to_string()
}

fn default_session_ttl_hours() -> i64 {
    24
}

fn default_starting_credits() -> i32 {
    10
}

/// Image generation provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderSettings {
    /// Base URL of the generation API
    pub base_url: String,
    /// API key sent with every inference call
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model_version")]
    pub model_version: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_ms: u64,
}

fn default_model() -> String {
    "fal-ai/flux-pro".to_string()
}

fn default_model_version() -> String {
    "v1.1-ultra".to_string()
}

fn default_provider_timeout() -> u64 {
    120000
}

/// Durable object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom S3-compatible endpoint (e.g. Tigris, MinIO); AWS when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Lifetime of presigned retrieval URLs in hours
    #[serde(default = "default_url_ttl_hours")]
    pub url_ttl_hours: u64,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_url_ttl_hours() -> u64 {
    24
}

/// Rate limiting configuration for the generation endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_true() -> bool {
    true
}

fn default_rps() -> u32 {
    5
}

fn default_burst() -> u32 {
    10
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("auth.cookie_name", "auth_token")?
            .set_default("auth.session_ttl_hours", 24)?
            .set_default("auth.starting_credits", 10)?
            .set_default("rate_limit.enabled", true)?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (prefixed with IMAGEFORGE_)
            .add_source(
                Environment::with_prefix("IMAGEFORGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.database.url.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Database URL cannot be empty".to_string(),
            )));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "JWT secret cannot be empty".to_string(),
            )));
        }

        if self.auth.session_ttl_hours <= 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Session TTL must be positive".to_string(),
            )));
        }

        if self.auth.starting_credits < 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Starting credits cannot be negative".to_string(),
            )));
        }

        if self.provider.base_url.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Provider base URL cannot be empty".to_string(),
            )));
        }

        if self.storage.bucket.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Storage bucket cannot be empty".to_string(),
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            server: ServerSettings::default(),
            database: DatabaseSettings {
                url: "postgres://localhost/imageforge".to_string(),
                max_connections: default_max_connections(),
            },
            auth: AuthSettings {
                jwt_secret: "test-secret".to_string(),
                cookie_name: default_cookie_name(),
                session_ttl_hours: default_session_ttl_hours(),
                cookie_secure: false,
                starting_credits: default_starting_credits(),
            },
            provider: ProviderSettings {
                base_url: "https://fal.run".to_string(),
                api_key: "key".to_string(),
                model: default_model(),
                model_version: default_model_version(),
                timeout_ms: default_provider_timeout(),
            },
            storage: StorageSettings {
                bucket: "imageforge-assets".to_string(),
                region: default_region(),
                endpoint: None,
                url_ttl_hours: default_url_ttl_hours(),
            },
            rate_limit: RateLimitSettings::default(),
            logging: LoggingSettings::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let settings = test_settings();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.cookie_name, "auth_token");
        assert_eq!(settings.auth.session_ttl_hours, 24);
        assert_eq!(settings.auth.starting_credits, 10);
        assert_eq!(settings.storage.url_ttl_hours, 24);
        assert!(settings.rate_limit.enabled);
    }

    #[test]
    fn test_validate_accepts_complete_settings() {
        assert!(test_settings().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut settings = test_settings();
        settings.auth.jwt_secret = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut settings = test_settings();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nonpositive_ttl() {
        let mut settings = test_settings();
        settings.auth.session_ttl_hours = 0;
        assert!(settings.validate().is_err());
    }
}
