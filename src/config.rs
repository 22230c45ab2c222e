//! Configuration module for dropkey.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{DropkeyError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = permissive dev mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage directory holding all live files. Relative paths are
    /// resolved against the process working directory.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    /// Maximum upload size per file in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

impl StorageConfig {
    /// The storage directory as an absolute path.
    pub fn resolved_dir(&self) -> PathBuf {
        let path = Path::new(&self.dir);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

/// File retention configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Age limit in seconds after which a stored file is swept.
    #[serde(default = "default_age_limit")]
    pub age_limit_secs: u64,
    /// Interval in seconds between sweep runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_age_limit() -> u64 {
    3600 // 1 hour
}

fn default_sweep_interval() -> u64 {
    300 // 5 minutes
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            age_limit_secs: default_age_limit(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Rate limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds for both limits.
    #[serde(default = "default_rate_window")]
    pub window_secs: u64,
    /// Upload requests allowed per IP per window.
    #[serde(default = "default_upload_limit")]
    pub upload_limit: u32,
    /// Download requests allowed per IP per window.
    #[serde(default = "default_download_limit")]
    pub download_limit: u32,
}

fn default_rate_window() -> u64 {
    300 // 5 minutes
}

fn default_upload_limit() -> u32 {
    5
}

fn default_download_limit() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_rate_window(),
            upload_limit: default_upload_limit(),
            download_limit: default_download_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file (empty = console only).
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// File retention configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Rate limit configuration.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DropkeyError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DropkeyError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DROPKEY_STORAGE_DIR`: Override the storage directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("DROPKEY_STORAGE_DIR") {
            if !dir.is_empty() {
                self.storage.dir = dir;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.dir.is_empty() {
            return Err(DropkeyError::Config(
                "storage.dir must not be empty".to_string(),
            ));
        }
        if self.retention.sweep_interval_secs == 0 {
            return Err(DropkeyError::Config(
                "retention.sweep_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.rate_limits.window_secs == 0 {
            return Err(DropkeyError::Config(
                "rate_limits.window_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.cors_origins.is_empty());

        assert_eq!(config.storage.dir, "uploads");
        assert_eq!(config.storage.max_upload_size_mb, 10);

        assert_eq!(config.retention.age_limit_secs, 3600);
        assert_eq!(config.retention.sweep_interval_secs, 300);

        assert_eq!(config.rate_limits.window_secs, 300);
        assert_eq!(config.rate_limits.upload_limit, 5);
        assert_eq!(config.rate_limits.download_limit, 10);

        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
cors_origins = ["http://localhost:5173"]

[storage]
dir = "custom/files"
max_upload_size_mb = 20

[retention]
age_limit_secs = 7200
sweep_interval_secs = 60

[rate_limits]
window_secs = 120
upload_limit = 3
download_limit = 6

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins.len(), 1);

        assert_eq!(config.storage.dir, "custom/files");
        assert_eq!(config.storage.max_upload_size_mb, 20);
        assert_eq!(config.storage.max_upload_size_bytes(), 20 * 1024 * 1024);

        assert_eq!(config.retention.age_limit_secs, 7200);
        assert_eq!(config.retention.sweep_interval_secs, 60);

        assert_eq!(config.rate_limits.window_secs, 120);
        assert_eq!(config.rate_limits.upload_limit, 3);
        assert_eq!(config.rate_limits.download_limit, 6);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 4000

[storage]
dir = "drop"
"#;

        let config = Config::parse(toml).unwrap();

        // Specified values
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.storage.dir, "drop");

        // Default values
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.retention.age_limit_secs, 3600);
        assert_eq!(config.rate_limits.upload_limit, 5);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.dir, "uploads");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(DropkeyError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(result.is_err());
        assert!(matches!(result, Err(DropkeyError::Io(_))));
    }

    #[test]
    fn test_resolved_dir_absolute() {
        let config = StorageConfig {
            dir: "/var/lib/dropkey/uploads".to_string(),
            max_upload_size_mb: 10,
        };
        assert_eq!(
            config.resolved_dir(),
            PathBuf::from("/var/lib/dropkey/uploads")
        );
    }

    #[test]
    fn test_resolved_dir_relative() {
        let config = StorageConfig::default();
        let resolved = config.resolved_dir();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("uploads"));
    }

    #[test]
    fn test_apply_env_overrides_storage_dir() {
        // Both cases in one test: env access is process-global and must not
        // interleave with another test mutating the same variable.
        let original = std::env::var("DROPKEY_STORAGE_DIR").ok();

        std::env::set_var("DROPKEY_STORAGE_DIR", "/tmp/dropkey-env");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.storage.dir, "/tmp/dropkey-env");

        // An empty value does not override the configured directory.
        std::env::set_var("DROPKEY_STORAGE_DIR", "");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.storage.dir, "uploads");

        if let Some(val) = original {
            std::env::set_var("DROPKEY_STORAGE_DIR", val);
        } else {
            std::env::remove_var("DROPKEY_STORAGE_DIR");
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_storage_dir() {
        let mut config = Config::default();
        config.storage.dir = String::new();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(DropkeyError::Config(msg)) = result {
            assert!(msg.contains("storage.dir"));
        }
    }

    #[test]
    fn test_validate_zero_sweep_interval() {
        let mut config = Config::default();
        config.retention.sweep_interval_secs = 0;

        assert!(config.validate().is_err());
    }
}
