//! Service configuration
//!
//! Layered with figment: built-in defaults, then an optional YAML file, then
//! `CALCSRV_` environment variables (`__` separates sections, e.g.
//! `CALCSRV_SERVER__PORT=8080`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CalcSrvError, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CONFIG_PATH: &str = "config/calcsrv.yaml";
pub const ENV_PREFIX: &str = "CALCSRV_";
pub const ENV_CONFIG_FILE: &str = "CALCSRV_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcSrvConfig {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request bodies above this size are rejected with 413
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: 16 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    #[serde(default = "common::serde_helpers::bool_true")]
    pub enabled: bool,
    /// Requests allowed per client within one window
    pub max_requests: usize,
    pub window_secs: u64,
    /// How often idle clients are dropped from the limiter
    pub prune_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
            prune_interval_secs: 300,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(default = "common::serde_helpers::bool_true")]
    pub enabled: bool,
    pub ttl_secs: u64,
    /// Upper bound on in-memory entries; 0 means unbounded
    pub max_entries: usize,
    pub purge_interval_secs: u64,
    /// Shared Redis tier, used only when built with the `redis` feature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_entries: 10_000,
            purge_interval_secs: 60,
            redis_url: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling log files; console only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default = "common::serde_helpers::bool_false")]
    pub json: bool,
    /// Split `api_access` events into their own file
    #[serde(default = "common::serde_helpers::bool_true")]
    pub api_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
            api_log: true,
        }
    }
}

impl CalcSrvConfig {
    /// Load configuration
    ///
    /// File lookup order: `path`, then `$CALCSRV_CONFIG`, then
    /// `config/calcsrv.yaml` if it exists. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG_FILE).map(PathBuf::from));

        let file = match explicit {
            Some(file) if !file.exists() => {
                return Err(CalcSrvError::Config(format!(
                    "Config file not found: {}",
                    file.display()
                )));
            },
            Some(file) => Some(file),
            None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|p| p.exists()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = &file {
            tracing::debug!("Loading config file: {}", file.display());
            figment = figment.merge(Yaml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(CalcSrvError::Config("server.port cannot be 0".to_string()));
        }
        if self.server.host.trim().is_empty() {
            return Err(CalcSrvError::Config("server.host cannot be empty".to_string()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(CalcSrvError::Config(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit.enabled {
            if self.rate_limit.max_requests == 0 {
                return Err(CalcSrvError::Config(
                    "rate_limit.max_requests must be greater than 0".to_string(),
                ));
            }
            if self.rate_limit.window_secs == 0 {
                return Err(CalcSrvError::Config(
                    "rate_limit.window_secs must be greater than 0".to_string(),
                ));
            }
        }

        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(CalcSrvError::Config(
                "cache.ttl_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = CalcSrvConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(60));
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 8088\nrate_limit:\n  max_requests: 5\ncache:\n  enabled: false"
        )
        .unwrap();

        let config = CalcSrvConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert!(!config.cache.enabled);
        assert!(config.logging.api_log);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let err = CalcSrvConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, CalcSrvError::Config(_)));
    }

    #[test]
    fn test_invalid_yaml_value_is_an_error() {
        let figment = Figment::from(Serialized::defaults(CalcSrvConfig::default()))
            .merge(Yaml::string("server:\n  port: not-a-port"));
        assert!(matches!(
            CalcSrvConfig::from_figment(figment),
            Err(CalcSrvError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = CalcSrvConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = CalcSrvConfig::default();
        config.rate_limit.window_secs = 0;
        assert!(config.validate().is_err());

        // A disabled limiter may carry any window
        config.rate_limit.enabled = false;
        assert!(config.validate().is_ok());

        let mut config = CalcSrvConfig::default();
        config.cache.ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = CalcSrvConfig::default();
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }
}
