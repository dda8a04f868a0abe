//! Configuration loading and validation.

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::fetch::opendota::OpenDotaConfig;
use crate::fetch::stratz::StratzConfig;
use crate::fetch::RetryPolicy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Missing credential: set {0}")]
    MissingCredential(String),

    #[error("Invalid credential in {0}: not usable as an HTTP header")]
    InvalidCredential(String),
}

/// Stratz (primary source) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratzSection {
    #[serde(default = "default_stratz_url")]
    pub base_url: String,

    /// Matches requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Minimum spacing between requests
    #[serde(default = "default_stratz_rate_limit")]
    pub rate_limit_ms: u64,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_stratz_url() -> String {
    "https://api.stratz.com/api/v1".to_string()
}

fn default_page_size() -> usize {
    250
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_stratz_rate_limit() -> u64 {
    250
}

fn default_token_env() -> String {
    "STRATZ_TOKEN".to_string()
}

impl Default for StratzSection {
    fn default() -> Self {
        Self {
            base_url: default_stratz_url(),
            page_size: default_page_size(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            rate_limit_ms: default_stratz_rate_limit(),
            token_env: default_token_env(),
        }
    }
}

impl StratzSection {
    /// Resolve the bearer token from the environment.
    pub fn client_config(&self) -> Result<StratzConfig, ConfigError> {
        let token = std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential(self.token_env.clone()))?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| ConfigError::InvalidCredential(self.token_env.clone()))?;
        authorization.set_sensitive(true);

        Ok(StratzConfig {
            base_url: self.base_url.clone(),
            authorization,
            page_size: self.page_size,
            timeout: Duration::from_secs(self.timeout_seconds),
            retry: RetryPolicy::with_max_retries(self.max_retries),
            rate_limit: Duration::from_millis(self.rate_limit_ms),
        })
    }
}

/// OpenDota (secondary source) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDotaSection {
    #[serde(default = "default_opendota_url")]
    pub base_url: String,

    /// Minimum spacing between requests
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Environment variable holding an optional API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_opendota_url() -> String {
    "https://api.opendota.com/api".to_string()
}

fn default_rate_limit() -> u64 {
    2000
}

fn default_api_key_env() -> String {
    "OPENDOTA_API_KEY".to_string()
}

impl Default for OpenDotaSection {
    fn default() -> Self {
        Self {
            base_url: default_opendota_url(),
            rate_limit_ms: default_rate_limit(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl OpenDotaSection {
    pub fn client_config(&self) -> OpenDotaConfig {
        OpenDotaConfig {
            base_url: self.base_url.clone(),
            api_key: std::env::var(&self.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(self.timeout_seconds),
            retry: RetryPolicy::with_max_retries(self.max_retries),
            rate_limit: Duration::from_millis(self.rate_limit_ms),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Report filter defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Regions used when a request names none
    #[serde(default = "default_regions")]
    pub default_regions: Vec<i32>,
}

fn default_regions() -> Vec<i32> {
    vec![3, 8, 9]
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_regions: default_regions(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_league_id")]
    pub league_id: u32,

    #[serde(default = "default_heroes_path")]
    pub heroes_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub stratz: StratzSection,

    #[serde(default)]
    pub opendota: OpenDotaSection,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

fn default_league_id() -> u32 {
    13824
}

fn default_heroes_path() -> PathBuf {
    PathBuf::from("./data/heroes.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            league_id: default_league_id(),
            heroes_path: default_heroes_path(),
            log_level: default_log_level(),
            stratz: StratzSection::default(),
            opendota: OpenDotaSection::default(),
            server: ServerConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stratz.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "Stratz page size must be greater than 0".to_string(),
            ));
        }

        if self.stratz.timeout_seconds == 0 || self.opendota.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Provider timeouts must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
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
        let config = AppConfig::default();

        assert_eq!(config.league_id, 13824);
        assert_eq!(config.heroes_path, PathBuf::from("./data/heroes.json"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.stratz.page_size, 250);
        assert_eq!(config.stratz.rate_limit_ms, 250);
        assert_eq!(config.opendota.rate_limit_ms, 2000);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.report.default_regions, vec![3, 8, 9]);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_page_size() {
        let mut config = AppConfig::default();
        config.stratz.page_size = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
league_id = 14268

[opendota]
rate_limit_ms = 1000

[report]
default_regions = [1, 2]
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();

        assert_eq!(config.league_id, 14268);
        assert_eq!(config.opendota.rate_limit_ms, 1000);
        assert_eq!(config.opendota.base_url, "https://api.opendota.com/api");
        assert_eq!(config.report.default_regions, vec![1, 2]);
        assert_eq!(config.stratz.page_size, 250);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.league_id, 13824);
    }

    #[test]
    fn test_missing_stratz_token() {
        let section = StratzSection {
            token_env: "LEAGUE_STATS_TEST_UNSET_TOKEN".to_string(),
            ..Default::default()
        };

        let err = section.client_config().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(ref v) if v == "LEAGUE_STATS_TEST_UNSET_TOKEN"));
    }

    #[test]
    fn test_stratz_token_builds_bearer_header() {
        std::env::set_var("LEAGUE_STATS_TEST_GOOD_TOKEN", "abc123");
        let section = StratzSection {
            token_env: "LEAGUE_STATS_TEST_GOOD_TOKEN".to_string(),
            ..Default::default()
        };

        let config = section.client_config().unwrap();
        assert_eq!(config.authorization, "Bearer abc123");
        assert!(config.authorization.is_sensitive());
        assert_eq!(config.rate_limit, Duration::from_millis(250));
    }

    #[test]
    fn test_unusable_stratz_token() {
        std::env::set_var("LEAGUE_STATS_TEST_BAD_TOKEN", "abc\u{7f}def");
        let section = StratzSection {
            token_env: "LEAGUE_STATS_TEST_BAD_TOKEN".to_string(),
            ..Default::default()
        };

        let err = section.client_config().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCredential(ref v) if v == "LEAGUE_STATS_TEST_BAD_TOKEN"));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.heroes_path, parsed.heroes_path);
        assert_eq!(config.report.default_regions, parsed.report.default_regions);
    }
}
