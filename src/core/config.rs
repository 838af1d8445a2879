use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::core::api::DEFAULT_HOST;
use crate::core::window::{TimestampZone, MAX_DAYS};

pub const TOKEN_ENV: &str = "ZAI_TOKEN";
pub const HOST_ENV: &str = "Z_AI_API_HOST";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),
    #[error("ZAI_TOKEN is not set. Export it or add `token` under [api] in the config file")]
    MissingToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_timestamps")]
    pub timestamps: String,
}

fn default_color() -> String {
    "auto".to_string()
}
fn default_days() -> u32 {
    7
}
fn default_timestamps() -> String {
    "local".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: default_color(),
            days: default_days(),
            timestamps: default_timestamps(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("zusage").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `Z_AI_API_HOST` over the configured host.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var(HOST_ENV) {
            if !host.is_empty() {
                self.api.host = host;
            }
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if !(1..=MAX_DAYS).contains(&self.settings.days) {
            issues.push(format!(
                "Invalid days: {} (must be between 1 and {})",
                self.settings.days, MAX_DAYS
            ));
        }
        if TimestampZone::from_id(&self.settings.timestamps).is_none() {
            issues.push(format!(
                "Invalid timestamps: '{}' (must be 'local' or 'utc')",
                self.settings.timestamps
            ));
        }
        if self.api.host.trim().is_empty() || self.api.host.contains("://") {
            issues.push(format!(
                "Invalid api.host: '{}' (expected a bare host name such as '{}')",
                self.api.host, DEFAULT_HOST
            ));
        }
        if self.api.timeout_secs == 0 {
            issues.push("Invalid api.timeout_secs: 0 (must be at least 1)".to_string());
        }
        issues
    }

    /// `validate()` as a `Result`.
    pub fn check(&self) -> Result<(), ConfigError> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    pub fn timestamp_zone(&self) -> TimestampZone {
        TimestampZone::from_id(&self.settings.timestamps).unwrap_or_default()
    }

    /// Bearer token from `ZAI_TOKEN`, else from the config file.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        Self::pick_token(std::env::var(TOKEN_ENV).ok(), self.api.token.as_deref())
    }

    fn pick_token(env: Option<String>, file: Option<&str>) -> Result<String, ConfigError> {
        env.filter(|t| !t.trim().is_empty())
            .or_else(|| file.filter(|t| !t.trim().is_empty()).map(str::to_string))
            .ok_or(ConfigError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
        assert!(config.check().is_ok());
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.settings.color, "auto");
        assert_eq!(config.settings.days, 7);
        assert_eq!(config.timestamp_zone(), TimestampZone::Local);
        assert_eq!(config.api.host, "api.z.ai");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.api.token.is_none());
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_zero_days() {
        let mut config = AppConfig::default();
        config.settings.days = 0;
        assert!(config.validate().iter().any(|i| i.contains("days")));
    }

    #[test]
    fn validate_catches_oversized_days() {
        let mut config = AppConfig::default();
        config.settings.days = MAX_DAYS;
        assert!(config.validate().is_empty());
        config.settings.days = 200_000_000;
        assert!(config.validate().iter().any(|i| i.contains("days")));
    }

    #[test]
    fn validate_catches_invalid_timestamps() {
        let mut config = AppConfig::default();
        config.settings.timestamps = "gmt".to_string();
        assert!(config.validate().iter().any(|i| i.contains("timestamps")));
    }

    #[test]
    fn validate_catches_host_with_scheme() {
        let mut config = AppConfig::default();
        config.api.host = "http://api.z.ai".to_string();
        assert!(config.validate().iter().any(|i| i.contains("api.host")));
    }

    #[test]
    fn check_reports_every_issue() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        config.api.timeout_secs = 0;
        let err = config.check().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("color"));
        assert!(msg.contains("timeout_secs"));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[settings]
days = 14
timestamps = "utc"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.days, 14);
        assert_eq!(config.settings.color, "auto");
        assert_eq!(config.timestamp_zone(), TimestampZone::Utc);
        assert_eq!(config.api.host, "api.z.ai");
    }

    #[test]
    fn parse_api_toml() {
        let toml = r#"
[api]
host = "open.bigmodel.cn"
token = "abc"
timeout_secs = 5
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api.host, "open.bigmodel.cn");
        assert_eq!(config.api.token.as_deref(), Some("abc"));
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.days, 7);
        assert_eq!(config.settings.timestamps, "local");
    }

    #[test]
    fn token_prefers_env() {
        let token = AppConfig::pick_token(Some("env".into()), Some("file")).unwrap();
        assert_eq!(token, "env");
    }

    #[test]
    fn token_falls_back_to_file() {
        let token = AppConfig::pick_token(None, Some("file")).unwrap();
        assert_eq!(token, "file");
        let token = AppConfig::pick_token(Some("  ".into()), Some("file")).unwrap();
        assert_eq!(token, "file");
    }

    #[test]
    fn missing_token_is_error() {
        let err = AppConfig::pick_token(None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
        assert!(err.to_string().contains("ZAI_TOKEN"));
        assert!(AppConfig::pick_token(None, Some("")).is_err());
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, PathBuf::from("/tmp/test_xdg_config/zusage/config.toml"));
    }
}
