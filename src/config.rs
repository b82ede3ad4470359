//! Configuration file parser for ~/.config/trendboard/config.toml.
//!
//! The file is optional; a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::{BackoffPolicy, DEFAULT_API_ORIGIN, DEFAULT_YOUTUBE_COUNTRY};

/// Environment variable overriding `api_url`.
pub const API_URL_ENV: &str = "TRENDBOARD_API_URL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("HOME environment variable not set")]
    NoHome,
}

// ============================================================================
// Configuration
// ============================================================================

/// Application configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend origin; `/api` is appended by the client.
    pub api_url: String,

    /// "dark" or "light". A theme saved from inside the app takes precedence.
    pub theme: String,

    /// Country passed to the YouTube trending endpoint.
    pub youtube_country: String,

    pub request_timeout_secs: u64,

    /// Attempts for login and registration when the backend is unreachable.
    pub login_max_attempts: u32,

    /// First retry delay; doubled for each further retry.
    pub login_base_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_ORIGIN.to_string(),
            theme: "dark".to_string(),
            youtube_country: DEFAULT_YOUTUBE_COUNTRY.to_string(),
            request_timeout_secs: 30,
            login_max_attempts: 3,
            login_base_delay_ms: 1000,
        }
    }
}

const KNOWN_KEYS: [&str; 6] = [
    "api_url",
    "theme",
    "youtube_country",
    "request_timeout_secs",
    "login_max_attempts",
    "login_base_delay_ms",
];

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file: defaults
    /// - Invalid TOML or wrong value types: `ConfigError::Parse`
    /// - Larger than 1 MB: `ConfigError::TooLarge`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
                tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            api_url = %config.api_url,
            theme = %config.theme,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Pick the backend origin: command line, then environment, then this config.
    pub fn resolve_api_url(&self, cli: Option<&str>, env: Option<&str>) -> String {
        cli.or(env)
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.api_url)
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn login_backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            self.login_max_attempts,
            Duration::from_millis(self.login_base_delay_ms),
        )
    }
}

/// `~/.config/trendboard`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("trendboard"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("trendboard_config_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://127.0.0.1:5000");
        assert_eq!(config.theme, "dark");
        assert_eq!(config.youtube_country, "morocco");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.login_max_attempts, 3);
        assert_eq!(config.login_base_delay_ms, 1000);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/trendboard_test_nonexistent_config.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_temp("blank", "  \n\n ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let (dir, path) = write_temp("partial", "api_url = \"https://trends.example.org\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_url, "https://trends.example.org");
        assert_eq!(config.youtube_country, "morocco");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_url = "http://10.0.0.5:8000"
theme = "light"
youtube_country = "france"
request_timeout_secs = 10
login_max_attempts = 5
login_base_delay_ms = 250
"#;
        let (dir, path) = write_temp("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "light");
        assert_eq!(config.youtube_country, "france");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        let policy = config.login_backoff();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_temp("unknown", "theme = \"dark\"\napi_ulr = \"typo\"\n");
        assert_eq!(Config::load(&path).unwrap().theme, "dark");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_temp("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_temp("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_temp("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config {
            api_url: "http://file:1".into(),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_api_url(Some("http://cli:1"), Some("http://env:1")),
            "http://cli:1"
        );
        assert_eq!(config.resolve_api_url(None, Some("http://env:1")), "http://env:1");
        assert_eq!(config.resolve_api_url(None, None), "http://file:1");
        assert_eq!(config.resolve_api_url(None, Some("  ")), "http://file:1");
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
