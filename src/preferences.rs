//! Runtime preferences layered over config.toml.
//!
//! Config values are the defaults; `prefs.toml` (written by the app when the
//! user changes something at runtime) overrides them. Writes go to
//! `prefs.toml` only, never to the config file.
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::theme::ThemeVariant;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid preferences file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Contents of `prefs.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct StoredPrefs {
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

// ============================================================================
// PreferenceManager
// ============================================================================

pub struct PreferenceManager {
    path: PathBuf,
    default_theme: ThemeVariant,
    stored: StoredPrefs,
}

impl PreferenceManager {
    /// Load `path` over the config defaults. A missing file is not an error;
    /// an unreadable one is logged and ignored so startup never fails on it.
    pub fn load(config: &Config, path: &Path) -> Self {
        let default_theme = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme in config, using dark");
            ThemeVariant::Dark
        });

        let stored = match read_stored(path) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                StoredPrefs::default()
            }
        };

        Self {
            path: path.to_path_buf(),
            default_theme,
            stored,
        }
    }

    /// Theme to start with: saved choice, else config, else dark.
    pub fn theme(&self) -> ThemeVariant {
        self.stored
            .theme
            .as_deref()
            .and_then(ThemeVariant::from_str_name)
            .unwrap_or(self.default_theme)
    }

    /// Remember the theme and persist it.
    pub fn set_theme(&mut self, theme: ThemeVariant) -> Result<(), PreferencesError> {
        self.stored.theme = Some(theme.key().to_string());
        let body = toml::to_string(&self.stored)?;
        atomic_write(&self.path, body.as_bytes())?;
        tracing::debug!(theme = theme.key(), "Saved theme preference");
        Ok(())
    }
}

fn read_stored(path: &Path) -> Result<StoredPrefs, PreferencesError> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(StoredPrefs::default()),
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredPrefs::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write via a uniquely named temp file and rename, so readers never see a partial file.
fn atomic_write(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", suffix));

    let result = (|| {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp_path, dst)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trendboard_prefs_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_from_config() {
        let dir = temp_dir("defaults");
        let config = Config {
            theme: "light".into(),
            ..Config::default()
        };
        let pm = PreferenceManager::load(&config, &dir.join("prefs.toml"));
        assert_eq!(pm.theme(), ThemeVariant::Light);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_config_theme_falls_back_to_dark() {
        let dir = temp_dir("unknown_theme");
        let config = Config {
            theme: "solarized".into(),
            ..Config::default()
        };
        let pm = PreferenceManager::load(&config, &dir.join("prefs.toml"));
        assert_eq!(pm.theme(), ThemeVariant::Dark);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_saved_theme_overrides_config_and_survives_reload() {
        let dir = temp_dir("round_trip");
        let path = dir.join("prefs.toml");
        let config = Config::default();

        let mut pm = PreferenceManager::load(&config, &path);
        assert_eq!(pm.theme(), ThemeVariant::Dark);
        pm.set_theme(ThemeVariant::Light).unwrap();
        assert_eq!(pm.theme(), ThemeVariant::Light);

        let reloaded = PreferenceManager::load(&config, &path);
        assert_eq!(reloaded.theme(), ThemeVariant::Light);
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "theme = \"light\"");

        // no temp files left behind
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = temp_dir("corrupt");
        let path = dir.join("prefs.toml");
        std::fs::write(&path, "theme = [").unwrap();
        let pm = PreferenceManager::load(&Config::default(), &path);
        assert_eq!(pm.theme(), ThemeVariant::Dark);
        std::fs::remove_dir_all(&dir).ok();
    }
}
