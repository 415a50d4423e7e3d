//! Configuration: credential, model and endpoint settings.
//!
//! Values are layered: built-in defaults, then `config.toml` from the
//! platform config directory (or `--config`), then environment variables,
//! then an explicit API key passed by the caller.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const MODEL_ENV: &str = "GFILESEARCH_MODEL";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    /// Directory search history exports are written to. `~` is expanded.
    pub export_dir: String,
    /// Delay between state polls while waiting for an upload to become active.
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 120,
            export_dir: ".".to_string(),
            poll_interval_secs: 2,
        }
    }
}

impl Config {
    /// Load from `path` (or the default location) and apply env overrides.
    /// Only the default file may be missing; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("invalid config file {}: {}", path.display(), e))
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(MODEL_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, api_key: Option<String>, model: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
    }

    /// Explicit key beats everything loaded so far.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::Configuration(format!(
                "Google API key is required. Set {} or pass --api-key.",
                API_KEY_ENV
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.export_dir).to_string())
    }
}

/// `<platform config dir>/gfilesearch/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gfilesearch").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_have_no_key() {
        let config = Config::default();
        assert!(!config.has_api_key());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(matches!(
            config.require_api_key(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "model = \"gemini-2.0-pro\"").unwrap();
        writeln!(file, "timeout_secs = 30").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.poll_interval_secs, 2);
    }

    #[test]
    fn malformed_file_is_a_configuration_error() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "timeout_secs = \"soon\"").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("typo.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "timeout_secs = 45").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(45));
    }

    #[test]
    fn overrides_ignore_blank_values() {
        let mut config = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };
        config.apply_overrides(Some("  ".into()), None);
        assert_eq!(config.api_key.as_deref(), Some("from-file"));

        config.apply_overrides(Some("from-env".into()), Some("gemini-x".into()));
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.model, "gemini-x");
    }

    #[test]
    fn explicit_key_wins() {
        let config = Config {
            api_key: Some("from-env".into()),
            ..Config::default()
        }
        .with_api_key(Some("explicit".into()));
        assert_eq!(config.require_api_key().unwrap(), "explicit");
    }

    #[test]
    fn export_dir_expands_tilde() {
        let config = Config {
            export_dir: "~/exports".into(),
            ..Config::default()
        };
        assert!(!config.export_dir().to_string_lossy().starts_with('~'));
    }
}
