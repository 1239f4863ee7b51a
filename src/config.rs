use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::{DEFAULT_FETCH_INTERVAL_SECS, DEFAULT_PAGE_SIZE, MIN_FETCH_INTERVAL_SECS};
use crate::store::{Theme, UserPreferences};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the summarization backend.
    pub url: String,
    /// Account the session belongs to.
    pub user_id: String,
    /// Bearer token issued by the identity provider (optional for local dev).
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Emails per backend page and per pagination reveal step.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Starting preferences, used until a remotely stored copy is fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_true")]
    pub show_summaries: bool,
    #[serde(default = "default_fetch_interval_secs")]
    pub fetch_interval_secs: u64,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            show_summaries: true,
            fetch_interval_secs: default_fetch_interval_secs(),
            theme: Theme::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_fetch_interval_secs() -> u64 {
    DEFAULT_FETCH_INTERVAL_SECS
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("briefmail");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Preferences to start the session with, clamped to supported bounds.
    pub fn default_preferences(&self) -> UserPreferences {
        UserPreferences {
            show_summaries: self.preferences.show_summaries,
            fetch_interval_secs: self
                .preferences
                .fetch_interval_secs
                .max(MIN_FETCH_INTERVAL_SECS),
            theme: self.preferences.theme,
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at {}\n\
                 Run 'briefmail setup' or create one. Example:\n\n\
                 [backend]\n\
                 url = \"https://api.example.com\"\n\
                 user_id = \"you@example.com\"",
                path.display()
            );
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = path.parent().unwrap();

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn ensure_dirs() -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [backend]
            url = "https://api.example.com"
            user_id = "user@example.com"
            token = "abc123"

            [sync]
            page_size = 50

            [preferences]
            show_summaries = false
            fetch_interval_secs = 30
            theme = "dark"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend.url, "https://api.example.com");
        assert_eq!(config.backend.token, Some("abc123".to_string()));
        assert_eq!(config.sync.page_size, 50);
        assert!(!config.preferences.show_summaries);
        assert_eq!(config.preferences.fetch_interval_secs, 30);
        assert_eq!(config.preferences.theme, Theme::Dark);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let toml = r#"
            [backend]
            url = "https://api.example.com"
            user_id = "user@example.com"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend.token, None);
        assert_eq!(config.sync.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.preferences.show_summaries);
        assert_eq!(
            config.preferences.fetch_interval_secs,
            DEFAULT_FETCH_INTERVAL_SECS
        );
        assert_eq!(config.preferences.theme, Theme::System);
    }

    #[test]
    fn default_preferences_clamp_the_interval() {
        let config = Config {
            backend: BackendConfig {
                url: "https://api.example.com".to_string(),
                user_id: "user@example.com".to_string(),
                token: None,
            },
            sync: SyncConfig::default(),
            preferences: PreferencesConfig {
                show_summaries: true,
                fetch_interval_secs: 0,
                theme: Theme::System,
            },
        };

        let prefs = config.default_preferences();
        assert_eq!(prefs.fetch_interval_secs, MIN_FETCH_INTERVAL_SECS);
    }
}
