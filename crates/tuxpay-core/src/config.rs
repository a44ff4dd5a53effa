//! Application configuration management.
//!
//! This module handles loading and saving the admin client configuration:
//! the server URL, the display locale, the last email used to log in and
//! where remembered tokens are kept.
//!
//! Configuration is stored at `~/.config/tuxpay-admin/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::{FileStore, KeyringStore, MemoryStore, Session};
use crate::utils::locale::DEFAULT_LOCALE;

/// Application name used for config/data directory paths
const APP_NAME: &str = "tuxpay-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured server URL
pub const API_URL_ENV: &str = "TUXPAY_API_URL";

/// Server used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where remembered tokens are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    /// A plain file in the user's data directory
    #[default]
    File,
    /// The OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub locale: Option<String>,
    pub last_email: Option<String>,
    pub token_storage: TokenStorage,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding remembered token files
    pub fn token_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Server URL: `TUXPAY_API_URL`, then the config file, then the default.
    pub fn api_url(&self) -> String {
        self.api_url_with(std::env::var(API_URL_ENV).ok())
    }

    fn api_url_with(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(DEFAULT_LOCALE)
    }

    /// Build a session for the server at `api_url`, with the configured
    /// durable slot and an in-memory ephemeral slot, restored from storage.
    ///
    /// Remembered tokens are kept per server, so a token issued by one
    /// server is never offered to another.
    pub fn build_session(&self, api_url: &str) -> Result<Session> {
        self.build_session_in(&Self::token_dir()?, api_url)
    }

    fn build_session_in(&self, token_root: &Path, api_url: &str) -> Result<Session> {
        let ephemeral = MemoryStore::new();
        let mut session = match self.token_storage {
            TokenStorage::File => {
                Session::new(FileStore::new(token_root.join(server_key(api_url))), ephemeral)
            }
            TokenStorage::Keyring => Session::new(KeyringStore::new(server_key(api_url)), ephemeral),
        };
        session.load().context("Failed to load saved session")?;
        Ok(session)
    }
}

/// Filesystem-safe name identifying a server by scheme, host, port and path.
/// `http://LocalHost:8000/` and `http://localhost:8000` share a key.
pub fn server_key(api_url: &str) -> String {
    let normalized = match Url::parse(api_url.trim()) {
        Ok(url) => url.as_str().to_string(),
        Err(_) => api_url.trim().to_lowercase(),
    };
    normalized
        .trim_end_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}
