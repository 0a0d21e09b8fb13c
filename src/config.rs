use anyhow::{Context, Result};
use directories::ProjectDirs;
use keyring::Entry;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use sumo_search::encode_token;

pub const APP_NAME: &str = "sumosearch";
pub const KEYRING_USER: &str = "access_key";
pub const DEFAULT_TIME_ZONE: &str = "UTC";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub endpoint: String,
    pub access_id: String,
    pub access_key: String,
    /// Pre-encoded Basic token; wins over the id/key pair when set.
    pub token: String,
    pub time_zone: Option<String>,
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // 1. Config file
        if let Some(config_path) = config_path() {
            if config_path.exists() {
                info!("Loading config from: {:?}", config_path);
                let content = std::fs::read_to_string(&config_path)
                    .context(format!("Failed to read config file at {:?}", config_path))?;

                match toml::from_str::<FileConfig>(&content) {
                    Ok(file_config) => config.merge(file_config),
                    Err(e) => warn!("Failed to parse config.toml: {}", e),
                }
            }
        }

        // 2. Keyring, only when the file left the key out
        if config.access_key.is_empty() {
            if let Ok(entry) = Entry::new(APP_NAME, KEYRING_USER) {
                if let Ok(password) = entry.get_password() {
                    config.access_key = password;
                }
            }
        }

        // 3. Environment overrides everything above
        config.apply_env(|key| env::var(key).ok());

        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SUMO_ENDPOINT") {
            self.endpoint = val;
        }
        if let Some(val) = lookup("SUMO_ACCESS_ID") {
            self.access_id = val;
        }
        if let Some(val) = lookup("SUMO_ACCESS_KEY") {
            self.access_key = val;
        }
        if let Some(val) = lookup("SUMO_TOKEN") {
            self.token = val;
        }
        if let Some(val) = lookup("SUMO_TIME_ZONE") {
            self.time_zone = Some(val);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            anyhow::bail!("Sumo Logic endpoint is not configured.\nRun 'sumosearch config' to set up your credentials.");
        }
        if self.token.is_empty() && (self.access_id.is_empty() || self.access_key.is_empty()) {
            anyhow::bail!("Sumo Logic access id/key are not configured.\nRun 'sumosearch config' to set up your credentials.");
        }
        Ok(())
    }

    /// Basic token to send, encoding the id/key pair unless a token was given.
    pub fn token(&self) -> String {
        if !self.token.is_empty() {
            return self.token.clone();
        }
        encode_token(&self.access_id, &self.access_key)
    }

    pub fn time_zone(&self) -> &str {
        self.time_zone.as_deref().unwrap_or(DEFAULT_TIME_ZONE)
    }
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub access_id: Option<String>,
    pub access_key: Option<String>,
    pub token: Option<String>,
    pub time_zone: Option<String>,
}

impl FileConfig {
    /// Existing file contents, or an empty config when absent or unreadable.
    pub fn read_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file at {:?}", path))?;
        Ok(toml::from_str(&content).unwrap_or_default())
    }
}

impl Config {
    pub(crate) fn merge(&mut self, other: FileConfig) {
        if let Some(v) = other.endpoint {
            self.endpoint = v;
        }
        if let Some(v) = other.access_id {
            self.access_id = v;
        }
        if let Some(v) = other.access_key {
            self.access_key = v;
        }
        if let Some(v) = other.token {
            self.token = v;
        }
        if let Some(v) = other.time_zone {
            self.time_zone = Some(v);
        }
    }
}
