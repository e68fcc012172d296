//! Runtime configuration read from a TOML file, with environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::ResolvePolicy,
    store::{BlobStore, FileStore, Store},
    weatherapi::DEFAULT_BASE_URL,
};

pub const API_KEY_ENV: &str = "API_KEY";
pub const BLOB_CONTAINER_ENV: &str = "AZURE_STORAGE_SAS_URL";
/// Longest backfill accepted, roughly ten years.
pub const MAX_BACKFILL_DAYS: u64 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WeatherAPI.com key
    pub api_key: Option<String>,

    pub base_url: String,

    /// Cities requested on every update, in order
    pub cities: Vec<String>,

    /// Location key that is always present once data exists
    pub anchor_location: String,

    /// Maximum number of days an update reaches back
    pub backfill_days: u64,

    /// Hour from which today's noon observation is requested
    pub cutoff_hour: u32,

    pub log_file: PathBuf,

    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    File {
        path: PathBuf,
    },
    Blob {
        /// Container URL including its SAS token
        container_url: String,
        #[serde(default = "default_blob_name")]
        blob_name: String,
    },
}

fn default_blob_name() -> String {
    "data.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File {
            path: PathBuf::from("data.json"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cities: ["Stockholm", "London", "New York", "Los Angeles", "New Delhi", "Tokyo"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            anchor_location: "Stockholm, Sweden".to_string(),
            backfill_days: 7,
            cutoff_hour: 12,
            log_file: PathBuf::from("weather_log.log"),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Default location: `<config dir>/wxhist/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wxhist").join("config.toml"))
    }

    /// Reads `path` (or the default path) and applies environment overrides.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            _ => Config::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }

        if let Some(container_url) = var(BLOB_CONTAINER_ENV).filter(|u| !u.is_empty()) {
            let blob_name = match &self.storage {
                StorageConfig::Blob { blob_name, .. } => blob_name.clone(),
                StorageConfig::File { .. } => default_blob_name(),
            };
            self.storage = StorageConfig::Blob {
                container_url,
                blob_name,
            };
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cities.is_empty() {
            bail!("cities: at least one city is required");
        }
        if !(1..=MAX_BACKFILL_DAYS).contains(&self.backfill_days) {
            bail!(
                "backfill_days: must be between 1 and {}, got {}",
                MAX_BACKFILL_DAYS,
                self.backfill_days
            );
        }
        if self.cutoff_hour > 23 {
            bail!("cutoff_hour: must be between 0 and 23, got {}", self.cutoff_hour);
        }
        if self.anchor_location.trim().is_empty() {
            bail!("anchor_location: must not be empty");
        }
        Ok(())
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .with_context(|| format!("No API key configured; set `api_key` or {}", API_KEY_ENV))
    }

    pub fn policy(&self) -> ResolvePolicy {
        ResolvePolicy {
            anchor: self.anchor_location.clone(),
            backfill_days: self.backfill_days,
            cutoff_hour: self.cutoff_hour,
        }
    }

    pub fn store(&self) -> Result<Store> {
        Ok(match &self.storage {
            StorageConfig::File { path } => Store::File(FileStore::new(path)),
            StorageConfig::Blob {
                container_url,
                blob_name,
            } => Store::Blob(BlobStore::new(container_url, blob_name)?),
        })
    }
}

// -- Tests -------------------------------------------------------------------
