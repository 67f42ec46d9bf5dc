//! Configuration
//!
//! YAML-backed settings for the CLI: where the catalog API lives, where the
//! key-value store file sits, and the default listing page size. A missing
//! config file means the defaults the storefront pages hard-coded.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid YAML for this shape.
    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the catalog API.
    pub api_base_url: String,

    /// Path of the key-value store file holding the cart.
    pub storage_path: PathBuf,

    /// Default page size for product listings.
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            storage_path: PathBuf::from("homestore-store.json"),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Reads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_norway::from_str(&contents)?)
    }

    /// Reads configuration from a YAML file, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an existing file cannot be read or
    /// parsed. An absent file is not an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }
}
