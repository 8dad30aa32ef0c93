//! TOML-loadable configuration with defaults for every field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{persist::MetafieldKey, runtime::handle::RuntimeConfig};

/// Catalogs list at most this many media per product by default.
pub const DEFAULT_MEDIA_PAGE_SIZE: usize = 50;

/// Configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("reading {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Config text is not valid TOML for [`GalleryConfig`].
    #[error("parsing config: {0}")]
    Toml(#[from] toml::de::Error),
    /// Parsed but unusable values.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Metafield slot holding the persisted map.
    pub metafield: MetafieldKey,
    /// Media nodes fetched per product for the read endpoint.
    pub media_page_size: usize,
    /// Editor runtime queue sizing.
    pub runtime: RuntimeConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            metafield: MetafieldKey::default(),
            media_page_size: DEFAULT_MEDIA_PAGE_SIZE,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Parses and validates TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.metafield.namespace.trim().is_empty() || self.metafield.key.trim().is_empty() {
            return Err(ConfigError::Invalid("metafield namespace and key must be non-empty".to_string()));
        }
        if self.media_page_size == 0 {
            return Err(ConfigError::Invalid("media_page_size must be positive".to_string()));
        }
        if self.runtime.command_queue_bound == 0 || self.runtime.event_queue_bound == 0 {
            return Err(ConfigError::Invalid("runtime queue bounds must be positive".to_string()));
        }
        Ok(())
    }
}
