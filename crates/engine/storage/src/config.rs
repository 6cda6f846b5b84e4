//! Storage configuration
//!
//! Decides where store files live. Loaded from
//! `{config_dir}/crossworld/storage.toml`; every field is optional.
//!
//! ```toml
//! cache_dir = "/var/tmp/crossworld"
//! extension = "asdata"
//! default_section = "common"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::key::sanitize_name;
use crate::Result;

/// Section used when a store is opened without one
pub const DEFAULT_SECTION: &str = "common";

/// File extension of store files
pub const DEFAULT_EXTENSION: &str = "asdata";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding store files (default: platform cache dir)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Extension appended to sanitized store names
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Section for unscoped keys when the caller gives none
    #[serde(default = "default_section")]
    pub default_section: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_section() -> String {
    DEFAULT_SECTION.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            extension: default_extension(),
            default_section: default_section(),
        }
    }
}

impl StorageConfig {
    /// Config with an explicit cache directory
    pub fn with_cache_dir<P: Into<PathBuf>>(cache_dir: P) -> Self {
        Self {
            cache_dir: Some(cache_dir.into()),
            ..Default::default()
        }
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("crossworld").join("storage.toml"))
    }

    /// Load config from the user config dir, or return default if absent or broken
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring storage config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded storage config from {}", path.display());
        Ok(config)
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the directory holding store files
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .map(|p| p.join("crossworld").join("storage"))
                .unwrap_or_else(|| PathBuf::from("cache").join("storage")),
        }
    }

    /// Backing file path for a store name (`{cache_dir}/{sanitized}.{extension}`)
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file_name = sanitize_name(name);
        let extension = self.extension.trim_start_matches('.');
        let file_name = if extension.is_empty() {
            file_name
        } else {
            format!("{}.{}", file_name, extension)
        };
        self.cache_dir().join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert!(config.cache_dir.is_none());
        assert_eq!(config.extension, "asdata");
        assert_eq!(config.default_section, "common");
    }

    #[test]
    fn test_path_for_sanitizes() {
        let config = StorageConfig::with_cache_dir("/tmp/store");
        assert_eq!(
            config.path_for("profile1"),
            PathBuf::from("/tmp/store/profile1.asdata")
        );
        assert_eq!(
            config.path_for("../evil name"),
            PathBuf::from("/tmp/store/___evil_name.asdata")
        );
    }

    #[test]
    fn test_extension_variants() {
        let mut config = StorageConfig::with_cache_dir("/tmp/store");
        config.extension = ".ini".to_string();
        assert_eq!(config.path_for("a"), PathBuf::from("/tmp/store/a.ini"));

        config.extension = String::new();
        assert_eq!(config.path_for("a"), PathBuf::from("/tmp/store/a"));
    }

    #[test]
    fn test_partial_toml() {
        let config = StorageConfig::from_toml_str("default_section = \"race\"").unwrap();
        assert_eq!(config.default_section, "race");
        assert_eq!(config.extension, "asdata");
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let result = StorageConfig::from_toml_str("extension = [");
        assert!(matches!(result, Err(crate::Error::ConfigParse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.toml");
        std::fs::write(&path, "cache_dir = \"/srv/saves\"\nextension = \"dat\"\n").unwrap();

        let config = StorageConfig::load_from(&path).unwrap();
        assert_eq!(config.cache_dir(), PathBuf::from("/srv/saves"));
        assert_eq!(config.path_for("x"), PathBuf::from("/srv/saves/x.dat"));
    }
}
