// TOML config adapter - Configuration management using TOML files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{EmbedderConfig, DEFAULT_CONFIG_FILE};
use crate::error::{EmbedError, EmbedResult};

/// TOML configuration adapter
#[derive(Debug, Clone, Default)]
pub struct TomlConfigAdapter {
    explicit_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Adapter reading `explicit_path`, or the default file when `None`
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self { explicit_path }
    }

    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// File that would be read, if any.
    ///
    /// An explicit path is always returned; the default file only when it exists.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.explicit_path {
            Some(path) => Some(path.clone()),
            None => {
                let default = Self::default_config_path();
                default.is_file().then_some(default)
            }
        }
    }

    /// Load configuration; defaults when no file applies
    pub fn load(&self) -> EmbedResult<EmbedderConfig> {
        match self.config_path() {
            Some(path) => Self::load_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(EmbedderConfig::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> EmbedResult<EmbedderConfig> {
        if !path.is_file() {
            return Err(EmbedError::InvalidConfig {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| EmbedError::InvalidConfig {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        info!("Loading configuration from: {}", path.display());
        EmbedderConfig::from_toml_str(&content).map_err(|e| EmbedError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CollisionPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[output]\ncollision = \"fail\"\nmax_versions = 5\n").unwrap();

        let config = TomlConfigAdapter::new(Some(path)).load().unwrap();
        assert_eq!(config.output.collision, CollisionPolicy::Fail);
        assert_eq!(config.output.max_versions, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let adapter = TomlConfigAdapter::new(Some(dir.path().join("absent.toml")));
        assert!(matches!(adapter.load(), Err(EmbedError::InvalidConfig { .. })));
    }
}
