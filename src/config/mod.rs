//! Configuration types and environment overrides

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::model::SubtitleStyle;
use crate::engine::progress::DEFAULT_TAIL_LINES;
use crate::error::{EmbedError, EmbedResult};
use crate::output::OutputSettings;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dualsub.toml";

pub const ENV_ENGINE: &str = "DUALSUB_ENGINE";
pub const ENV_OUTPUT_DIR: &str = "DUALSUB_OUTPUT_DIR";
pub const ENV_LOG_LEVEL: &str = "DUALSUB_LOG_LEVEL";
pub const ENV_COLLISION_POLICY: &str = "DUALSUB_COLLISION_POLICY";

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// General information
    Info,
    /// Debug information
    Debug,
    /// Very verbose debug information
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(EmbedError::InvalidConfig {
                message: format!(
                    "Invalid log level: {}. Valid levels: error, warn, info, debug, trace",
                    s
                ),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Explicit engine executable; searched on PATH when unset
    pub path: Option<PathBuf>,
}

/// Failure report settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Engine diagnostic lines kept for failure reports
    pub tail_lines: usize,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json: false,
        }
    }
}

/// Complete embedder configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub engine: EngineSettings,
    pub output: OutputSettings,
    pub style: SubtitleStyle,
    pub diagnostics: DiagnosticsSettings,
    pub logging: LoggingSettings,
}

impl EmbedderConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> EmbedResult<Self> {
        toml::from_str(content).map_err(|e| EmbedError::InvalidConfig {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    /// Apply `DUALSUB_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> EmbedResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        if let Some(value) = lookup(ENV_ENGINE).filter(|v| !v.trim().is_empty()) {
            info!("Found environment override: {} = {}", ENV_ENGINE, value);
            self.engine.path = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.trim().is_empty()) {
            info!("Found environment override: {} = {}", ENV_OUTPUT_DIR, value);
            self.output.dir = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = value.parse()?;
            applied += 1;
        }
        if let Some(value) = lookup(ENV_COLLISION_POLICY).filter(|v| !v.trim().is_empty()) {
            self.output.collision = value.parse()?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> EmbedResult<()> {
        self.style.validate().map_err(|e| EmbedError::InvalidConfig {
            message: e.to_string(),
        })?;

        if self.output.extension.trim().is_empty() || self.output.extension.contains('.') {
            return Err(EmbedError::InvalidConfig {
                message: format!("Invalid output extension: {:?}", self.output.extension),
            });
        }
        if self.output.suffix.contains(std::path::is_separator) {
            return Err(EmbedError::InvalidConfig {
                message: format!("Output suffix cannot contain a path separator: {:?}", self.output.suffix),
            });
        }
        if self.output.max_versions == 0 {
            return Err(EmbedError::InvalidConfig {
                message: "output.max_versions must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CollisionPolicy;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EmbedderConfig::from_toml_str(
            r#"
            [output]
            collision = "fail"

            [style]
            font_size = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.output.collision, CollisionPolicy::Fail);
        assert_eq!(config.output.suffix, "_dual_subbed");
        assert_eq!(config.style.font_size, 30);
        assert_eq!(config.style.vertical_offset_top, 60);
        assert_eq!(config.diagnostics.tail_lines, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_toml_is_invalid_config() {
        let result = EmbedderConfig::from_toml_str("[output\ncollision = ");
        assert!(matches!(result, Err(EmbedError::InvalidConfig { .. })));

        let result = EmbedderConfig::from_toml_str("[output]\ncollision = \"sometimes\"");
        assert!(matches!(result, Err(EmbedError::InvalidConfig { .. })));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = EmbedderConfig::from_toml_str(
            "[output]\ndir = \"/from/file\"\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_OUTPUT_DIR, "/from/env"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_COLLISION_POLICY, "fail"),
        ]
        .into_iter()
        .collect();

        let applied = config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(applied, 3);
        assert_eq!(config.output.dir, Some(PathBuf::from("/from/env")));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.output.collision, CollisionPolicy::Fail);
        assert_eq!(config.engine.path, None);
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let mut config = EmbedderConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == ENV_LOG_LEVEL).then(|| "loud".to_string())
        });
        assert!(matches!(result, Err(EmbedError::InvalidConfig { .. })));
    }

    #[test]
    fn test_inverted_offsets_are_invalid_config() {
        let mut config = EmbedderConfig::default();
        config.style.vertical_offset_top = 10;
        assert!(matches!(config.validate(), Err(EmbedError::InvalidConfig { .. })));
    }
}
