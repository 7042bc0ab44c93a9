//! Logging initialization and output formatting

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, LoggingSettings};

/// Logging system manager
pub struct LoggingSystem {
    config: LoggingSettings,
}

impl LoggingSystem {
    /// Create a new logging system with configuration
    pub fn new(config: LoggingSettings) -> Self {
        Self { config }
    }

    /// Filter used when `RUST_LOG` is unset
    pub fn default_directive(level: LogLevel) -> String {
        format!("dualsub_cli={},dualsub={}", level, level)
    }

    /// Install the global subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Logs go to
    /// stderr so stdout stays usable for `plan --json`.
    pub fn initialize(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(Self::default_directive(self.config.level)))
            .map_err(|e| anyhow!("Invalid log filter: {}", e))?;

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);

        let installed = if self.config.json {
            builder.json().with_current_span(false).try_init()
        } else {
            builder.compact().try_init()
        };
        installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

        tracing::debug!(
            "Logging system initialized with level: {} (json: {})",
            self.config.level,
            self.config.json
        );
        Ok(())
    }

    /// Log system information
    pub fn log_system_info(&self) {
        tracing::debug!("dualsub {}", env!("CARGO_PKG_VERSION"));

        #[cfg(target_os = "macos")]
        tracing::debug!("Platform: macOS");
        #[cfg(target_os = "linux")]
        tracing::debug!("Platform: Linux");
        #[cfg(target_os = "windows")]
        tracing::debug!("Platform: Windows");
    }
}
