//! Transcoding engine discovery

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{EmbedError, EmbedResult};

/// Engine executable name searched for on `PATH`
pub const ENGINE_NAME: &str = "ffmpeg";

/// Conventional install location checked last on Windows
#[cfg(windows)]
const WINDOWS_FALLBACK: &str = "C:/ffmpeg/bin/ffmpeg.exe";

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Finds the engine executable
#[derive(Debug, Clone, Default)]
pub struct EngineLocator {
    configured: Option<PathBuf>,
}

impl EngineLocator {
    pub fn new(configured: Option<PathBuf>) -> Self {
        Self { configured }
    }

    /// Resolve the engine: configured path, then `PATH`, then the platform fallback.
    ///
    /// A configured path that does not exist is an error rather than a reason
    /// to fall back. A bare configured name is looked up on `PATH`.
    pub fn locate(&self) -> EmbedResult<PathBuf> {
        if let Some(configured) = &self.configured {
            if configured.components().count() == 1 && !configured.is_file() {
                return which::which(configured).map_err(|e| EmbedError::EngineUnavailable {
                    message: format!("{} not found on PATH: {}", configured.display(), e),
                });
            }
            if configured.is_file() {
                debug!("Using configured engine {}", configured.display());
                return Ok(configured.clone());
            }
            return Err(EmbedError::EngineUnavailable {
                message: format!("Configured engine does not exist: {}", configured.display()),
            });
        }

        if let Ok(found) = which::which(ENGINE_NAME) {
            debug!("Found engine on PATH: {}", found.display());
            return Ok(found);
        }

        #[cfg(windows)]
        {
            let fallback = PathBuf::from(WINDOWS_FALLBACK);
            if fallback.is_file() {
                debug!("Using fallback engine {}", fallback.display());
                return Ok(fallback);
            }
        }

        Err(EmbedError::EngineUnavailable {
            message: format!(
                "{} not found; install it, add it to PATH, or set DUALSUB_ENGINE",
                ENGINE_NAME
            ),
        })
    }

    /// Run `<engine> -version` and return its banner line
    pub async fn probe_version(engine: &Path) -> EmbedResult<String> {
        let mut command = Command::new(engine);
        command
            .arg("-version")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(VERSION_PROBE_TIMEOUT, command.output())
            .await
            .map_err(|_| EmbedError::EngineUnavailable {
                message: format!("{} -version timed out", engine.display()),
            })?
            .map_err(|e| EmbedError::EngineUnavailable {
                message: format!("Failed to execute {}: {}", engine.display(), e),
            })?;

        if !output.status.success() {
            warn!("{} -version exited with {}", engine.display(), output.status);
            return Err(EmbedError::EngineUnavailable {
                message: format!("{} -version failed ({})", engine.display(), output.status),
            });
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| EmbedError::EngineUnavailable {
                message: format!("{} -version printed nothing", engine.display()),
            })
    }
}
