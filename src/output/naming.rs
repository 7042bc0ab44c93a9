//! Output file naming

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{EmbedError, EmbedResult};
use crate::output::{CollisionPolicy, OutputSettings};

/// Resolves collision-safe output paths
#[derive(Debug, Clone)]
pub struct OutputNamingResolver {
    settings: OutputSettings,
}

impl OutputNamingResolver {
    pub fn new(settings: OutputSettings) -> Self {
        Self { settings }
    }

    /// Directory the output for `video` lands in
    pub fn output_dir(&self, video: &Path) -> PathBuf {
        match &self.settings.dir {
            Some(dir) => dir.clone(),
            None => match video.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Resolve the output path for `video`; never returns an existing file
    pub fn resolve(&self, video: &Path) -> EmbedResult<PathBuf> {
        let stem = video
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| EmbedError::InvalidInput {
                message: format!("Video path has no file name: {}", video.display()),
            })?;

        let dir = self.output_dir(video);
        if !dir.is_dir() {
            return Err(EmbedError::InvalidInput {
                message: format!("Output directory does not exist: {}", dir.display()),
            });
        }

        let base = dir.join(self.file_name(&stem, None));
        if is_available(&base, video) {
            debug!("Output path resolved: {}", base.display());
            return Ok(base);
        }

        match self.settings.collision {
            CollisionPolicy::Fail => Err(EmbedError::CollisionUnresolved {
                path: base,
                reason: "file already exists".to_string(),
            }),
            CollisionPolicy::Version => {
                for version in 1..=self.settings.max_versions {
                    let candidate = dir.join(self.file_name(&stem, Some(version)));
                    if is_available(&candidate, video) {
                        info!(
                            "{} exists, using {}",
                            base.display(),
                            candidate.display()
                        );
                        return Ok(candidate);
                    }
                }
                Err(EmbedError::CollisionUnresolved {
                    path: base,
                    reason: format!(
                        "all {} versioned names are taken",
                        self.settings.max_versions
                    ),
                })
            }
        }
    }

    fn file_name(&self, stem: &str, version: Option<u32>) -> String {
        match version {
            Some(version) => format!(
                "{}{}_{}.{}",
                stem, self.settings.suffix, version, self.settings.extension
            ),
            None => format!("{}{}.{}", stem, self.settings.suffix, self.settings.extension),
        }
    }
}

/// Free to write: nothing there (not even a dangling link) and not the input
fn is_available(candidate: &Path, video: &Path) -> bool {
    candidate != video && fs::symlink_metadata(candidate).is_err()
}
