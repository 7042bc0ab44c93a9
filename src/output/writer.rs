//! Staged output writing

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::error::{EmbedError, EmbedResult};

/// Temporary engine output that becomes the final file only on success.
///
/// The temporary file lives next to the final path so promotion is a same
/// filesystem link/rename. Dropping a `StagedOutput` deletes the temporary
/// file.
#[derive(Debug)]
pub struct StagedOutput {
    temp: TempPath,
    final_path: PathBuf,
}

impl StagedOutput {
    /// Reserve a temporary file beside `final_path`
    pub fn create(final_path: &Path) -> EmbedResult<Self> {
        let dir = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = final_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| EmbedError::InvalidInput {
                message: format!("Output path has no file name: {}", final_path.display()),
            })?;

        let temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".part")
            .tempfile_in(&dir)?
            .into_temp_path();

        debug!("Staging output at {}", temp.display());
        Ok(Self {
            temp,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Bytes written to the temporary file so far
    pub fn written_bytes(&self) -> u64 {
        fs::metadata(&self.temp).map(|m| m.len()).unwrap_or(0)
    }

    /// Move the temporary file to the final path without overwriting
    pub fn promote(self) -> EmbedResult<PathBuf> {
        let final_path = self.final_path;
        match self.temp.persist_noclobber(&final_path) {
            Ok(()) => {
                info!("Output written: {}", final_path.display());
                Ok(final_path)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(EmbedError::CollisionUnresolved {
                    path: final_path,
                    reason: "file appeared while the job was running".to_string(),
                })
            }
            Err(e) => Err(EmbedError::Io(e.error)),
        }
    }

    /// Delete the temporary file
    pub fn discard(self) {
        let temp_display = self.temp.display().to_string();
        if let Err(e) = self.temp.close() {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove staged output {}: {}", temp_display, e);
            }
        } else {
            debug!("Discarded staged output {}", temp_display);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staged_files(dir: &TempDir) -> Vec<PathBuf> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.to_string_lossy().ends_with(".part"))
            .collect()
    }

    #[test]
    fn test_temp_file_lives_beside_final_path() {
        let dir = TempDir::new().unwrap();
        let final_path = dir.path().join("movie_dual_subbed.mp4");
        let staged = StagedOutput::create(&final_path).unwrap();

        assert_eq!(staged.temp_path().parent(), final_path.parent());
        assert_ne!(staged.temp_path(), final_path.as_path());
        assert!(staged.temp_path().exists());
    }

    #[test]
    fn test_promote_moves_file() {
        let dir = TempDir::new().unwrap();
        let final_path = dir.path().join("movie_dual_subbed.mp4");
        let staged = StagedOutput::create(&final_path).unwrap();
        fs::write(staged.temp_path(), b"encoded").unwrap();
        assert_eq!(staged.written_bytes(), 7);

        let promoted = staged.promote().unwrap();
        assert_eq!(promoted, final_path);
        assert_eq!(fs::read(&final_path).unwrap(), b"encoded");
        assert!(staged_files(&dir).is_empty());
    }

    #[test]
    fn test_promote_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let final_path = dir.path().join("movie_dual_subbed.mp4");
        let staged = StagedOutput::create(&final_path).unwrap();
        fs::write(staged.temp_path(), b"new").unwrap();
        fs::write(&final_path, b"existing").unwrap();

        let result = staged.promote();
        assert!(matches!(result, Err(EmbedError::CollisionUnresolved { .. })));
        assert_eq!(fs::read(&final_path).unwrap(), b"existing");
        assert!(staged_files(&dir).is_empty());
    }

    #[test]
    fn test_discard_and_drop_remove_temp_file() {
        let dir = TempDir::new().unwrap();
        let final_path = dir.path().join("movie_dual_subbed.mp4");

        let staged = StagedOutput::create(&final_path).unwrap();
        fs::write(staged.temp_path(), b"partial").unwrap();
        staged.discard();
        assert!(staged_files(&dir).is_empty());

        {
            let _staged = StagedOutput::create(&final_path).unwrap();
        }
        assert!(staged_files(&dir).is_empty());
        assert!(!final_path.exists());
    }
}
