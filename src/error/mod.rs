//! Error handling module for DualSub

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Main error type for DualSub operations
#[derive(Error, Debug)]
pub enum EmbedError {
    /// Subtitle file missing, unreadable, or not UTF-8 text
    #[error("Subtitle file {} is not readable UTF-8 text: {reason}", path.display())]
    InvalidSubtitleEncoding { path: PathBuf, reason: String },

    /// The transcoding engine cannot be found or invoked
    #[error("Transcoding engine unavailable: {message}")]
    EngineUnavailable { message: String },

    /// Another job currently owns the execution slot
    #[error("A job is already running (job #{running})")]
    JobAlreadyRunning { running: u64 },

    /// The engine ran but exited abnormally
    #[error("Transcoding failed ({}):\n{}", describe_exit(*exit_code), diagnostic_tail.join("\n"))]
    TranscodeFailed {
        exit_code: Option<i32>,
        diagnostic_tail: Vec<String>,
    },

    /// No safe output file name could be chosen
    #[error("Cannot choose an output path for {}: {reason}", path.display())]
    CollisionUnresolved { path: PathBuf, reason: String },

    /// Request inputs that fail validation before any work starts
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Configuration file or override error
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Broken internal invariant, such as an illegal job state transition
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Fieldless classification of an [`EmbedError`], carried by job states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidSubtitleEncoding,
    EngineUnavailable,
    JobAlreadyRunning,
    TranscodeFailed,
    CollisionUnresolved,
    InvalidInput,
    InvalidConfig,
    Internal,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidSubtitleEncoding => "invalid subtitle encoding",
            ErrorKind::EngineUnavailable => "engine unavailable",
            ErrorKind::JobAlreadyRunning => "job already running",
            ErrorKind::TranscodeFailed => "transcode failed",
            ErrorKind::CollisionUnresolved => "collision unresolved",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::InvalidConfig => "invalid configuration",
            ErrorKind::Internal => "internal error",
            ErrorKind::Io => "i/o error",
        };
        f.write_str(name)
    }
}

impl EmbedError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EmbedError::InvalidSubtitleEncoding { .. } => ErrorKind::InvalidSubtitleEncoding,
            EmbedError::EngineUnavailable { .. } => ErrorKind::EngineUnavailable,
            EmbedError::JobAlreadyRunning { .. } => ErrorKind::JobAlreadyRunning,
            EmbedError::TranscodeFailed { .. } => ErrorKind::TranscodeFailed,
            EmbedError::CollisionUnresolved { .. } => ErrorKind::CollisionUnresolved,
            EmbedError::InvalidInput { .. } => ErrorKind::InvalidInput,
            EmbedError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            EmbedError::Internal { .. } => ErrorKind::Internal,
            EmbedError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for DualSub operations
pub type EmbedResult<T> = std::result::Result<T, EmbedError>;
