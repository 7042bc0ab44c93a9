//! FFmpeg execution adapter
//!
//! Runs the engine as a child process, feeding its progress stream to the
//! job handle and keeping a bounded tail of its diagnostics.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::domain::model::EncodeProgress;
use crate::engine::progress::{DiagnosticTail, ProgressParser, DEFAULT_TAIL_LINES};
use crate::error::{EmbedError, EmbedResult};
use crate::planner::EngineInvocation;
use crate::ports::{TranscodeExit, TranscodePort};

/// Upper bound on reading leftover output after the engine exits
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// FFmpeg-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    tail_lines: usize,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new() -> Self {
        Self {
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    /// Number of diagnostic lines kept for failure reports
    pub fn with_tail_lines(mut self, tail_lines: usize) -> Self {
        self.tail_lines = tail_lines;
        self
    }
}

impl Default for FFmpegAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_error(program: &Path, error: io::Error) -> EmbedError {
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            EmbedError::EngineUnavailable {
                message: format!("Cannot start {}: {}", program.display(), error),
            }
        }
        _ => EmbedError::Io(error),
    }
}

#[async_trait]
impl TranscodePort for FFmpegAdapter {
    async fn transcode(
        &self,
        invocation: &EngineInvocation,
        progress: &watch::Sender<Option<EncodeProgress>>,
        cancel: &CancellationToken,
    ) -> EmbedResult<TranscodeExit> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| spawn_error(&invocation.program, e))?;
        debug!("Engine started (pid {:?})", child.id());

        let stdout = child.stdout.take().ok_or_else(|| EmbedError::Internal {
            message: "engine stdout was not captured".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| EmbedError::Internal {
            message: "engine stderr was not captured".to_string(),
        })?;

        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;
        let mut parser = ProgressParser::new();
        let mut tail = DiagnosticTail::new(self.tail_lines);

        let status = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break None,
                line = stdout_lines.next_line(), if stdout_open => match line {
                    Ok(Some(line)) => {
                        if let Some(record) = parser.feed_line(&line) {
                            trace!("Engine progress: {}", record);
                            progress.send_replace(Some(record));
                        }
                    }
                    Ok(None) => stdout_open = false,
                    Err(e) => {
                        debug!("Engine progress stream closed: {}", e);
                        stdout_open = false;
                    }
                },
                line = stderr_lines.next_line(), if stderr_open => match line {
                    Ok(Some(line)) => {
                        trace!("engine: {}", line);
                        tail.push(&line);
                    }
                    Ok(None) => stderr_open = false,
                    Err(e) => {
                        debug!("Engine diagnostic stream closed: {}", e);
                        stderr_open = false;
                    }
                },
                status = child.wait() => break Some(status),
            }
        };

        let status = match status {
            Some(status) => status?,
            None => {
                info!("Stopping engine");
                if let Err(e) = child.start_kill() {
                    warn!("Failed to signal engine: {}", e);
                }
                let status = child.wait().await?;
                debug!("Engine stopped with {}", status);
                return Ok(TranscodeExit::Canceled);
            }
        };

        // Collect what the engine wrote just before exiting. The streams are
        // read together so a descendant holding stdout open cannot hide the
        // diagnostic tail.
        let drain_stdout = async {
            while stdout_open {
                match stdout_lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(record) = parser.feed_line(&line) {
                            progress.send_replace(Some(record));
                        }
                    }
                    _ => stdout_open = false,
                }
            }
        };
        let drain_stderr = async {
            while stderr_open {
                match stderr_lines.next_line().await {
                    Ok(Some(line)) => tail.push(&line),
                    _ => stderr_open = false,
                }
            }
        };
        let drain = async move { tokio::join!(drain_stdout, drain_stderr) };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            debug!("Engine output still open after exit; giving up on the remainder");
        }

        if status.success() {
            if !parser.is_finished() {
                debug!("Engine exited without a final progress record");
            }
            debug!("Engine exited successfully");
            Ok(TranscodeExit::Success)
        } else {
            warn!("Engine exited with {}", status);
            Ok(TranscodeExit::Failed {
                exit_code: status.code(),
                diagnostic_tail: tail.into_lines(),
            })
        }
    }
}
