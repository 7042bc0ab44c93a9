//! Job execution: staged output, engine run, promotion

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::model::{EncodeProfile, EncodeProgress, JobOutcome};
use crate::error::EmbedError;
use crate::output::StagedOutput;
use crate::planner::{CommandBuilder, EngineInvocation, FilterGraph};
use crate::ports::{TranscodeExit, TranscodePort};

/// Everything resolved for one job before it runs
#[derive(Debug, Clone)]
pub struct JobPlan {
    pub engine: PathBuf,
    pub video_path: PathBuf,
    pub graph: FilterGraph,
    pub profile: EncodeProfile,
    pub output_path: PathBuf,
}

impl JobPlan {
    /// Engine invocation writing to `output`
    pub fn invocation_for(&self, output: &Path) -> EngineInvocation {
        CommandBuilder::build_embed_command(
            &self.engine,
            &self.video_path,
            &self.graph,
            &self.profile,
            output,
        )
    }
}

/// Runs a single planned job through a [`TranscodePort`]
#[derive(Clone)]
pub struct JobExecutor {
    port: Arc<dyn TranscodePort>,
}

impl JobExecutor {
    pub fn new(port: Arc<dyn TranscodePort>) -> Self {
        Self { port }
    }

    /// Run `plan` and report how it ended.
    ///
    /// The final output path only ever receives a complete file; every other
    /// path removes the staged output.
    pub async fn run(
        &self,
        plan: &JobPlan,
        progress: &watch::Sender<Option<EncodeProgress>>,
        cancel: &CancellationToken,
    ) -> JobOutcome {
        let started = Instant::now();

        let staged = match StagedOutput::create(&plan.output_path) {
            Ok(staged) => staged,
            Err(e) => {
                error!("Failed to stage output: {}", e);
                return JobOutcome::from_error(&e);
            }
        };

        let invocation = plan.invocation_for(staged.temp_path());
        info!("Running engine: {}", invocation);

        let exit = match self.port.transcode(&invocation, progress, cancel).await {
            Ok(exit) => exit,
            Err(e) => {
                error!("Engine run failed: {}", e);
                staged.discard();
                return JobOutcome::from_error(&e);
            }
        };

        match exit {
            TranscodeExit::Success if staged.written_bytes() == 0 => {
                staged.discard();
                let e = EmbedError::TranscodeFailed {
                    exit_code: Some(0),
                    diagnostic_tail: vec!["engine exited successfully but wrote no output".to_string()],
                };
                error!("{}", e);
                JobOutcome::from_error(&e)
            }
            TranscodeExit::Success => match staged.promote() {
                Ok(output_path) => {
                    let elapsed = started.elapsed();
                    info!("Job finished in {:.1}s", elapsed.as_secs_f64());
                    JobOutcome::Succeeded {
                        output_path,
                        elapsed,
                    }
                }
                Err(e) => {
                    error!("Failed to promote output: {}", e);
                    JobOutcome::from_error(&e)
                }
            },
            TranscodeExit::Failed {
                exit_code,
                diagnostic_tail,
            } => {
                staged.discard();
                let e = EmbedError::TranscodeFailed {
                    exit_code,
                    diagnostic_tail,
                };
                error!("{}", e);
                JobOutcome::from_error(&e)
            }
            TranscodeExit::Canceled => {
                staged.discard();
                warn!("Job canceled");
                JobOutcome::Canceled
            }
        }
    }
}
