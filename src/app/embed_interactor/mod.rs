// Embed interactor - Orchestrates the dual-subtitle burn-in use case

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::EmbedderConfig;
use crate::domain::model::*;
use crate::domain::rules::CompressionProfileResolver;
use crate::engine::{EngineLocator, JobExecutor, JobPlan};
use crate::error::{EmbedError, EmbedResult, ErrorKind};
use crate::output::OutputNamingResolver;
use crate::planner::SubtitleFilterGraphBuilder;
use crate::ports::TranscodePort;

/// Execution slot shared by every job of one interactor
#[derive(Debug, Default)]
struct JobSlot {
    busy: AtomicBool,
    holder: AtomicU64,
}

impl JobSlot {
    fn holder(&self) -> Option<u64> {
        self.busy
            .load(Ordering::Acquire)
            .then(|| self.holder.load(Ordering::Acquire))
    }

    fn try_acquire(self: &Arc<Self>, id: JobId) -> EmbedResult<SlotGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EmbedError::JobAlreadyRunning {
                running: self.holder.load(Ordering::Acquire),
            });
        }
        self.holder.store(id.0, Ordering::Release);
        Ok(SlotGuard {
            slot: Arc::clone(self),
        })
    }
}

/// Releases the slot when the worker finishes, panics included
struct SlotGuard {
    slot: Arc<JobSlot>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}

/// Handle to a submitted job
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    output_path: PathBuf,
    state: watch::Receiver<JobState>,
    progress: watch::Receiver<Option<EncodeProgress>>,
    cancel: CancellationToken,
    task: JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Final path the output will be promoted to
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Current state snapshot
    pub fn state(&self) -> JobState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn state_updates(&self) -> watch::Receiver<JobState> {
        self.state.clone()
    }

    /// Receiver holding the latest engine progress record
    pub fn progress(&self) -> watch::Receiver<Option<EncodeProgress>> {
        self.progress.clone()
    }

    /// Request cancellation; the engine is stopped and the partial output removed
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the terminal outcome
    pub async fn wait(self) -> JobOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => JobOutcome::Failed {
                kind: ErrorKind::Internal,
                message: format!("job {} worker stopped: {}", self.id, e),
            },
        }
    }
}

/// Interactor for the embed use case
pub struct EmbedInteractor {
    graph_builder: SubtitleFilterGraphBuilder,
    naming: OutputNamingResolver,
    locator: EngineLocator,
    executor: JobExecutor,
    slot: Arc<JobSlot>,
    next_id: AtomicU64,
}

impl EmbedInteractor {
    /// Create new embed interactor with injected collaborators
    pub fn new(
        graph_builder: SubtitleFilterGraphBuilder,
        naming: OutputNamingResolver,
        locator: EngineLocator,
        transcode_port: Arc<dyn TranscodePort>,
    ) -> Self {
        Self {
            graph_builder,
            naming,
            locator,
            executor: JobExecutor::new(transcode_port),
            slot: Arc::new(JobSlot::default()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &EmbedderConfig, transcode_port: Arc<dyn TranscodePort>) -> Self {
        Self::new(
            SubtitleFilterGraphBuilder::new(config.style.clone()),
            OutputNamingResolver::new(config.output.clone()),
            EngineLocator::new(config.engine.path.clone()),
            transcode_port,
        )
    }

    /// True while a job holds the execution slot
    pub fn is_busy(&self) -> bool {
        self.slot.holder().is_some()
    }

    /// Validate `request` and resolve everything a run needs, without running it.
    ///
    /// Checks run cheapest first: video, subtitles, output name, then engine.
    pub fn plan(&self, request: &EmbedRequest) -> EmbedResult<JobPlan> {
        request.validate_video()?;

        let graph = self.graph_builder.build(
            &request.source_subtitle_path,
            &request.target_subtitle_path,
            request.downscale_enabled,
        )?;
        let profile = CompressionProfileResolver::resolve(request.compression_tier);
        let output_path = self.naming.resolve(&request.video_path)?;
        let engine = self.locator.locate()?;

        Ok(JobPlan {
            engine,
            video_path: request.video_path.clone(),
            graph,
            profile,
            output_path,
        })
    }

    /// Validate `request` and start it on a worker task.
    ///
    /// Validation errors are returned here; engine-level failures arrive
    /// through [`JobHandle::wait`]. Must be called within a tokio runtime.
    pub fn submit(&self, request: EmbedRequest) -> EmbedResult<JobHandle> {
        if let Some(running) = self.slot.holder() {
            return Err(EmbedError::JobAlreadyRunning { running });
        }

        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut job = Job::new(id, request);
        debug!("Job {} created at {}", id, job.created_at().to_rfc3339());
        job.transition(JobState::Validating)?;

        let planned = self.plan(job.request()).and_then(|plan| {
            job.set_output_path(plan.output_path.clone())?;
            Ok(plan)
        });
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Job {} rejected: {}", id, e);
                job.transition(JobState::Failed(e.kind(), e.to_string()))?;
                return Err(e);
            }
        };

        let guard = self.slot.try_acquire(id)?;
        job.transition(JobState::Running)?;
        info!(
            "Job {} running: {} -> {} ({})",
            id,
            plan.video_path.display(),
            plan.output_path.display(),
            job.request().compression_tier
        );

        let (state_tx, state_rx) = watch::channel(job.state().clone());
        let (progress_tx, progress_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let executor = self.executor.clone();
        let output_path = plan.output_path.clone();

        let task = tokio::spawn(async move {
            let outcome = executor.run(&plan, &progress_tx, &worker_cancel).await;
            drop(guard);

            let terminal = outcome.to_state();
            if let Err(e) = job.transition(terminal.clone()) {
                error!("{}", e);
            }
            info!("Job {} {}", job.id(), terminal);
            state_tx.send_replace(terminal);
            outcome
        });

        Ok(JobHandle {
            id,
            output_path,
            state: state_rx,
            progress: progress_rx,
            cancel,
            task,
        })
    }
}
