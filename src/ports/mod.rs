// Ports - Interface definitions (contracts)

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::domain::model::EncodeProgress;
use crate::error::EmbedResult;
use crate::planner::EngineInvocation;

/// How an engine run ended
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeExit {
    /// Exit status zero
    Success,
    /// Non-zero exit or killed by a signal
    Failed {
        exit_code: Option<i32>,
        diagnostic_tail: Vec<String>,
    },
    /// Stopped through the cancellation token; the process has been reaped
    Canceled,
}

/// Port for running one transcoding engine invocation
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// Publishes the latest progress record on `progress` while the engine
    /// runs. When `cancel` fires the engine is killed and waited for before
    /// returning [`TranscodeExit::Canceled`]. Errors are reserved for failures
    /// to start or supervise the engine.
    async fn transcode(
        &self,
        invocation: &EngineInvocation,
        progress: &watch::Sender<Option<EncodeProgress>>,
        cancel: &CancellationToken,
    ) -> EmbedResult<TranscodeExit>;
}
