use std::sync::Arc;

use crate::adapters::FFmpegAdapter;
use crate::app::embed_interactor::EmbedInteractor;
use crate::config::EmbedderConfig;
use crate::ports::TranscodePort;

pub trait AppContainer: Send + Sync {
    fn embed_interactor(&self) -> Arc<EmbedInteractor>;
    fn config(&self) -> &EmbedderConfig;
}

/// Wires the interactor to the process-backed engine adapter
pub struct DefaultAppContainer {
    config: EmbedderConfig,
    embed_interactor: Arc<EmbedInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: EmbedderConfig) -> Self {
        let transcode_port =
            Arc::new(FFmpegAdapter::new().with_tail_lines(config.diagnostics.tail_lines));
        Self::with_port(config, transcode_port)
    }

    /// Container using a custom transcoding port
    pub fn with_port(config: EmbedderConfig, transcode_port: Arc<dyn TranscodePort>) -> Self {
        let embed_interactor = Arc::new(EmbedInteractor::from_config(&config, transcode_port));
        Self {
            config,
            embed_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn embed_interactor(&self) -> Arc<EmbedInteractor> {
        Arc::clone(&self.embed_interactor)
    }

    fn config(&self) -> &EmbedderConfig {
        &self.config
    }
}
