//! DualSub Library
//!
//! Burns two stacked subtitle tracks (source language above, target language
//! below) into a video through an external transcoding engine, with
//! collision-safe output naming and a single-running-job orchestrator.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{EmbedInteractor, JobHandle};
pub use config::EmbedderConfig;
pub use domain::model::{
    CompressionTier, EmbedRequest, EncodeProfile, EncodeProgress, JobId, JobOutcome, JobState,
    SubtitleStyle,
};
pub use error::{EmbedError, EmbedResult, ErrorKind};
pub use ports::{TranscodeExit, TranscodePort};
