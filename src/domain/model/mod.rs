// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, EmbedResult, ErrorKind};

/// User-selected quality/size tradeoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionTier {
    /// Highest quality, largest output
    Normal,
    /// Balanced quality and size
    Smaller,
    /// Lowest quality, smallest output
    Smallest,
}

impl CompressionTier {
    /// All tiers, from largest output to smallest
    pub const ALL: [CompressionTier; 3] = [
        CompressionTier::Normal,
        CompressionTier::Smaller,
        CompressionTier::Smallest,
    ];

    /// Parse compression tier from string
    pub fn parse(tier_str: &str) -> Result<Self, EmbedError> {
        match tier_str.trim().to_lowercase().as_str() {
            "normal" => Ok(CompressionTier::Normal),
            "smaller" => Ok(CompressionTier::Smaller),
            "smallest" => Ok(CompressionTier::Smallest),
            _ => Err(EmbedError::InvalidInput {
                message: format!(
                    "Invalid compression tier: {}. Valid tiers: normal, smaller, smallest",
                    tier_str
                ),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionTier::Normal => "normal",
            CompressionTier::Smaller => "smaller",
            CompressionTier::Smallest => "smallest",
        }
    }
}

impl Default for CompressionTier {
    fn default() -> Self {
        CompressionTier::Smaller
    }
}

impl FromStr for CompressionTier {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CompressionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Video encoder selected by a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoCodec {
    H264,
    H265,
}

impl VideoCodec {
    /// Encoder name as understood by the transcoding engine
    pub fn encoder_name(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::H265 => "libx265",
        }
    }

    /// MP4 sample entry tag, when the default one is not widely playable
    pub fn mp4_tag(&self) -> Option<&'static str> {
        match self {
            VideoCodec::H264 => None,
            VideoCodec::H265 => Some("hvc1"),
        }
    }
}

/// Concrete encode parameters derived from a [`CompressionTier`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeProfile {
    pub video_codec: VideoCodec,
    /// Constant rate factor; higher means lower quality
    pub quality_parameter: u8,
    pub encode_speed_preset: &'static str,
    pub audio_bitrate_kbps: u32,
}

/// ASS alignment code for bottom-center placement
pub const ALIGNMENT_BOTTOM_CENTER: u8 = 2;

/// Appearance shared by both burned-in subtitle tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStyle {
    pub font_name: String,
    pub font_size: u32,
    pub outline_width: u32,
    pub shadow_depth: u32,
    /// Distance from the bottom edge for the source-language track
    pub vertical_offset_top: u32,
    /// Distance from the bottom edge for the target-language track
    pub vertical_offset_bottom: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 24,
            outline_width: 2,
            shadow_depth: 1,
            vertical_offset_top: 60,
            vertical_offset_bottom: 24,
        }
    }
}

impl SubtitleStyle {
    /// Check that the style produces the stacked layout
    pub fn validate(&self) -> EmbedResult<()> {
        if self.font_size == 0 {
            return Err(EmbedError::InvalidInput {
                message: "Subtitle font size must be positive".to_string(),
            });
        }
        if self.vertical_offset_top <= self.vertical_offset_bottom {
            return Err(EmbedError::InvalidInput {
                message: format!(
                    "Top subtitle offset ({}) must be greater than bottom offset ({})",
                    self.vertical_offset_top, self.vertical_offset_bottom
                ),
            });
        }
        if self.font_name.trim().is_empty() {
            return Err(EmbedError::InvalidInput {
                message: "Subtitle font name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Which of the two subtitle inputs a stage burns in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleTrack {
    /// Source language, rendered on the upper line
    Source,
    /// Target language, rendered nearest the bottom edge
    Target,
}

/// Inputs collected by a collaborator for one embed job
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedRequest {
    pub video_path: PathBuf,
    pub source_subtitle_path: PathBuf,
    pub target_subtitle_path: PathBuf,
    pub compression_tier: CompressionTier,
    pub downscale_enabled: bool,
}

impl EmbedRequest {
    /// Create a request with the default tier and no downscale
    pub fn new(
        video_path: impl Into<PathBuf>,
        source_subtitle_path: impl Into<PathBuf>,
        target_subtitle_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            video_path: video_path.into(),
            source_subtitle_path: source_subtitle_path.into(),
            target_subtitle_path: target_subtitle_path.into(),
            compression_tier: CompressionTier::default(),
            downscale_enabled: false,
        }
    }

    pub fn with_tier(mut self, tier: CompressionTier) -> Self {
        self.compression_tier = tier;
        self
    }

    pub fn with_downscale(mut self, enabled: bool) -> Self {
        self.downscale_enabled = enabled;
        self
    }

    /// Validate the video input; subtitle checks belong to the graph builder
    pub fn validate_video(&self) -> EmbedResult<()> {
        if !self.video_path.is_file() {
            return Err(EmbedError::InvalidInput {
                message: format!("Video file not found: {}", self.video_path.display()),
            });
        }
        Ok(())
    }
}

/// Identifier assigned to each submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a job; transitions only move forward
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Idle,
    Validating,
    Running,
    Succeeded(PathBuf),
    Failed(ErrorKind, String),
    Canceled,
}

impl JobState {
    pub fn name(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Validating => "validating",
            JobState::Running => "running",
            JobState::Succeeded(_) => "succeeded",
            JobState::Failed(..) => "failed",
            JobState::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded(_) | JobState::Failed(..) | JobState::Canceled
        )
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Idle, JobState::Validating)
                | (JobState::Validating, JobState::Running)
                | (JobState::Validating, JobState::Failed(..))
                | (JobState::Running, JobState::Succeeded(_))
                | (JobState::Running, JobState::Failed(..))
                | (JobState::Running, JobState::Canceled)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Succeeded(path) => write!(f, "succeeded ({})", path.display()),
            JobState::Failed(kind, detail) => write!(f, "failed ({}): {}", kind, detail),
            other => f.write_str(other.name()),
        }
    }
}

/// One embed job and its current state
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    request: EmbedRequest,
    output_path: Option<PathBuf>,
    state: JobState,
    created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, request: EmbedRequest) -> Self {
        Self {
            id,
            request,
            output_path: None,
            state: JobState::Idle,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn request(&self) -> &EmbedRequest {
        &self.request
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Record the resolved output path; never the input video itself
    pub fn set_output_path(&mut self, path: PathBuf) -> EmbedResult<()> {
        if path == self.request.video_path {
            return Err(EmbedError::CollisionUnresolved {
                path,
                reason: "output path would overwrite the input video".to_string(),
            });
        }
        self.output_path = Some(path);
        Ok(())
    }

    /// Move to `next`, rejecting backward or skipped transitions
    pub fn transition(&mut self, next: JobState) -> EmbedResult<()> {
        if !self.state.can_transition_to(&next) {
            return Err(EmbedError::Internal {
                message: format!(
                    "job {} cannot move from {} to {}",
                    self.id,
                    self.state.name(),
                    next.name()
                ),
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Terminal notification delivered to the collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Succeeded { output_path: PathBuf, elapsed: Duration },
    Failed { kind: ErrorKind, message: String },
    Canceled,
}

impl JobOutcome {
    pub fn from_error(error: &EmbedError) -> Self {
        JobOutcome::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// The terminal job state matching this outcome
    pub fn to_state(&self) -> JobState {
        match self {
            JobOutcome::Succeeded { output_path, .. } => JobState::Succeeded(output_path.clone()),
            JobOutcome::Failed { kind, message } => JobState::Failed(*kind, message.clone()),
            JobOutcome::Canceled => JobState::Canceled,
        }
    }
}

/// Latest progress record reported by the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeProgress {
    /// Media time encoded so far
    pub out_time: Duration,
    /// Encoding speed relative to realtime
    pub speed: Option<f64>,
}

impl EncodeProgress {
    /// Format encoded time as HH:MM:SS.cc
    pub fn format_out_time(&self) -> String {
        let total = self.out_time.as_secs();
        let centis = self.out_time.subsec_millis() / 10;
        format!(
            "{:02}:{:02}:{:02}.{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60,
            centis
        )
    }
}

impl fmt::Display for EncodeProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.speed {
            Some(speed) => write!(f, "time={} speed={:.2}x", self.format_out_time(), speed),
            None => write!(f, "time={}", self.format_out_time()),
        }
    }
}
