//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{CompressionTier, EmbedRequest};
use crate::output::CollisionPolicy;

/// Inputs shared by `embed` and `plan`
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Input video file
    #[arg(long, value_name = "FILE")]
    pub video: PathBuf,

    /// Source-language subtitle file (rendered on the upper line)
    #[arg(long, value_name = "FILE")]
    pub source: PathBuf,

    /// Target-language subtitle file (rendered at the bottom)
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    /// Compression tier (normal, smaller, smallest)
    #[arg(long, default_value_t = CompressionTier::Smaller)]
    pub tier: CompressionTier,

    /// Downscale so the shorter side is at most 720 pixels
    #[arg(long)]
    pub downscale: bool,

    /// Output directory (default: the video's directory)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// What to do when the output name is taken (version, fail)
    #[arg(long, value_name = "POLICY")]
    pub collision: Option<CollisionPolicy>,

    /// Engine executable
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,
}

impl JobArgs {
    pub fn to_request(&self) -> EmbedRequest {
        EmbedRequest::new(&self.video, &self.source, &self.target)
            .with_tier(self.tier)
            .with_downscale(self.downscale)
    }
}

/// Arguments for the embed command
#[derive(Args, Debug)]
pub struct EmbedArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Engine executable
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,
}
