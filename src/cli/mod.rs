//! CLI module for DualSub
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::config::LogLevel;

pub mod args;
pub mod commands;

/// DualSub - burn two stacked subtitle tracks into a video
#[derive(Parser, Debug)]
#[command(name = "dualsub")]
#[command(about = "Burn source- and target-language subtitles into one video")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./dualsub.toml when present)
    #[arg(long, global = true, env = "DUALSUB_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Burn both subtitle tracks into the video
    Embed(args::EmbedArgs),
    /// Validate inputs and print the output path and engine command
    Plan(args::PlanArgs),
    /// Report which engine would be used and its version
    Check(args::CheckArgs),
}

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
    Canceled,
}

impl RunStatus {
    /// Process exit code: 0 success, 1 failure, 130 interrupted
    pub fn exit_code(self) -> ExitCode {
        match self {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::Failed => ExitCode::from(1),
            RunStatus::Canceled => ExitCode::from(130),
        }
    }
}
