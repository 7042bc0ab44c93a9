//! DualSub CLI
//!
//! Burns a source-language and a target-language subtitle track into one
//! video, stacked at the bottom of the frame, by driving an external ffmpeg.
//!
//! # Usage
//!
//! ```bash
//! dualsub embed --video movie.mp4 --source en.srt --target vi.srt --tier smaller
//! dualsub plan --video movie.mp4 --source en.srt --target vi.srt --json
//! dualsub check
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use dualsub_cli::cli::{self, Cli};
use dualsub_cli::config_initialization::initialize_configuration_hierarchy;
use dualsub_cli::utils::logging::LoggingSystem;

/// Main entry point for the DualSub CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match initialize_configuration_hierarchy(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    let logging = LoggingSystem::new(config.logging.clone());
    if let Err(e) = logging.initialize() {
        eprintln!("Warning: {:#}", e);
    }
    logging.log_system_info();
    debug!("Effective configuration: {:?}", config);

    match cli::commands::run(cli.command, config).await {
        Ok(status) => status.exit_code(),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
