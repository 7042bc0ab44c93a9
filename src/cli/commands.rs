//! Command implementations

use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{CheckArgs, EmbedArgs, PlanArgs};
use crate::cli::{Commands, RunStatus};
use crate::config::EmbedderConfig;
use crate::domain::model::{CompressionTier, EncodeProfile, JobOutcome};
use crate::engine::EngineLocator;
use crate::utils::{format_duration, format_file_size};

/// Dispatch a parsed command
pub async fn run(command: Commands, config: EmbedderConfig) -> Result<RunStatus> {
    match command {
        Commands::Embed(args) => embed(args, config).await,
        Commands::Plan(args) => plan(args, config),
        Commands::Check(args) => check(args, config).await,
    }
}

/// Execute the embed command
pub async fn embed(args: EmbedArgs, config: EmbedderConfig) -> Result<RunStatus> {
    let container = DefaultAppContainer::new(config);
    let interactor = container.embed_interactor();

    let handle = interactor
        .submit(args.job.to_request())
        .context("Failed to start embed job")?;
    info!("Job {} writing {}", handle.id(), handle.output_path().display());

    let cancel = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, canceling job");
            cancel.cancel();
        }
    });

    let mut states = handle.state_updates();
    let state_log = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            debug!("Job state: {}", *states.borrow_and_update());
        }
    });

    let mut progress = handle.progress();
    let interactive = std::io::stderr().is_terminal();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let latest = progress.borrow_and_update().clone();
            if let (true, Some(record)) = (interactive, latest) {
                eprint!("\r{}   ", record);
            }
        }
        if interactive {
            eprintln!();
        }
    });

    let outcome = handle.wait().await;
    interrupt.abort();
    state_log.abort();
    let _ = reporter.await;

    match outcome {
        JobOutcome::Succeeded {
            output_path,
            elapsed,
        } => {
            let size = fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
            println!("{}", output_path.display());
            info!(
                "Done in {} ({})",
                format_duration(elapsed),
                format_file_size(size)
            );
            Ok(RunStatus::Success)
        }
        JobOutcome::Failed { kind, message } => {
            eprintln!("Job failed ({}): {}", kind, message);
            Ok(RunStatus::Failed)
        }
        JobOutcome::Canceled => {
            eprintln!("Job canceled");
            Ok(RunStatus::Canceled)
        }
    }
}

/// Machine-readable dry-run report
#[derive(Debug, Serialize)]
struct PlanReport {
    video: PathBuf,
    output_path: PathBuf,
    engine: PathBuf,
    tier: CompressionTier,
    profile: EncodeProfile,
    downscale: bool,
    filter_graph: String,
    args: Vec<String>,
    planned_at: DateTime<Utc>,
}

/// Execute the plan command
pub fn plan(args: PlanArgs, config: EmbedderConfig) -> Result<RunStatus> {
    let container = DefaultAppContainer::new(config);
    let request = args.job.to_request();
    let plan = container
        .embed_interactor()
        .plan(&request)
        .context("Failed to plan embed job")?;
    let invocation = plan.invocation_for(&plan.output_path);

    if args.json {
        let report = PlanReport {
            video: plan.video_path.clone(),
            output_path: plan.output_path.clone(),
            engine: plan.engine.clone(),
            tier: request.compression_tier,
            profile: plan.profile.clone(),
            downscale: plan.graph.has_scale_stage(),
            filter_graph: plan.graph.render(),
            args: invocation.args_lossy(),
            planned_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize plan")?;
        println!("{}", json);
    } else {
        println!("Output:  {}", plan.output_path.display());
        println!("Engine:  {}", plan.engine.display());
        println!("Tier:    {}", request.compression_tier);
        println!("Scale:   {}", if plan.graph.has_scale_stage() { "720p" } else { "source" });
        println!("Command: {}", invocation);
    }
    Ok(RunStatus::Success)
}

/// Execute the check command
pub async fn check(args: CheckArgs, config: EmbedderConfig) -> Result<RunStatus> {
    let locator = EngineLocator::new(args.engine.or(config.engine.path));
    let engine = locator.locate().context("No usable engine")?;
    let version = EngineLocator::probe_version(&engine)
        .await
        .context("Engine did not respond to -version")?;

    println!("Engine:  {}", engine.display());
    println!("Version: {}", version);
    Ok(RunStatus::Success)
}
