//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::TomlConfigAdapter;
use crate::cli::{Cli, Commands};
use crate::config::EmbedderConfig;

/// Build configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<EmbedderConfig> {
    let mut config = TomlConfigAdapter::new(cli.config.clone())
        .load()
        .context("Failed to load configuration file")?;

    let env_overrides = config
        .apply_env_overrides(|key| std::env::var(key).ok())
        .context("Invalid environment override")?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_configuration_overrides(cli, &mut config);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_configuration_overrides(cli: &Cli, config: &mut EmbedderConfig) -> usize {
    let mut cli_overrides = 0;

    if let Some(level) = cli.log_level {
        config.logging.level = level;
        cli_overrides += 1;
    }
    if cli.log_json {
        config.logging.json = true;
        cli_overrides += 1;
    }

    let job = match &cli.command {
        Commands::Embed(args) => Some(&args.job),
        Commands::Plan(args) => Some(&args.job),
        Commands::Check(args) => {
            if let Some(engine) = &args.engine {
                config.engine.path = Some(engine.clone());
                cli_overrides += 1;
            }
            None
        }
    };

    if let Some(job) = job {
        if let Some(dir) = &job.output_dir {
            config.output.dir = Some(dir.clone());
            cli_overrides += 1;
        }
        if let Some(collision) = job.collision {
            config.output.collision = collision;
            cli_overrides += 1;
        }
        if let Some(engine) = &job.engine {
            config.engine.path = Some(engine.clone());
            cli_overrides += 1;
        }
    }

    cli_overrides
}
