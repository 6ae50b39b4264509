//! Delegate CLI - inspect accelerator devices and negotiated feature levels

mod cli;
mod commands;
mod context;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays parseable
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Devices { option, json } => {
            let ctx = context::CliContext::load(config_path, cli.source)?;
            commands::devices::run(&ctx, option, json)?;
        }
        Commands::Level { option, json } => {
            let ctx = context::CliContext::load(config_path, cli.source)?;
            commands::level::run(&ctx, option, json)?;
        }
        Commands::Doctor { strict, json } => {
            commands::doctor::run(config_path, cli.source, strict, json)?;
        }
    }

    Ok(())
}
