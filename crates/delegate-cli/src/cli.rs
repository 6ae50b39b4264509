//! CLI command definitions using clap

use clap::{Parser, Subcommand};
use delegate_kernel::{SourceKind, TargetDeviceOption};
use std::path::PathBuf;

/// Delegate CLI - inspect accelerator devices and negotiated feature levels
#[derive(Parser)]
#[command(name = "delegate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path (yaml, toml, json, ini, ron, json5)
    #[arg(short = 'c', long, global = true, env = "DELEGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Device source, overriding the configuration (host, static)
    #[arg(short = 's', long, global = true)]
    pub source: Option<SourceKind>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List the filtered, ordered target devices
    Devices {
        /// Target device option (all, cpu-only, cpu-disabled)
        #[arg(long)]
        option: Option<TargetDeviceOption>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the runtime and effective feature level
    Level {
        /// Target device option (all, cpu-only, cpu-disabled)
        #[arg(long)]
        option: Option<TargetDeviceOption>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that devices can be enumerated and a level negotiated
    Doctor {
        /// Exit with an error when any check fails
        #[arg(long)]
        strict: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
