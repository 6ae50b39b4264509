//! `delegate level` - print the negotiated feature level
//!
//! Never fails on enumeration errors: the level is reported as `-1`, the
//! same answer the delegation pipeline would get.

use crate::context::CliContext;
use colored::Colorize;
use delegate_kernel::{TargetDeviceOption, feature_level};

pub fn run(ctx: &CliContext, option: Option<TargetDeviceOption>, json: bool) -> anyhow::Result<()> {
    let outcome = ctx.negotiator.negotiate(ctx.option(option));

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{} Feature level negotiation", "→".green());
    println!("  Option: {}", outcome.option.to_string().yellow());
    println!(
        "  Runtime level: {}",
        feature_level::describe(outcome.runtime_level).cyan()
    );

    let effective = feature_level::describe(outcome.effective_level);
    let effective = if !outcome.is_supported() {
        effective.red()
    } else if outcome.is_downgraded() {
        effective.yellow()
    } else {
        effective.green()
    };
    println!("  Effective level: {effective}");

    if !outcome.devices.is_empty() {
        println!("  Devices: {}", outcome.devices_description());
    }
    if let Some(error) = &outcome.error {
        println!("  {} {}", "Enumeration failed:".red(), error);
    }

    Ok(())
}
