//! `delegate devices` - list the filtered, ordered target devices

use crate::context::CliContext;
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use delegate_foundation::describe_devices;
use delegate_kernel::{DeviceWrapper, TargetDeviceOption, feature_level};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DevicesReport<'a> {
    option: TargetDeviceOption,
    source: String,
    devices: &'a [DeviceWrapper<u32>],
}

pub fn run(ctx: &CliContext, option: Option<TargetDeviceOption>, json: bool) -> anyhow::Result<()> {
    let option = ctx.option(option);
    let devices = ctx
        .negotiator
        .target_devices(option)
        .map_err(|report| anyhow::anyhow!("device enumeration failed: {report:?}"))?;

    tracing::info!("target devices: {}", describe_devices(&devices));

    if json {
        let report = DevicesReport {
            option,
            source: ctx.config.source.to_string(),
            devices: &devices,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Target devices ({} source, option {})",
        "→".green(),
        ctx.config.source.to_string().cyan(),
        option.to_string().yellow()
    );

    if devices.is_empty() {
        println!("  No devices available.");
        return Ok(());
    }

    println!("{}", render_table(&devices));
    Ok(())
}

fn render_table(devices: &[DeviceWrapper<u32>]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Name", "Type", "Feature level"]);

    for (position, device) in devices.iter().enumerate() {
        let kind = if device.is_cpu() {
            Cell::new(device.kind).fg(Color::Yellow)
        } else {
            Cell::new(device.kind).fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(position),
            Cell::new(&device.name),
            kind,
            Cell::new(feature_level::describe(device.feature_level)),
        ]);
    }

    table
}
