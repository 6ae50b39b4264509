//! `delegate doctor` - check that delegation can negotiate a level

use crate::context::{CliContext, load_config};
use colored::Colorize;
use delegate_foundation::Negotiator;
use delegate_foundation::source::StaticDeviceSource;
use delegate_kernel::feature_level::{self, UNSUPPORTED};
use delegate_kernel::{DelegateConfig, DeviceWrapper, SourceKind, TargetDeviceOption};
use serde::Serialize;
use std::path::Path;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoctorSeverity {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub id: String,
    pub title: String,
    pub severity: DoctorSeverity,
    pub details: String,
    pub recommendation: Option<String>,
}

impl DoctorCheck {
    fn new(id: &str, title: &str, severity: DoctorSeverity, details: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            severity,
            details: details.into(),
            recommendation: None,
        }
    }

    fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub source: Option<String>,
    pub strict: bool,
    pub summary: DoctorSummary,
    pub checks: Vec<DoctorCheck>,
}

pub fn run(
    config_path: Option<&Path>,
    source: Option<SourceKind>,
    strict: bool,
    json: bool,
) -> anyhow::Result<()> {
    let report = build_report(config_path, source, strict);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if strict && report.summary.failed > 0 {
        anyhow::bail!(
            "doctor strict mode failed with {} failing checks",
            report.summary.failed
        );
    }

    Ok(())
}

fn build_report(
    config_path: Option<&Path>,
    source: Option<SourceKind>,
    strict: bool,
) -> DoctorReport {
    let mut checks = vec![];

    let config = match load_config(config_path) {
        Ok(mut config) => {
            if let Some(source) = source {
                config.source = source;
            }
            checks.push(DoctorCheck::new(
                "config",
                "Configuration",
                DoctorSeverity::Pass,
                match config_path {
                    Some(path) => format!("Loaded {}", path.display()),
                    None => "Using defaults and DELEGATE_* environment overrides".to_string(),
                },
            ));
            Some(config)
        }
        Err(err) => {
            checks.push(
                DoctorCheck::new(
                    "config",
                    "Configuration",
                    DoctorSeverity::Fail,
                    format!("{err:#}"),
                )
                .recommend("Fix the configuration file or pass a valid one with --config."),
            );
            None
        }
    };

    let source_name = config.as_ref().map(|c| c.source.to_string());
    if let Some(config) = config {
        let ctx = CliContext::from_config(config);
        checks.extend(negotiation_checks(&ctx.config, &ctx.negotiator));
    }

    let summary = summarize_checks(&checks);

    DoctorReport {
        source: source_name,
        strict,
        summary,
        checks,
    }
}

fn negotiation_checks(
    config: &DelegateConfig,
    negotiator: &Negotiator<StaticDeviceSource>,
) -> Vec<DoctorCheck> {
    let mut checks = vec![];
    let ctx = negotiator.context();

    let runtime_level = negotiator.runtime_feature_level();
    if runtime_level >= ctx.min_enumeration_level {
        checks.push(DoctorCheck::new(
            "runtime-level",
            "Runtime supports device enumeration",
            DoctorSeverity::Pass,
            format!("Runtime level {}", feature_level::describe(runtime_level)),
        ));
    } else {
        checks.push(
            DoctorCheck::new(
                "runtime-level",
                "Runtime supports device enumeration",
                DoctorSeverity::Warn,
                format!(
                    "Runtime level {} is below {}; no devices will be enumerated",
                    feature_level::describe(runtime_level),
                    ctx.min_enumeration_level
                ),
            )
            .recommend("Negotiation falls back to the runtime level."),
        );
    }

    let devices = match negotiator.target_devices(TargetDeviceOption::All) {
        Ok(devices) => {
            checks.push(DoctorCheck::new(
                "enumeration",
                "Device enumeration",
                DoctorSeverity::Pass,
                format!("{} device(s) enumerated", devices.len()),
            ));
            devices
        }
        Err(report) => {
            checks.push(
                DoctorCheck::new(
                    "enumeration",
                    "Device enumeration",
                    DoctorSeverity::Fail,
                    format!("{report:?}"),
                )
                .recommend("Delegation will refuse every operator until enumeration succeeds."),
            );
            Vec::new()
        }
    };

    if devices.iter().any(|d| !d.is_cpu()) {
        checks.push(DoctorCheck::new(
            "accelerators",
            "Accelerator devices",
            DoctorSeverity::Pass,
            format!(
                "{} non-CPU device(s)",
                devices.iter().filter(|d| !d.is_cpu()).count()
            ),
        ));
    } else {
        checks.push(
            DoctorCheck::new(
                "accelerators",
                "Accelerator devices",
                DoctorSeverity::Warn,
                "No accelerator found; only the CPU reference device can run delegated operators",
            )
            .recommend(match config.source {
                SourceKind::Host => "Install GPU drivers and vendor tools, or use --source static.",
                SourceKind::Static => "Add accelerator entries to [[devices]].",
            }),
        );
    }

    // Only one CPU device has to be last; further CPU devices may stay earlier
    match devices.last() {
        Some(last) if last.is_cpu() => checks.push(DoctorCheck::new(
            "cpu-last",
            "CPU device ordered last",
            DoctorSeverity::Pass,
            format!("CPU device '{}' is last", last.name),
        )),
        Some(last) if devices.iter().any(DeviceWrapper::is_cpu) => checks.push(DoctorCheck::new(
            "cpu-last",
            "CPU device ordered last",
            DoctorSeverity::Fail,
            format!("Last device '{}' is {}, not a CPU", last.name, last.kind),
        )),
        _ => checks.push(DoctorCheck::new(
            "cpu-last",
            "CPU device ordered last",
            DoctorSeverity::Pass,
            "No CPU device enumerated",
        )),
    }

    let outcome = negotiator.negotiate(config.target_device_option);
    let effective = feature_level::describe(outcome.effective_level);
    let check = if outcome.effective_level == UNSUPPORTED {
        DoctorCheck::new(
            "effective-level",
            "Effective feature level",
            DoctorSeverity::Fail,
            format!("Negotiation failed for option {}", outcome.option),
        )
    } else if outcome.is_downgraded() {
        DoctorCheck::new(
            "effective-level",
            "Effective feature level",
            DoctorSeverity::Warn,
            format!(
                "Lowered from {} to {effective} by the target devices",
                feature_level::describe(outcome.runtime_level)
            ),
        )
    } else {
        DoctorCheck::new(
            "effective-level",
            "Effective feature level",
            DoctorSeverity::Pass,
            format!("{effective} for option {}", outcome.option),
        )
    };
    checks.push(check);

    checks
}

fn summarize_checks(checks: &[DoctorCheck]) -> DoctorSummary {
    let count = |severity| checks.iter().filter(|c| c.severity == severity).count();

    DoctorSummary {
        passed: count(DoctorSeverity::Pass),
        warnings: count(DoctorSeverity::Warn),
        failed: count(DoctorSeverity::Fail),
    }
}

fn print_report(report: &DoctorReport) {
    println!("{} Delegate Doctor Report", "→".green());
    if let Some(source) = &report.source {
        println!("  Source: {}", source.cyan());
    }
    println!(
        "  Strict mode: {}",
        if report.strict { "on" } else { "off" }
    );
    println!();

    for check in &report.checks {
        let (icon, colorized_title) = match check.severity {
            DoctorSeverity::Pass => ("✓".green(), check.title.green()),
            DoctorSeverity::Warn => ("!".yellow(), check.title.yellow()),
            DoctorSeverity::Fail => ("✗".red(), check.title.red()),
        };

        println!("{} {} [{}]", icon, colorized_title, check.id);
        println!("    {}", check.details);
        if let Some(recommendation) = &check.recommendation {
            println!("    Recommendation: {}", recommendation);
        }
    }

    println!();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        report.summary.passed.to_string().green(),
        report.summary.warnings.to_string().yellow(),
        report.summary.failed.to_string().red()
    );
}
