//! Device discovery on the local machine
//!
//! Finds GPUs through filesystem probes and vendor tools rather than linking
//! GPU libraries at compile time:
//! CUDA (`nvidia-smi`) → ROCm (`/dev/kfd` + `rocm-smi`) → Vulkan render
//! nodes (`/dev/dri/renderD*`, only when no vendor GPU was found) → CPU.
//!
//! The CPU is exposed as the reference device with
//! [`REFERENCE_CPU`](delegate_kernel::feature_level::REFERENCE_CPU).

use super::fixed::StaticDeviceSource;
use delegate_kernel::feature_level::REFERENCE_CPU;
use delegate_kernel::{DeviceKind, HostSettings, StaticDevice};
use std::path::Path;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug;

/// Probe the host and serve what was found.
///
/// Runs vendor tools synchronously; call it once at startup.
pub fn detect_host_source(settings: &HostSettings) -> StaticDeviceSource {
    StaticDeviceSource::from_devices(settings.advertised_feature_level, detect_devices(settings))
}

/// Devices found on this host, in discovery order.
pub fn detect_devices(settings: &HostSettings) -> Vec<StaticDevice> {
    let mut devices = Vec::new();

    devices.extend(
        detect_cuda()
            .into_iter()
            .map(|name| StaticDevice::new(name, DeviceKind::Gpu, settings.gpu_feature_level)),
    );
    devices.extend(
        detect_rocm()
            .into_iter()
            .map(|name| StaticDevice::new(name, DeviceKind::Gpu, settings.gpu_feature_level)),
    );

    if devices.is_empty() {
        devices.extend(
            detect_vulkan()
                .into_iter()
                .map(|name| StaticDevice::new(name, DeviceKind::Gpu, settings.gpu_feature_level)),
        );
    }

    if settings.include_cpu {
        devices.push(StaticDevice::new(cpu_name(), DeviceKind::Cpu, REFERENCE_CPU));
    }

    debug!(count = devices.len(), "host devices detected");
    devices
}

// ============================================================================
// Backend detection helpers
// ============================================================================

/// One name per NVIDIA GPU listed by `nvidia-smi`.
fn detect_cuda() -> Vec<String> {
    let output = match std::process::Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return Vec::new(),
    };

    parse_gpu_names(&String::from_utf8_lossy(&output.stdout), "cuda")
}

/// One name per AMD GPU listed by `rocm-smi`, when the KFD driver is loaded.
fn detect_rocm() -> Vec<String> {
    if !Path::new("/dev/kfd").exists() {
        return Vec::new();
    }

    let output = match std::process::Command::new("rocm-smi")
        .args(["--showproductname", "--csv"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return Vec::new(),
    };

    parse_rocm_csv(&String::from_utf8_lossy(&output.stdout))
}

/// One name per DRM render node.
fn detect_vulkan() -> Vec<String> {
    let Ok(entries) = std::fs::read_dir("/dev/dri") else {
        return Vec::new();
    };

    let mut nodes: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with("renderD"))
        .map(|name| format!("vulkan:{name}"))
        .collect();
    nodes.sort();
    nodes
}

fn cpu_name() -> String {
    let sys = System::new_with_specifics(
        RefreshKind::new().with_cpu(CpuRefreshKind::new()),
    );
    let cores = sys.cpus().len();
    match sys.cpus().first().map(|cpu| cpu.brand().trim()) {
        Some(brand) if !brand.is_empty() => format!("cpu ({brand}, {cores} threads)"),
        _ => "cpu".to_string(),
    }
}

/// `nvidia-smi --format=csv,noheader` prints one GPU name per line.
fn parse_gpu_names(stdout: &str, prefix: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, name)| format!("{prefix}:{i} {name}"))
        .collect()
}

/// rocm-smi CSV: `device,Card series,Card model,...` with a header row.
fn parse_rocm_csv(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            let series = line.split(',').nth(1).map(str::trim).unwrap_or_default();
            if series.is_empty() {
                format!("rocm:{i}")
            } else {
                format!("rocm:{i} {series}")
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use delegate_kernel::DeviceSource;

    #[test]
    fn test_parse_gpu_names() {
        let names = parse_gpu_names("NVIDIA A100\n\nNVIDIA L4\n", "cuda");
        assert_eq!(names, ["cuda:0 NVIDIA A100", "cuda:1 NVIDIA L4"]);
    }

    #[test]
    fn test_parse_rocm_csv() {
        let csv = "device,Card series,Card model\ncard0,Instinct MI210,0x740f\ncard1,,0x740f\n";
        assert_eq!(parse_rocm_csv(csv), ["rocm:0 Instinct MI210", "rocm:1"]);
    }

    #[test]
    fn test_detect_includes_cpu_last() {
        let devices = detect_devices(&HostSettings::default());
        let last = devices.last().expect("cpu device");
        assert_eq!(last.kind, DeviceKind::Cpu);
        assert_eq!(last.feature_level, REFERENCE_CPU);
        assert_eq!(
            devices.iter().filter(|d| d.kind == DeviceKind::Cpu).count(),
            1
        );
    }

    #[test]
    fn test_detect_without_cpu() {
        let settings = HostSettings {
            include_cpu: false,
            ..Default::default()
        };
        assert!(detect_devices(&settings).iter().all(|d| d.kind != DeviceKind::Cpu));
    }

    #[test]
    fn test_host_source_advertises_configured_level() {
        let settings = HostSettings {
            advertised_feature_level: 30,
            ..Default::default()
        };
        assert_eq!(detect_host_source(&settings).runtime_feature_level(), 30);
    }
}
