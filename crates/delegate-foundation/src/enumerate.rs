//! Target device enumeration
//!
//! Collects every device the source exposes, drops the ones the
//! [`TargetDeviceOption`] excludes and moves the CPU device to the end.
//! The accelerator runtime tries devices in order and skips the last one
//! once an earlier device accepted an operation, so the reference CPU
//! device only picks up what nothing else supports.

use crate::negotiate::get_runtime_feature_level;
use delegate_kernel::error::{EnumerationError, EnumerationResult};
use delegate_kernel::{DeviceSource, DeviceWrapper, NegotiationContext, TargetDeviceOption};
use error_stack::{Report, ResultExt};
use tracing::debug;

/// Enumerate the devices delegation may target.
///
/// Returns an empty list when the runtime level is below
/// `ctx.min_enumeration_level`. Any failing query aborts the whole call and
/// discards what was collected so far.
///
/// If a CPU device is kept it ends up last. Only the first CPU device kept
/// is moved; further CPU devices stay where filtering left them.
pub fn get_target_devices<S>(
    source: &S,
    ctx: &NegotiationContext,
    option: TargetDeviceOption,
) -> EnumerationResult<Vec<DeviceWrapper<S::Handle>>>
where
    S: DeviceSource + ?Sized,
{
    let runtime_level = get_runtime_feature_level(source, ctx);
    if runtime_level < ctx.min_enumeration_level {
        debug!(
            runtime_level,
            min_level = ctx.min_enumeration_level,
            "device enumeration not supported at this runtime level"
        );
        return Ok(Vec::new());
    }

    let count = source
        .device_count()
        .map_err(|e| Report::new(EnumerationError::from(e)))
        .attach("Getting count of available devices")?;

    // `count` is untrusted until every device has been described
    let mut devices = Vec::with_capacity(count.min(64) as usize);
    let mut cpu_index = None;

    for index in 0..count {
        let device = source.describe(index)?;

        if !option.admits(device.kind) {
            debug!(index, device = %device.name, kind = %device.kind, %option, "device filtered out");
            continue;
        }

        if device.is_cpu() && cpu_index.is_none() {
            cpu_index = Some(devices.len());
        }

        debug!(
            index,
            device = %device.name,
            kind = %device.kind,
            feature_level = device.feature_level,
            "target device"
        );
        devices.push(device);
    }

    if let Some(cpu_index) = cpu_index {
        let last = devices.len() - 1;
        if cpu_index != last {
            devices.swap(cpu_index, last);
        }
    }

    Ok(devices)
}
