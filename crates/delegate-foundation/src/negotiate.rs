//! Feature-level negotiation
//!
//! The effective level is the runtime level, lowered to the best level among
//! the target devices when every device is weaker than the runtime. Failures
//! never escape [`get_effective_feature_level_from_option`]: a capability
//! probe answers [`UNSUPPORTED`] instead, which makes the delegation
//! pipeline skip every operator rather than abort.

use crate::describe::describe_devices;
use crate::enumerate::get_target_devices;
use delegate_kernel::feature_level::{FeatureLevel, UNSUPPORTED};
use delegate_kernel::{DeviceSource, DeviceWrapper, NegotiationContext, TargetDeviceOption};
use serde::Serialize;
use tracing::{info, warn};

/// Level the accelerator runtime supports on this platform.
///
/// Starts from the context override or the level the source advertises.
/// When the platform reports an API level below both the ceiling and that
/// level, the platform API level wins.
pub fn get_runtime_feature_level<S>(source: &S, ctx: &NegotiationContext) -> FeatureLevel
where
    S: DeviceSource + ?Sized,
{
    let advertised = ctx
        .runtime_feature_level
        .unwrap_or_else(|| source.runtime_feature_level());

    match ctx.platform_api_level {
        Some(api_level) if api_level < ctx.platform_ceiling && api_level < advertised => api_level,
        _ => advertised,
    }
}

/// Effective level for an explicit device collection.
///
/// The best device decides: a single strong device (the reference CPU
/// included) keeps the runtime level even when its peers are weak. An empty
/// collection also keeps the runtime level.
pub fn get_effective_feature_level<S, H>(
    source: &S,
    ctx: &NegotiationContext,
    devices: &[DeviceWrapper<H>],
) -> FeatureLevel
where
    S: DeviceSource + ?Sized,
{
    let runtime_level = get_runtime_feature_level(source, ctx);

    match devices.iter().map(|d| d.feature_level).max() {
        Some(best) if best < runtime_level => {
            info!(
                runtime_level,
                device_level = best,
                "changing feature level to the one supported by target devices"
            );
            best
        }
        _ => runtime_level,
    }
}

/// Enumerate with `option`, then negotiate.
///
/// Returns [`UNSUPPORTED`] (`-1`) when enumeration fails; the failure is
/// logged as a warning.
pub fn get_effective_feature_level_from_option<S>(
    source: &S,
    ctx: &NegotiationContext,
    option: TargetDeviceOption,
) -> FeatureLevel
where
    S: DeviceSource + ?Sized,
{
    match get_target_devices(source, ctx, option) {
        Ok(devices) => get_effective_feature_level(source, ctx, &devices),
        Err(report) => {
            warn!(%option, "get_target_devices failed: {report:?}");
            UNSUPPORTED
        }
    }
}

/// Full outcome of one negotiation.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = ""))]
pub struct Negotiation<H> {
    pub option: TargetDeviceOption,
    /// Runtime level after the platform clamp
    pub runtime_level: FeatureLevel,
    /// Level delegation must not exceed; `-1` when enumeration failed
    pub effective_level: FeatureLevel,
    /// Filtered, ordered target devices; empty when enumeration failed
    pub devices: Vec<DeviceWrapper<H>>,
    /// Rendered enumeration failure, if any
    pub error: Option<String>,
}

impl<H> Negotiation<H> {
    pub fn is_supported(&self) -> bool {
        self.effective_level != UNSUPPORTED
    }

    /// Whether negotiation lowered the level below the runtime level
    pub fn is_downgraded(&self) -> bool {
        self.is_supported() && self.effective_level < self.runtime_level
    }

    /// Log-friendly rendering of the target devices
    pub fn devices_description(&self) -> String {
        describe_devices(&self.devices)
    }
}

/// Like [`get_effective_feature_level_from_option`], keeping the devices.
pub fn negotiate<S>(
    source: &S,
    ctx: &NegotiationContext,
    option: TargetDeviceOption,
) -> Negotiation<S::Handle>
where
    S: DeviceSource + ?Sized,
{
    let runtime_level = get_runtime_feature_level(source, ctx);

    match get_target_devices(source, ctx, option) {
        Ok(devices) => Negotiation {
            option,
            runtime_level,
            effective_level: get_effective_feature_level(source, ctx, &devices),
            devices,
            error: None,
        },
        Err(report) => {
            warn!(%option, "get_target_devices failed: {report:?}");
            Negotiation {
                option,
                runtime_level,
                effective_level: UNSUPPORTED,
                devices: Vec::new(),
                error: Some(format!("{report:?}")),
            }
        }
    }
}

/// A device source bound to its negotiation parameters.
#[derive(Debug, Clone)]
pub struct Negotiator<S> {
    source: S,
    ctx: NegotiationContext,
}

impl<S: DeviceSource> Negotiator<S> {
    pub fn new(source: S, ctx: NegotiationContext) -> Self {
        Self { source, ctx }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn context(&self) -> &NegotiationContext {
        &self.ctx
    }

    pub fn runtime_feature_level(&self) -> FeatureLevel {
        get_runtime_feature_level(&self.source, &self.ctx)
    }

    pub fn target_devices(
        &self,
        option: TargetDeviceOption,
    ) -> delegate_kernel::EnumerationResult<Vec<DeviceWrapper<S::Handle>>> {
        get_target_devices(&self.source, &self.ctx, option)
    }

    pub fn effective_feature_level(&self, devices: &[DeviceWrapper<S::Handle>]) -> FeatureLevel {
        get_effective_feature_level(&self.source, &self.ctx, devices)
    }

    pub fn effective_feature_level_for(&self, option: TargetDeviceOption) -> FeatureLevel {
        get_effective_feature_level_from_option(&self.source, &self.ctx, option)
    }

    pub fn negotiate(&self, option: TargetDeviceOption) -> Negotiation<S::Handle> {
        negotiate(&self.source, &self.ctx, option)
    }
}
