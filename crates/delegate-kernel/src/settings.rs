//! Top-level configuration for device selection and negotiation

use crate::context::NegotiationContext;
use crate::device::{DeviceKind, TargetDeviceOption};
use crate::feature_level::{FeatureLevel, LEVEL_7, LEVEL_8};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which [`DeviceSource`](crate::source::DeviceSource) backs enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Probe the local machine
    #[default]
    Host,
    /// Serve the `devices` list from configuration
    Static,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Host => write!(f, "host"),
            SourceKind::Static => write!(f, "static"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" => Ok(SourceKind::Host),
            "static" => Ok(SourceKind::Static),
            other => Err(format!("unknown device source '{other}' (expected host or static)")),
        }
    }
}

/// Settings for the host-probing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Runtime level the host source advertises
    pub advertised_feature_level: FeatureLevel,
    /// Level reported for every detected GPU
    pub gpu_feature_level: FeatureLevel,
    /// Expose the host CPU as a reference device
    pub include_cpu: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            advertised_feature_level: LEVEL_8,
            gpu_feature_level: LEVEL_7,
            include_cpu: true,
        }
    }
}

/// One device served by the static source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDevice {
    pub name: String,
    pub kind: DeviceKind,
    pub feature_level: FeatureLevel,
}

impl StaticDevice {
    pub fn new(name: impl Into<String>, kind: DeviceKind, feature_level: FeatureLevel) -> Self {
        Self {
            name: name.into(),
            kind,
            feature_level,
        }
    }
}

/// Complete configuration file layout.
///
/// ```toml
/// target_device_option = "cpu_disabled"
/// source = "static"
///
/// [negotiation]
/// platform_api_level = 30
///
/// [[devices]]
/// name = "gpu0"
/// kind = "gpu"
/// feature_level = 29
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegateConfig {
    pub target_device_option: TargetDeviceOption,
    pub source: SourceKind,
    pub negotiation: NegotiationContext,
    pub host: HostSettings,
    pub devices: Vec<StaticDevice>,
}

impl DelegateConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.negotiation.validate().map_err(str::to_string)?;

        if let Some(index) = self.devices.iter().position(|d| d.name.trim().is_empty()) {
            return Err(format!("devices[{index}].name must not be empty"));
        }

        if self.source == SourceKind::Static && self.devices.is_empty() {
            tracing::debug!("static device source configured without devices");
        }

        Ok(())
    }
}
