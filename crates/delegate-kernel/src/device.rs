//! Device model for accelerator delegation
//!
//! A [`DeviceWrapper`] is the runtime's view of one device exposed by an
//! accelerator enumeration API. The opaque handle stays owned by the
//! [`DeviceSource`](crate::source::DeviceSource) that produced it.

use crate::feature_level::FeatureLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of an enumerated device, as reported by the accelerator API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DeviceKind {
    /// The API could not classify the device
    #[default]
    Unknown,
    /// Anything that is neither CPU, GPU nor a dedicated accelerator
    Other,
    /// Software fallback running on the host CPU
    Cpu,
    /// Graphics processor
    Gpu,
    /// Dedicated accelerator (DSP, NPU, TPU ...)
    Accelerator,
}

impl DeviceKind {
    /// Map the raw type code reported by the accelerator API.
    ///
    /// Unrecognised codes map to [`DeviceKind::Unknown`].
    pub fn from_raw(code: i32) -> Self {
        match code {
            1 => DeviceKind::Other,
            2 => DeviceKind::Cpu,
            3 => DeviceKind::Gpu,
            4 => DeviceKind::Accelerator,
            _ => DeviceKind::Unknown,
        }
    }

    /// Raw type code understood by the accelerator API.
    pub fn as_raw(self) -> i32 {
        match self {
            DeviceKind::Unknown => 0,
            DeviceKind::Other => 1,
            DeviceKind::Cpu => 2,
            DeviceKind::Gpu => 3,
            DeviceKind::Accelerator => 4,
        }
    }

    pub fn is_cpu(self) -> bool {
        self == DeviceKind::Cpu
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Unknown => write!(f, "unknown"),
            DeviceKind::Other => write!(f, "other"),
            DeviceKind::Cpu => write!(f, "cpu"),
            DeviceKind::Gpu => write!(f, "gpu"),
            DeviceKind::Accelerator => write!(f, "accelerator"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Ok(DeviceKind::Unknown),
            "other" => Ok(DeviceKind::Other),
            "cpu" => Ok(DeviceKind::Cpu),
            "gpu" => Ok(DeviceKind::Gpu),
            "accelerator" | "npu" | "dsp" | "tpu" => Ok(DeviceKind::Accelerator),
            other => Err(format!("unknown device kind '{other}'")),
        }
    }
}

/// One enumerated device.
///
/// Created once per enumeration and never mutated afterwards. The handle is
/// whatever the source hands out (an index, an id, a borrowed pointer) and
/// must not be used after the enumeration it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceWrapper<H> {
    #[serde(skip)]
    pub handle: H,
    pub name: String,
    pub kind: DeviceKind,
    pub feature_level: FeatureLevel,
}

impl<H> DeviceWrapper<H> {
    pub fn new(
        handle: H,
        name: impl Into<String>,
        kind: DeviceKind,
        feature_level: FeatureLevel,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            kind,
            feature_level,
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.kind.is_cpu()
    }
}

/// Which devices delegation may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDeviceOption {
    /// Keep every enumerated device
    #[default]
    #[serde(alias = "any")]
    All,
    /// Keep only CPU devices
    CpuOnly,
    /// Drop CPU devices
    CpuDisabled,
}

impl TargetDeviceOption {
    /// Whether a device of the given kind survives this option.
    pub fn admits(self, kind: DeviceKind) -> bool {
        match self {
            TargetDeviceOption::All => true,
            TargetDeviceOption::CpuOnly => kind.is_cpu(),
            TargetDeviceOption::CpuDisabled => !kind.is_cpu(),
        }
    }
}

impl fmt::Display for TargetDeviceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TargetDeviceOption::All => "all",
            TargetDeviceOption::CpuOnly => "cpu-only",
            TargetDeviceOption::CpuDisabled => "cpu-disabled",
        };
        write!(f, "{value}")
    }
}

impl FromStr for TargetDeviceOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all" | "any" => Ok(TargetDeviceOption::All),
            "cpu-only" => Ok(TargetDeviceOption::CpuOnly),
            "cpu-disabled" => Ok(TargetDeviceOption::CpuDisabled),
            other => Err(format!(
                "unknown target device option '{other}' (expected all, cpu-only or cpu-disabled)"
            )),
        }
    }
}
