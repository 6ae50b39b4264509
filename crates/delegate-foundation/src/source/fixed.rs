//! Device source backed by a fixed device list
//!
//! Serves devices from configuration or from host detection, and can be
//! told to fail a given query so error paths are reachable without
//! hardware.

use delegate_kernel::feature_level::FeatureLevel;
use delegate_kernel::{DeviceKind, DeviceSource, SourceError, StaticDevice};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code for a query on a device index the source does not have.
pub const BAD_DATA: i32 = 4;
/// Status code for injected query failures.
pub const OP_FAILED: i32 = 5;

/// Query kinds of the enumeration API, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceQuery {
    Count,
    Device,
    Name,
    Kind,
    FeatureLevel,
}

impl fmt::Display for DeviceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DeviceQuery::Count => "count",
            DeviceQuery::Device => "device",
            DeviceQuery::Name => "name",
            DeviceQuery::Kind => "type",
            DeviceQuery::FeatureLevel => "feature level",
        };
        write!(f, "{value}")
    }
}

/// In-memory [`DeviceSource`]; handles are device indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDeviceSource {
    runtime_level: FeatureLevel,
    devices: Vec<StaticDevice>,
    failures: Vec<(DeviceQuery, u32)>,
}

impl StaticDeviceSource {
    /// Empty source advertising `runtime_level`
    pub fn new(runtime_level: FeatureLevel) -> Self {
        Self {
            runtime_level,
            devices: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn from_devices(runtime_level: FeatureLevel, devices: Vec<StaticDevice>) -> Self {
        Self {
            runtime_level,
            devices,
            failures: Vec::new(),
        }
    }

    pub fn with_device(
        mut self,
        name: impl Into<String>,
        kind: DeviceKind,
        feature_level: FeatureLevel,
    ) -> Self {
        self.devices.push(StaticDevice::new(name, kind, feature_level));
        self
    }

    /// Make `query` fail for the device at `index`.
    ///
    /// The index is ignored for [`DeviceQuery::Count`].
    pub fn with_failure(mut self, query: DeviceQuery, index: u32) -> Self {
        self.failures.push((query, index));
        self
    }

    pub fn devices(&self) -> &[StaticDevice] {
        &self.devices
    }

    fn check(&self, query: DeviceQuery, index: u32) -> Result<(), SourceError> {
        let injected = self
            .failures
            .iter()
            .any(|(q, i)| *q == query && (query == DeviceQuery::Count || *i == index));
        if injected {
            return Err(SourceError::new(
                OP_FAILED,
                format!("injected failure for {query} query"),
            ));
        }
        Ok(())
    }

    fn get(&self, index: u32) -> Result<&StaticDevice, SourceError> {
        self.devices.get(index as usize).ok_or_else(|| {
            SourceError::new(
                BAD_DATA,
                format!("no device at index {index} ({} known)", self.devices.len()),
            )
        })
    }
}

impl DeviceSource for StaticDeviceSource {
    type Handle = u32;

    fn runtime_feature_level(&self) -> FeatureLevel {
        self.runtime_level
    }

    fn device_count(&self) -> Result<u32, SourceError> {
        self.check(DeviceQuery::Count, 0)?;
        u32::try_from(self.devices.len())
            .map_err(|_| SourceError::new(BAD_DATA, "too many devices"))
    }

    fn device(&self, index: u32) -> Result<u32, SourceError> {
        self.check(DeviceQuery::Device, index)?;
        self.get(index)?;
        Ok(index)
    }

    fn device_name(&self, handle: &u32) -> Result<String, SourceError> {
        self.check(DeviceQuery::Name, *handle)?;
        Ok(self.get(*handle)?.name.clone())
    }

    fn device_kind(&self, handle: &u32) -> Result<DeviceKind, SourceError> {
        self.check(DeviceQuery::Kind, *handle)?;
        Ok(self.get(*handle)?.kind)
    }

    fn device_feature_level(&self, handle: &u32) -> Result<FeatureLevel, SourceError> {
        self.check(DeviceQuery::FeatureLevel, *handle)?;
        Ok(self.get(*handle)?.feature_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delegate_kernel::feature_level::{LEVEL_5, REFERENCE_CPU};

    #[test]
    fn test_serves_devices_in_order() {
        let source = StaticDeviceSource::new(LEVEL_5)
            .with_device("gpu0", DeviceKind::Gpu, 29)
            .with_device("cpu", DeviceKind::Cpu, REFERENCE_CPU);
        assert_eq!(source.device_count().unwrap(), 2);
        let cpu = source.describe(1).unwrap();
        assert_eq!(cpu.handle, 1);
        assert_eq!(cpu.name, "cpu");
        assert_eq!(cpu.feature_level, REFERENCE_CPU);
    }

    #[test]
    fn test_out_of_range_device() {
        let source = StaticDeviceSource::new(LEVEL_5);
        let err = source.device(0).unwrap_err();
        assert_eq!(err.code, BAD_DATA);
    }

    #[test]
    fn test_injected_failure_only_hits_its_index() {
        let source = StaticDeviceSource::new(LEVEL_5)
            .with_device("gpu0", DeviceKind::Gpu, 29)
            .with_device("dsp", DeviceKind::Accelerator, 30)
            .with_failure(DeviceQuery::Kind, 1);
        assert!(source.describe(0).is_ok());
        let report = source.describe(1).unwrap_err();
        assert_eq!(report.current_context().code(), Some(OP_FAILED));
        assert!(format!("{report:?}").contains("Getting 1th device's type"));
    }

    #[test]
    fn test_count_failure_ignores_index() {
        let source = StaticDeviceSource::new(LEVEL_5).with_failure(DeviceQuery::Count, 7);
        assert_eq!(source.device_count().unwrap_err().code, OP_FAILED);
    }
}
