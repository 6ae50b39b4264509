//! The seam between negotiation logic and an accelerator enumeration API.
//!
//! Production sources bind to real hardware discovery; tests hand in fixed
//! in-memory device lists. Negotiation only ever talks to this trait.

use crate::device::{DeviceKind, DeviceWrapper};
use crate::error::{EnumerationError, EnumerationResult, SourceError};
use crate::feature_level::FeatureLevel;
use error_stack::{Report, ResultExt};
use std::fmt::Debug;

/// Read-only view of an accelerator enumeration API.
///
/// Every query may fail. Handles are owned by the source; callers only hold
/// them for the duration of one enumeration.
pub trait DeviceSource {
    /// Opaque device reference handed out by [`device`](Self::device)
    type Handle: Clone + Debug;

    /// Feature level the accelerator runtime advertises for this process.
    fn runtime_feature_level(&self) -> FeatureLevel;

    /// Number of devices currently exposed.
    fn device_count(&self) -> Result<u32, SourceError>;

    /// Handle of the device at `index`, `0 <= index < device_count()`.
    fn device(&self, index: u32) -> Result<Self::Handle, SourceError>;

    fn device_name(&self, handle: &Self::Handle) -> Result<String, SourceError>;

    fn device_kind(&self, handle: &Self::Handle) -> Result<DeviceKind, SourceError>;

    fn device_feature_level(&self, handle: &Self::Handle) -> Result<FeatureLevel, SourceError>;

    /// Fetch handle, name, kind and feature level of one device.
    ///
    /// Each failing query is annotated with the operation and the device
    /// ordinal, e.g. `"Getting 2th device's type"`.
    fn describe(&self, index: u32) -> EnumerationResult<DeviceWrapper<Self::Handle>> {
        let handle = self
            .device(index)
            .map_err(|e| Report::new(EnumerationError::from(e)))
            .attach(format!("Getting {index}th device"))?;

        let name = self
            .device_name(&handle)
            .map_err(|e| Report::new(EnumerationError::from(e)))
            .attach(format!("Getting {index}th device's name"))?;

        let kind = self
            .device_kind(&handle)
            .map_err(|e| Report::new(EnumerationError::from(e)))
            .attach(format!("Getting {index}th device's type"))?;

        let feature_level = self
            .device_feature_level(&handle)
            .map_err(|e| Report::new(EnumerationError::from(e)))
            .attach(format!("Getting {index}th device's feature level"))?;

        Ok(DeviceWrapper {
            handle,
            name,
            kind,
            feature_level,
        })
    }
}

impl<S: DeviceSource + ?Sized> DeviceSource for &S {
    type Handle = S::Handle;

    fn runtime_feature_level(&self) -> FeatureLevel {
        (**self).runtime_feature_level()
    }

    fn device_count(&self) -> Result<u32, SourceError> {
        (**self).device_count()
    }

    fn device(&self, index: u32) -> Result<Self::Handle, SourceError> {
        (**self).device(index)
    }

    fn device_name(&self, handle: &Self::Handle) -> Result<String, SourceError> {
        (**self).device_name(handle)
    }

    fn device_kind(&self, handle: &Self::Handle) -> Result<DeviceKind, SourceError> {
        (**self).device_kind(handle)
    }

    fn device_feature_level(&self, handle: &Self::Handle) -> Result<FeatureLevel, SourceError> {
        (**self).device_feature_level(handle)
    }

    fn describe(&self, index: u32) -> EnumerationResult<DeviceWrapper<Self::Handle>> {
        (**self).describe(index)
    }
}
