//! Concrete [`DeviceSource`](delegate_kernel::DeviceSource) implementations

pub mod fixed;
pub mod host;

pub use fixed::{DeviceQuery, StaticDeviceSource};
pub use host::{detect_devices, detect_host_source};

use delegate_kernel::feature_level::LEVEL_8;
use delegate_kernel::{DelegateConfig, SourceKind};

/// Build the source a configuration asks for.
///
/// Static sources advertise [`LEVEL_8`]; set
/// `negotiation.runtime_feature_level` to model an older runtime.
pub fn source_from_config(config: &DelegateConfig) -> StaticDeviceSource {
    match config.source {
        SourceKind::Host => detect_host_source(&config.host),
        SourceKind::Static => StaticDeviceSource::from_devices(LEVEL_8, config.devices.clone()),
    }
}
