//! Log rendering of device collections.

use delegate_kernel::DeviceWrapper;
use std::fmt::Write;

/// Render every device's name and kind, in input order.
///
/// Meant for log lines only; the layout is not stable.
pub fn describe_devices<H>(devices: &[DeviceWrapper<H>]) -> String {
    devices.iter().fold(String::new(), |mut out, device| {
        let _ = write!(out, "[Name: [{}], Type [{}]], ", device.name, device.kind);
        out
    })
}
