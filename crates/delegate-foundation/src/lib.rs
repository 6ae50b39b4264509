//! # delegate-foundation
//!
//! Target device selection and feature-level negotiation for accelerator
//! delegation.
//!
//! ## Quick Start
//!
//! ```rust
//! use delegate_foundation::source::StaticDeviceSource;
//! use delegate_foundation::{get_effective_feature_level_from_option, get_target_devices};
//! use delegate_kernel::{DeviceKind, NegotiationContext, TargetDeviceOption};
//!
//! let source = StaticDeviceSource::new(delegate_kernel::feature_level::LEVEL_8)
//!     .with_device("cpu", DeviceKind::Cpu, 1000)
//!     .with_device("gpu0", DeviceKind::Gpu, 30);
//! let ctx = NegotiationContext::default();
//!
//! let devices = get_target_devices(&source, &ctx, TargetDeviceOption::All).unwrap();
//! assert_eq!(devices.last().unwrap().name, "cpu");
//!
//! let level = get_effective_feature_level_from_option(&source, &ctx, TargetDeviceOption::CpuDisabled);
//! assert_eq!(level, 30);
//! ```

pub mod describe;
pub mod enumerate;
pub mod negotiate;
pub mod source;

pub use describe::describe_devices;
pub use enumerate::get_target_devices;
pub use negotiate::{
    Negotiation, Negotiator, get_effective_feature_level, get_effective_feature_level_from_option,
    get_runtime_feature_level, negotiate,
};
