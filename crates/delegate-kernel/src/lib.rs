//! # delegate-kernel
//!
//! Core vocabulary for accelerator delegation: the device model, the
//! [`DeviceSource`] seam every enumeration API is adapted to, feature-level
//! constants, errors and configuration loading.
//!
//! Negotiation itself lives in `delegate-foundation`.

pub mod context;
pub mod device;
pub mod error;
pub mod feature_level;
pub mod settings;
pub mod source;

#[cfg(feature = "config")]
pub mod config;

pub use context::NegotiationContext;
pub use device::{DeviceKind, DeviceWrapper, TargetDeviceOption};
pub use error::{EnumerationError, EnumerationResult, SourceError};
pub use feature_level::FeatureLevel;
pub use settings::{DelegateConfig, HostSettings, SourceKind, StaticDevice};
pub use source::DeviceSource;
