//! Delegate Testing Framework
//!
//! Scripted device sources for exercising enumeration and negotiation
//! without accelerator hardware.

pub mod mock;

pub use mock::{MockDeviceSource, QueryRecord};
