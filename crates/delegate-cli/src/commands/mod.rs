//! CLI command implementations

pub mod devices;
pub mod doctor;
pub mod level;
