//! Immutable negotiation parameters, read once at startup.

use crate::feature_level::{DEFAULT_PLATFORM_CEILING, FeatureLevel, MIN_ENUMERATION_LEVEL};
use serde::{Deserialize, Serialize};

/// Parameters every negotiation call reads.
///
/// Built from configuration and passed by reference; nothing in here changes
/// after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationContext {
    /// Replaces the level the device source advertises when set.
    pub runtime_feature_level: Option<FeatureLevel>,

    /// API level the operating system reports, on platforms that have one.
    ///
    /// When it is below both `platform_ceiling` and the advertised level,
    /// the runtime level is clamped down to it.
    pub platform_api_level: Option<FeatureLevel>,

    /// Platform API level from which the advertised level is trusted.
    pub platform_ceiling: FeatureLevel,

    /// Runtime level below which devices are not enumerated at all.
    pub min_enumeration_level: FeatureLevel,
}

impl Default for NegotiationContext {
    fn default() -> Self {
        Self {
            runtime_feature_level: None,
            platform_api_level: None,
            platform_ceiling: DEFAULT_PLATFORM_CEILING,
            min_enumeration_level: MIN_ENUMERATION_LEVEL,
        }
    }
}

impl NegotiationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the level the device source advertises
    pub fn with_runtime_feature_level(mut self, level: FeatureLevel) -> Self {
        self.runtime_feature_level = Some(level);
        self
    }

    /// Set the API level reported by the operating system
    pub fn with_platform_api_level(mut self, level: FeatureLevel) -> Self {
        self.platform_api_level = Some(level);
        self
    }

    pub fn with_platform_ceiling(mut self, ceiling: FeatureLevel) -> Result<Self, &'static str> {
        if ceiling <= 0 {
            return Err("platform_ceiling must be > 0");
        }
        self.platform_ceiling = ceiling;
        Ok(self)
    }

    pub fn with_min_enumeration_level(mut self, level: FeatureLevel) -> Result<Self, &'static str> {
        if level <= 0 {
            return Err("min_enumeration_level must be > 0");
        }
        self.min_enumeration_level = level;
        Ok(self)
    }

    /// Check the invariants the builder methods enforce, for contexts that
    /// came out of a deserializer.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.platform_ceiling <= 0 {
            return Err("platform_ceiling must be > 0");
        }
        if self.min_enumeration_level <= 0 {
            return Err("min_enumeration_level must be > 0");
        }
        Ok(())
    }
}
