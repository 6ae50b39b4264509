//! Feature-level vocabulary shared by every device source.
//!
//! A feature level is an integer capability version: a device or runtime at
//! level `n` supports every operator set of the levels below it. The first
//! five levels follow platform API numbering; later levels jumped to the
//! `1_000_00x` range so they never collide with platform API levels.

/// Integer capability version reported by runtimes and devices.
pub type FeatureLevel = i64;

pub const LEVEL_1: FeatureLevel = 27;
pub const LEVEL_2: FeatureLevel = 28;
pub const LEVEL_3: FeatureLevel = 29;
pub const LEVEL_4: FeatureLevel = 30;
pub const LEVEL_5: FeatureLevel = 31;
pub const LEVEL_6: FeatureLevel = 1_000_006;
pub const LEVEL_7: FeatureLevel = 1_000_007;
pub const LEVEL_8: FeatureLevel = 1_000_008;

/// Level reported by the non-accelerated reference (CPU) implementation.
///
/// It is larger than every platform-numbered level, so a reference device in
/// a collection never lowers a negotiated level below the runtime level.
pub const REFERENCE_CPU: FeatureLevel = 1000;

/// Negotiation failed; no operator is eligible for delegation.
pub const UNSUPPORTED: FeatureLevel = -1;

/// Device enumeration is only available from this runtime level on.
pub const MIN_ENUMERATION_LEVEL: FeatureLevel = LEVEL_3;

/// Platform API level from which the advertised runtime level is trusted.
pub const DEFAULT_PLATFORM_CEILING: FeatureLevel = 31;

/// All named levels in ascending order.
pub const NAMED_LEVELS: [FeatureLevel; 8] = [
    LEVEL_1, LEVEL_2, LEVEL_3, LEVEL_4, LEVEL_5, LEVEL_6, LEVEL_7, LEVEL_8,
];

/// Readable label for a well-known level, `None` for anything else.
pub fn name(level: FeatureLevel) -> Option<&'static str> {
    match level {
        LEVEL_1 => Some("level-1"),
        LEVEL_2 => Some("level-2"),
        LEVEL_3 => Some("level-3"),
        LEVEL_4 => Some("level-4"),
        LEVEL_5 => Some("level-5"),
        LEVEL_6 => Some("level-6"),
        LEVEL_7 => Some("level-7"),
        LEVEL_8 => Some("level-8"),
        REFERENCE_CPU => Some("reference-cpu"),
        UNSUPPORTED => Some("unsupported"),
        _ => None,
    }
}

/// `name(level)` when known, the plain number otherwise.
pub fn describe(level: FeatureLevel) -> String {
    match name(level) {
        Some(label) => format!("{level} ({label})"),
        None => level.to_string(),
    }
}
