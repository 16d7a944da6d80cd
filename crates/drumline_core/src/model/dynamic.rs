//! Dynamic levels and the marking lookup table.
//!
//! Dynamics are stored as a loudness level in `1..=15`. The marking table is
//! process-wide read-only data.

/// Quietest representable dynamic level.
pub const MIN_DYNAMIC: u8 = 1;
/// Loudest representable dynamic level.
pub const MAX_DYNAMIC: u8 = 15;
/// Level used for notes built without an explicit dynamic (`p`).
pub const DEFAULT_DYNAMIC: u8 = 3;

/// Marking to level mapping, ordered from quietest to loudest.
pub const DYNAMIC_MARKINGS: &[(&str, u8)] = &[
    ("pp", 1),
    ("p", 3),
    ("mp", 6),
    ("mf", 9),
    ("f", 12),
    ("ff", 15),
];

/// Returns the level for a marking such as `mf`, if known.
pub fn dynamic_from_marking(marking: &str) -> Option<u8> {
    let normalized = marking.trim();
    DYNAMIC_MARKINGS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, level)| *level)
}

/// Returns the closest marking at or below `level`.
pub fn marking_for_dynamic(level: u8) -> &'static str {
    DYNAMIC_MARKINGS
        .iter()
        .rev()
        .find(|(_, value)| *value <= level)
        .map(|(name, _)| *name)
        .unwrap_or("pp")
}

/// Returns whether `level` is a representable dynamic.
pub fn is_valid_dynamic(level: i32) -> bool {
    (i32::from(MIN_DYNAMIC)..=i32::from(MAX_DYNAMIC)).contains(&level)
}

pub(crate) fn clamp_dynamic(level: i32) -> u8 {
    // Clamped into 1..=15, so the narrowing cast cannot truncate.
    level.clamp(i32::from(MIN_DYNAMIC), i32::from(MAX_DYNAMIC)) as u8
}

#[cfg(test)]
mod tests {
    use super::{clamp_dynamic, dynamic_from_marking, is_valid_dynamic, marking_for_dynamic};

    #[test]
    fn markings_resolve_to_levels() {
        assert_eq!(dynamic_from_marking("pp"), Some(1));
        assert_eq!(dynamic_from_marking(" mf "), Some(9));
        assert_eq!(dynamic_from_marking("fff"), None);
    }

    #[test]
    fn marking_for_level_rounds_down() {
        assert_eq!(marking_for_dynamic(12), "f");
        assert_eq!(marking_for_dynamic(10), "mf");
        assert_eq!(marking_for_dynamic(2), "pp");
    }

    #[test]
    fn clamp_keeps_levels_in_range() {
        assert_eq!(clamp_dynamic(-4), 1);
        assert_eq!(clamp_dynamic(7), 7);
        assert_eq!(clamp_dynamic(40), 15);
        assert!(!is_valid_dynamic(0));
        assert!(is_valid_dynamic(15));
    }
}
