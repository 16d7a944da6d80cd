//! Core notation logic for Drumline.
//! This crate is the single source of truth for modifier and modulator
//! invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod rudiments;
pub mod sequence;

pub use config::{ConfigError, SequenceConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::applicator::{effect_of, DurationRule, DynamicRule, Effect, LocationSlots};
pub use model::dynamic::{
    dynamic_from_marking, marking_for_dynamic, DEFAULT_DYNAMIC, DYNAMIC_MARKINGS,
};
pub use model::modifier::{
    Location, Modifier, ModifierCategory, ModifierId, ModifierKind, ModifierValidationError,
};
pub use model::note::{Dotted, Note, NoteBuilder, NoteError, NoteResult};
pub use model::sticking::{StemDirection, Sticking, StickingParseError};
pub use sequence::{Direction, NoteArgs, NoteOptions, Sequence, SequenceError, SequenceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
