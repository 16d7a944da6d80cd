//! Sequence configuration.
//!
//! # Responsibility
//! - Hold per-sequence defaults applied when notes omit them.
//! - Validate defaults before a sequence is created.

use crate::model::dynamic::{is_valid_dynamic, DEFAULT_DYNAMIC};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default note duration (a sixteenth note) when none is configured.
pub const DEFAULT_NOTE_DURATION: f64 = 1.0 / 16.0;

/// Defaults for notes added to a `Sequence`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Duration used by `add_note` when no duration is given.
    pub default_duration: f64,
    /// Dynamic level used by `add_note` when no dynamic is given.
    pub default_dynamic: u8,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_NOTE_DURATION,
            default_dynamic: DEFAULT_DYNAMIC,
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    InvalidDefaultDuration(f64),
    InvalidDefaultDynamic(u8),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDefaultDuration(value) => {
                write!(f, "default_duration must be finite and > 0, got {value}")
            }
            Self::InvalidDefaultDynamic(value) => {
                write!(f, "default_dynamic must be within 1..=15, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl SequenceConfig {
    pub fn with_default_duration(default_duration: f64) -> Self {
        Self {
            default_duration,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_duration.is_finite() && self.default_duration > 0.0) {
            return Err(ConfigError::InvalidDefaultDuration(self.default_duration));
        }
        if !is_valid_dynamic(i32::from(self.default_dynamic)) {
            return Err(ConfigError::InvalidDefaultDynamic(self.default_dynamic));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SequenceConfig, DEFAULT_NOTE_DURATION};

    #[test]
    fn default_config_is_valid() {
        let config = SequenceConfig::default();
        assert_eq!(config.default_duration, DEFAULT_NOTE_DURATION);
        assert_eq!(config.default_dynamic, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_defaults() {
        assert_eq!(
            SequenceConfig::with_default_duration(0.0).validate(),
            Err(ConfigError::InvalidDefaultDuration(0.0))
        );
        let loud = SequenceConfig {
            default_dynamic: 16,
            ..SequenceConfig::default()
        };
        assert_eq!(loud.validate(), Err(ConfigError::InvalidDefaultDynamic(16)));
    }
}
