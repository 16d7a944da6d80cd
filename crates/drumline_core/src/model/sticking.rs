//! Hand assignment and stem direction.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Which hand (or both) plays a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sticking {
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "B")]
    Both,
}

impl Sticking {
    /// One-letter code used in sticking strings (`R`, `L`, `B`).
    pub fn code(self) -> char {
        match self {
            Self::Right => 'R',
            Self::Left => 'L',
            Self::Both => 'B',
        }
    }

    /// Parses a one-letter code. Lowercase codes are accepted.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'R' => Some(Self::Right),
            'L' => Some(Self::Left),
            'B' => Some(Self::Both),
            _ => None,
        }
    }

    /// Returns the opposite hand. `Both` stays `Both`.
    pub fn flipped(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Both => Self::Both,
        }
    }
}

impl Display for Sticking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Sticking text could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StickingParseError {
    /// Input was blank.
    Empty,
    /// Input was not one of `R`, `L`, `B`.
    Unknown(String),
}

impl Display for StickingParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "sticking must not be empty"),
            Self::Unknown(value) => {
                write!(f, "unknown sticking `{value}`; expected R|L|B")
            }
        }
    }
}

impl Error for StickingParseError {}

impl FromStr for Sticking {
    type Err = StickingParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(StickingParseError::Empty),
            (Some(code), None) => {
                Self::from_code(code).ok_or_else(|| StickingParseError::Unknown(trimmed.to_string()))
            }
            _ => Err(StickingParseError::Unknown(trimmed.to_string())),
        }
    }
}

/// Stem direction of a rendered note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemDirection {
    #[default]
    Up,
    Down,
    None,
    Double,
}
