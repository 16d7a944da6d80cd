//! Modifier domain model.
//!
//! # Responsibility
//! - Define the catalogue of notational modifiers and their default effects.
//! - Provide validated construction for modifiers with custom deltas.
//!
//! # Invariants
//! - A `Modifier` is immutable after construction, except for the modulator
//!   flag which only a `Sequence` may set.
//! - `id` is unique per constructed modifier and is the identity used for
//!   attach/detach bookkeeping.
//! - A zero delta means "no effect" on the corresponding attribute.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identity of one modifier instance.
pub type ModifierId = Uuid;

/// Largest magnitude accepted for `dynamic_delta`.
pub const MAX_DYNAMIC_DELTA: i32 = 15;

/// Kind tag of a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    Dot,
    DoubleDot,
    Accent,
    Marcato,
    Staccato,
    Tenuto,
    Diddle,
    Buzz,
    Flam,
    Drag,
    ThreeStrokeDrag,
    StartRepeat,
    EndRepeat,
    RepeatBar,
}

/// Broad family a modifier kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierCategory {
    Duration,
    Articulation,
    Tremolo,
    GraceNote,
    RepeatAndJump,
}

/// Placement of a modifier around a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Head,
    Stem,
    Tail,
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl Location {
    /// Locations that own a slot on a note. `Center` has none.
    pub const SLOTS: [Location; 7] = [
        Location::Head,
        Location::Stem,
        Location::Tail,
        Location::Top,
        Location::Bottom,
        Location::Left,
        Location::Right,
    ];

    /// Head, stem and tail hold at most one modifier.
    pub fn is_single_slot(self) -> bool {
        matches!(self, Self::Head | Self::Stem | Self::Tail)
    }
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 14] = [
        ModifierKind::Dot,
        ModifierKind::DoubleDot,
        ModifierKind::Accent,
        ModifierKind::Marcato,
        ModifierKind::Staccato,
        ModifierKind::Tenuto,
        ModifierKind::Diddle,
        ModifierKind::Buzz,
        ModifierKind::Flam,
        ModifierKind::Drag,
        ModifierKind::ThreeStrokeDrag,
        ModifierKind::StartRepeat,
        ModifierKind::EndRepeat,
        ModifierKind::RepeatBar,
    ];

    /// Display name, e.g. `ThreeStrokeDrag`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dot => "Dot",
            Self::DoubleDot => "DoubleDot",
            Self::Accent => "Accent",
            Self::Marcato => "Marcato",
            Self::Staccato => "Staccato",
            Self::Tenuto => "Tenuto",
            Self::Diddle => "Diddle",
            Self::Buzz => "Buzz",
            Self::Flam => "Flam",
            Self::Drag => "Drag",
            Self::ThreeStrokeDrag => "ThreeStrokeDrag",
            Self::StartRepeat => "StartRepeat",
            Self::EndRepeat => "EndRepeat",
            Self::RepeatBar => "RepeatBar",
        }
    }

    pub fn category(self) -> ModifierCategory {
        match self {
            Self::Dot | Self::DoubleDot => ModifierCategory::Duration,
            Self::Accent | Self::Marcato | Self::Staccato | Self::Tenuto => {
                ModifierCategory::Articulation
            }
            Self::Diddle | Self::Buzz => ModifierCategory::Tremolo,
            Self::Flam | Self::Drag | Self::ThreeStrokeDrag => ModifierCategory::GraceNote,
            Self::StartRepeat | Self::EndRepeat | Self::RepeatBar => {
                ModifierCategory::RepeatAndJump
            }
        }
    }

    pub fn default_location(self) -> Location {
        match self {
            Self::Dot | Self::DoubleDot | Self::EndRepeat => Location::Right,
            Self::Accent | Self::Marcato | Self::Staccato | Self::Tenuto => Location::Top,
            Self::Diddle | Self::Buzz => Location::Stem,
            Self::Flam | Self::Drag | Self::ThreeStrokeDrag | Self::StartRepeat => Location::Left,
            Self::RepeatBar => Location::Center,
        }
    }

    /// Fraction added to the base duration (`0.5` turns a quarter into a
    /// dotted quarter).
    pub fn default_duration_delta(self) -> f64 {
        match self {
            Self::Dot => 0.5,
            Self::DoubleDot => 0.75,
            _ => 0.0,
        }
    }

    /// Articulations carry the level they impose; other kinds are neutral.
    pub fn default_dynamic_delta(self) -> i32 {
        match self {
            Self::Accent => 12,
            Self::Marcato => 15,
            Self::Staccato => 6,
            Self::Tenuto => 9,
            _ => 0,
        }
    }
}

impl Display for ModifierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Validation errors for custom modifier deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierValidationError {
    /// `duration_delta` was NaN or infinite.
    NonFiniteDurationDelta,
    /// `duration_delta <= -1` would make the note duration non-positive.
    DurationDeltaCollapses(f64),
    /// `dynamic_delta` magnitude exceeds the dynamic range.
    DynamicDeltaOutOfRange(i32),
}

impl Display for ModifierValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteDurationDelta => write!(f, "duration_delta must be finite"),
            Self::DurationDeltaCollapses(value) => {
                write!(f, "duration_delta ({value}) must be > -1")
            }
            Self::DynamicDeltaOutOfRange(value) => write!(
                f,
                "dynamic_delta ({value}) must be within -{MAX_DYNAMIC_DELTA}..={MAX_DYNAMIC_DELTA}"
            ),
        }
    }
}

impl Error for ModifierValidationError {}

/// One notational effect that can be attached to a note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Modifier {
    id: ModifierId,
    kind: ModifierKind,
    location: Location,
    duration_delta: f64,
    dynamic_delta: i32,
    is_modulator: bool,
}

impl Modifier {
    /// Creates a modifier with the catalogue defaults for `kind`.
    pub fn new(kind: ModifierKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            location: kind.default_location(),
            duration_delta: kind.default_duration_delta(),
            dynamic_delta: kind.default_dynamic_delta(),
            is_modulator: false,
        }
    }

    /// Creates a modifier with explicit placement and deltas.
    ///
    /// # Errors
    /// - `NonFiniteDurationDelta` / `DurationDeltaCollapses` for unusable
    ///   duration deltas.
    /// - `DynamicDeltaOutOfRange` when `|dynamic_delta| > 15`.
    pub fn custom(
        kind: ModifierKind,
        location: Location,
        duration_delta: f64,
        dynamic_delta: i32,
    ) -> Result<Self, ModifierValidationError> {
        if !duration_delta.is_finite() {
            return Err(ModifierValidationError::NonFiniteDurationDelta);
        }
        if duration_delta <= -1.0 {
            return Err(ModifierValidationError::DurationDeltaCollapses(
                duration_delta,
            ));
        }
        if dynamic_delta.unsigned_abs() > MAX_DYNAMIC_DELTA.unsigned_abs() {
            return Err(ModifierValidationError::DynamicDeltaOutOfRange(
                dynamic_delta,
            ));
        }

        Ok(Self {
            location,
            duration_delta,
            dynamic_delta,
            ..Self::new(kind)
        })
    }

    /// Returns the same modifier placed at `location`.
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn id(&self) -> ModifierId {
        self.id
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn category(&self) -> ModifierCategory {
        self.kind.category()
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn duration_delta(&self) -> f64 {
        self.duration_delta
    }

    pub fn dynamic_delta(&self) -> i32 {
        self.dynamic_delta
    }

    /// Whether this modifier travels between notes of a sequence.
    pub fn is_modulator(&self) -> bool {
        self.is_modulator
    }

    pub fn has_duration_effect(&self) -> bool {
        self.duration_delta != 0.0
    }

    pub fn has_dynamic_effect(&self) -> bool {
        self.dynamic_delta != 0
    }

    pub(crate) fn mark_modulator(&mut self) {
        self.is_modulator = true;
    }

    /// Copy with a new identity, used when duplicating notes.
    pub(crate) fn with_fresh_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}
