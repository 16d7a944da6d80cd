//! Ordered note sequences and their modulators.
//!
//! # Responsibility
//! - Own the notes of a rhythm and provide editing operations over them.
//! - Register modulators and route every attachment through `Note::attach`
//!   and `Note::detach_modifier`.
//!
//! # Invariants
//! - Every registered modulator has `is_modulator() == true`.
//! - A registered modulator is held by at most one note at any time, and
//!   only `add_modulator`, `modulate`, `detach_modulator` and `remove_note`
//!   change where it is held.
//! - A modifier identity appears on at most one note.
//! - Failed operations leave notes and modulators unchanged.

mod modulator;

pub use modulator::Direction;

use crate::config::{ConfigError, SequenceConfig};
use crate::model::modifier::{Modifier, ModifierId, ModifierKind};
use crate::model::note::{Dotted, Note, NoteError};
use crate::model::sticking::{StemDirection, Sticking, StickingParseError};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

static STICKING_PATTERN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[RLBrlb_]*$").expect("valid sticking pattern regex"));

pub type SequenceResult<T> = Result<T, SequenceError>;

/// Errors from sequence editing and modulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceError {
    /// `add_note` was called with a blank sticking.
    MissingSticking,
    /// Sticking text is not `R`, `L`, `B` (or `_` inside a pattern).
    InvalidSticking(String),
    /// Position does not address a note.
    IndexOutOfRange { index: isize, len: usize },
    /// More duration values than notes.
    TooManyDurationValues { given: usize, notes: usize },
    /// Direction text is neither `forward` nor `backward`.
    InvalidDirection(String),
    /// Operation needs at least one note.
    EmptySequence,
    /// Modulator name is already registered.
    DuplicateModulatorName(String),
    /// No modulator registered under this name.
    ModulatorNotFound(String),
    /// A modulator was handed to a note-level editing operation.
    ModulatorAttachment(ModifierId),
    /// The modifier identity is already held by a note or registered.
    ModifierInUse(ModifierId),
    /// Internal bookkeeping mismatch; the operation was aborted.
    InconsistentState(&'static str),
    /// Sequence defaults are unusable.
    Config(ConfigError),
    /// Note-level failure.
    Note(NoteError),
}

impl Display for SequenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSticking => write!(f, "provide a sticking value"),
            Self::InvalidSticking(value) => write!(f, "invalid sticking: `{value}`"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "note index {index} out of range for sequence of {len}")
            }
            Self::TooManyDurationValues { given, notes } => write!(
                f,
                "{given} duration values passed, only {notes} notes in sequence"
            ),
            Self::InvalidDirection(value) => write!(
                f,
                "direction only accepts `forward` or `backward`, got `{value}`"
            ),
            Self::EmptySequence => write!(f, "sequence has no notes"),
            Self::DuplicateModulatorName(name) => {
                write!(f, "modulator name already registered: {name}")
            }
            Self::ModulatorNotFound(name) => write!(f, "modulator not found: {name}"),
            Self::ModulatorAttachment(id) => write!(
                f,
                "modulator {id} can only be attached through add_modulator or modulate"
            ),
            Self::ModifierInUse(id) => write!(f, "modifier already in use in sequence: {id}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent sequence state: {details}")
            }
            Self::Config(err) => write!(f, "{err}"),
            Self::Note(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SequenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Note(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteError> for SequenceError {
    fn from(value: NoteError) -> Self {
        Self::Note(value)
    }
}

impl From<ConfigError> for SequenceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StickingParseError> for SequenceError {
    fn from(value: StickingParseError) -> Self {
        match value {
            StickingParseError::Empty => Self::MissingSticking,
            StickingParseError::Unknown(text) => Self::InvalidSticking(text),
        }
    }
}

/// Positional note arguments for `Sequence::add_note`.
///
/// A number is a duration; modifiers alone fall back to the configured
/// default duration.
#[derive(Debug, Clone, Default)]
pub enum NoteArgs {
    #[default]
    Default,
    Duration(f64),
    Modifiers(Vec<Modifier>),
    DurationAndModifiers(f64, Vec<Modifier>),
}

impl From<f64> for NoteArgs {
    fn from(value: f64) -> Self {
        Self::Duration(value)
    }
}

impl From<Modifier> for NoteArgs {
    fn from(value: Modifier) -> Self {
        Self::Modifiers(vec![value])
    }
}

impl From<Vec<Modifier>> for NoteArgs {
    fn from(value: Vec<Modifier>) -> Self {
        Self::Modifiers(value)
    }
}

impl From<(f64, Vec<Modifier>)> for NoteArgs {
    fn from((duration, modifiers): (f64, Vec<Modifier>)) -> Self {
        Self::DurationAndModifiers(duration, modifiers)
    }
}

impl From<()> for NoteArgs {
    fn from(_: ()) -> Self {
        Self::Default
    }
}

/// Keyword-style options for `Sequence::add_note_with`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteOptions {
    pub dynamic: Option<u8>,
    pub dotted: Dotted,
    pub stem_direction: Option<StemDirection>,
}

/// An ordered, owned list of notes plus named modulators.
///
/// `Clone` is a deep copy: notes and modifiers are owned values, so the
/// copy shares no modifier state with the original.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    config: SequenceConfig,
    notes: Vec<Note>,
    modulators: BTreeMap<String, Modifier>,
}

impl Sequence {
    /// Creates an empty sequence whose notes default to `default_duration`.
    pub fn new(default_duration: f64) -> SequenceResult<Self> {
        Self::with_config(SequenceConfig::with_default_duration(default_duration))
    }

    pub fn with_config(config: SequenceConfig) -> SequenceResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            notes: Vec::new(),
            modulators: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Sum of note durations.
    pub fn total_duration(&self) -> f64 {
        self.notes.iter().map(Note::duration).sum()
    }

    /// Concatenated sticking codes, e.g. `RLRR`.
    pub fn sticking_string(&self) -> String {
        self.notes.iter().map(|note| note.sticking().code()).collect()
    }

    /// Appends notes in order.
    ///
    /// # Errors
    /// - `ModulatorAttachment` when a note carries a modulator.
    /// - `ModifierInUse` when a modifier identity is already in this
    ///   sequence or repeats across the new notes.
    ///
    /// Nothing is appended on error.
    pub fn add_notes(&mut self, notes: impl IntoIterator<Item = Note>) -> SequenceResult<()> {
        let notes: Vec<Note> = notes.into_iter().collect();
        self.ensure_unclaimed(notes.iter().flat_map(|note| note.modifiers()))?;
        self.notes.extend(notes);
        Ok(())
    }

    /// Builds and appends one note. Returns its index.
    pub fn add_note(&mut self, sticking: &str, args: impl Into<NoteArgs>) -> SequenceResult<usize> {
        self.add_note_with(sticking, args, NoteOptions::default())
    }

    /// Builds and appends one note with explicit options. Returns its index.
    ///
    /// # Errors
    /// - `MissingSticking` when `sticking` is blank.
    /// - `InvalidSticking` when `sticking` is not `R|L|B`.
    /// - `ModulatorAttachment` / `ModifierInUse` as for `add_notes`.
    /// - Note construction errors.
    pub fn add_note_with(
        &mut self,
        sticking: &str,
        args: impl Into<NoteArgs>,
        options: NoteOptions,
    ) -> SequenceResult<usize> {
        let sticking: Sticking = sticking.parse()?;
        let (duration, modifiers) = match args.into() {
            NoteArgs::Default => (self.config.default_duration, Vec::new()),
            NoteArgs::Duration(duration) => (duration, Vec::new()),
            NoteArgs::Modifiers(modifiers) => (self.config.default_duration, modifiers),
            NoteArgs::DurationAndModifiers(duration, modifiers) => (duration, modifiers),
        };
        self.ensure_unclaimed(&modifiers)?;

        let note = Note::builder(duration, sticking)
            .modifiers(modifiers)
            .dynamic(options.dynamic.unwrap_or(self.config.default_dynamic))
            .dotted(options.dotted)
            .stem_direction(options.stem_direction.unwrap_or_default())
            .build()?;

        self.notes.push(note);
        Ok(self.notes.len() - 1)
    }

    /// Attaches a non-modulator modifier to the note at `index`.
    ///
    /// # Errors
    /// - `IndexOutOfRange` when `index` addresses no note.
    /// - `ModulatorAttachment` for modulators; they move only through
    ///   `add_modulator` and `modulate`.
    /// - `ModifierInUse` when this identity is already held or registered.
    /// - Attach errors from the note.
    pub fn attach_modifier(&mut self, index: isize, modifier: Modifier) -> SequenceResult<()> {
        let index = self.resolve_index(index)?;
        self.ensure_unclaimed([&modifier])?;
        self.notes[index].attach(modifier)?;
        Ok(())
    }

    /// Detaches the modifier of `kind` from the note at `index`.
    pub fn detach_modifier(
        &mut self,
        index: isize,
        kind: ModifierKind,
    ) -> SequenceResult<Modifier> {
        let index = self.resolve_index(index)?;
        Ok(self.notes[index].detach(kind)?)
    }

    /// Removes and returns the note at `index` (`None` = last; negative
    /// counts from the end).
    ///
    /// Modulators visiting the removed note are detached from it and become
    /// unattached; they stay registered.
    pub fn remove_note(&mut self, index: Option<isize>) -> SequenceResult<Note> {
        let index = self.resolve_index(index.unwrap_or(-1))?;
        let mut note = self.notes.remove(index);

        for (name, modulator) in &self.modulators {
            if note.holds(modulator.id()) {
                note.detach_modifier(modulator.id())?;
                debug!(
                    "event=modulator_unattached module=sequence status=ok name={} from={}",
                    name, index
                );
            }
        }

        Ok(note)
    }

    /// Appends a duplicate of the last note, optionally with flipped
    /// sticking.
    pub fn copy_note(&mut self, flip: bool) -> SequenceResult<usize> {
        let mut copy = self
            .notes
            .last()
            .map(Note::duplicate)
            .ok_or(SequenceError::EmptySequence)?;
        if flip {
            copy.flip_sticking();
        }
        self.notes.push(copy);
        Ok(self.notes.len() - 1)
    }

    /// Applies one sounding duration per note, in order. Dotted notes end
    /// at the given value, not at a dotted multiple of it.
    ///
    /// The last value fills the remaining notes; `0.0` leaves a note's
    /// duration unchanged. An empty slice changes nothing.
    ///
    /// # Errors
    /// - `TooManyDurationValues` when `values.len() > self.len()`.
    /// - `Note(InvalidDuration)` for negative or non-finite values; no note
    ///   is changed in that case.
    pub fn set_durations(&mut self, values: &[f64]) -> SequenceResult<()> {
        if values.len() > self.notes.len() {
            return Err(SequenceError::TooManyDurationValues {
                given: values.len(),
                notes: self.notes.len(),
            });
        }
        let Some(last) = values.last().copied() else {
            return Ok(());
        };
        if let Some(invalid) = values
            .iter()
            .copied()
            .find(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(NoteError::InvalidDuration(invalid).into());
        }

        let filled = values.iter().copied().chain(std::iter::repeat(last));
        for (note, value) in self.notes.iter_mut().zip(filled) {
            if value == 0.0 {
                continue;
            }
            note.set_duration(value)?;
        }
        Ok(())
    }

    /// Splits `total` evenly across every note, so `total_duration()`
    /// equals `total` afterwards.
    pub fn fit_duration(&mut self, total: f64) -> SequenceResult<()> {
        if self.notes.is_empty() {
            return Err(SequenceError::EmptySequence);
        }
        if !(total.is_finite() && total > 0.0) {
            return Err(NoteError::InvalidDuration(total).into());
        }
        let each = total / self.notes.len() as f64;
        self.set_durations(&[each])
    }

    /// Overwrites stickings left to right.
    ///
    /// `_` keeps the existing sticking; notes past the end of the pattern
    /// are untouched.
    pub fn set_sticking(&mut self, pattern: &str) -> SequenceResult<()> {
        if !STICKING_PATTERN_RE.is_match(pattern) {
            return Err(SequenceError::InvalidSticking(pattern.to_string()));
        }
        for (note, code) in self.notes.iter_mut().zip(pattern.chars()) {
            if let Some(sticking) = Sticking::from_code(code) {
                note.set_sticking(sticking);
            }
        }
        Ok(())
    }

    /// Flips the hand of every note.
    pub fn flip_sticking(&mut self) {
        self.notes.iter_mut().for_each(Note::flip_sticking);
    }

    /// Registers `modifier` as a modulator under `name`, optionally
    /// attaching it to the note at `position`.
    ///
    /// The name is stored verbatim; an empty or whitespace-only name
    /// registers the modulator under its identity instead.
    ///
    /// # Errors
    /// - `DuplicateModulatorName` when `name` is taken.
    /// - `ModifierInUse` when this identity is already held or registered.
    /// - `IndexOutOfRange` when `position` addresses no note.
    /// - Attach errors from the target note; nothing is registered then.
    pub fn add_modulator(
        &mut self,
        mut modifier: Modifier,
        name: impl Into<String>,
        position: Option<isize>,
    ) -> SequenceResult<String> {
        let name = name.into();
        let name = if name.trim().is_empty() {
            modifier.id().to_string()
        } else {
            name
        };
        if self.modulators.contains_key(name.as_str()) {
            return Err(SequenceError::DuplicateModulatorName(name));
        }
        if self.is_claimed(modifier.id()) {
            return Err(SequenceError::ModifierInUse(modifier.id()));
        }

        modifier.mark_modulator();
        if let Some(position) = position {
            let index = self.resolve_index(position)?;
            self.notes[index].attach(modifier.clone())?;
        }

        debug!(
            "event=modulator_registered module=sequence status=ok name={} kind={} position={:?}",
            name,
            modifier.kind(),
            position
        );
        self.modulators.insert(name.clone(), modifier);
        Ok(name)
    }

    /// Detaches the named modulator from its note. Returns the index it
    /// was attached to, if any.
    pub fn detach_modulator(&mut self, name: &str) -> SequenceResult<Option<usize>> {
        let id = self.modulator_id(name)?;
        let Some(index) = self.locate(id) else {
            return Ok(None);
        };
        self.notes[index].detach_modifier(id)?;
        debug!(
            "event=modulator_unattached module=sequence status=ok name={} from={}",
            name, index
        );
        Ok(Some(index))
    }

    pub fn modulator(&self, name: &str) -> Option<&Modifier> {
        self.modulators.get(name)
    }

    /// Registered modulator names in sorted order.
    pub fn modulator_names(&self) -> Vec<&str> {
        self.modulators.keys().map(String::as_str).collect()
    }

    /// Index of the note currently holding the named modulator.
    pub fn modulator_position(&self, name: &str) -> SequenceResult<Option<usize>> {
        let id = self.modulator_id(name)?;
        Ok(self.locate(id))
    }

    /// Index of the first note holding the modifier with this identity.
    pub fn locate(&self, id: ModifierId) -> Option<usize> {
        self.notes.iter().position(|note| note.holds(id))
    }

    fn is_claimed(&self, id: ModifierId) -> bool {
        self.locate(id).is_some()
            || self
                .modulators
                .values()
                .any(|modulator| modulator.id() == id)
    }

    /// Checks modifiers entering through note-level operations.
    fn ensure_unclaimed<'a>(
        &self,
        modifiers: impl IntoIterator<Item = &'a Modifier>,
    ) -> SequenceResult<()> {
        let mut seen = HashSet::new();
        for modifier in modifiers {
            let id = modifier.id();
            if modifier.is_modulator() {
                return Err(SequenceError::ModulatorAttachment(id));
            }
            if !seen.insert(id) || self.is_claimed(id) {
                return Err(SequenceError::ModifierInUse(id));
            }
        }
        Ok(())
    }

    fn modulator_id(&self, name: &str) -> SequenceResult<ModifierId> {
        self.modulators
            .get(name)
            .map(Modifier::id)
            .ok_or_else(|| SequenceError::ModulatorNotFound(name.to_string()))
    }

    fn resolve_index(&self, index: isize) -> SequenceResult<usize> {
        let len = self.notes.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        match resolved {
            Some(resolved) if resolved < len => Ok(resolved),
            _ => Err(SequenceError::IndexOutOfRange { index, len }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Sequence, SequenceError};

    fn four_notes() -> Sequence {
        let mut sequence = Sequence::new(0.25).unwrap();
        for sticking in ["R", "L", "R", "R"] {
            sequence.add_note(sticking, ()).unwrap();
        }
        sequence
    }

    #[test]
    fn resolve_index_supports_negative_positions() {
        let sequence = four_notes();
        assert_eq!(sequence.resolve_index(0), Ok(0));
        assert_eq!(sequence.resolve_index(-1), Ok(3));
        assert_eq!(sequence.resolve_index(-4), Ok(0));
        assert_eq!(
            sequence.resolve_index(-5),
            Err(SequenceError::IndexOutOfRange { index: -5, len: 4 })
        );
        assert_eq!(
            sequence.resolve_index(4),
            Err(SequenceError::IndexOutOfRange { index: 4, len: 4 })
        );
    }

    #[test]
    fn resolve_index_rejects_any_index_when_empty() {
        let sequence = Sequence::new(0.25).unwrap();
        assert!(sequence.resolve_index(-1).is_err());
        assert!(sequence.resolve_index(0).is_err());
    }
}
