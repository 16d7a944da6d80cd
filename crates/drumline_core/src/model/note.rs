//! Note domain model and modifier application.
//!
//! # Responsibility
//! - Hold base attributes, their default snapshots and attached modifiers.
//! - Attach/detach modifiers and keep displayable attributes in sync.
//!
//! # Invariants
//! - Every modifier referenced from a location slot is in `modifiers` exactly
//!   once, and every slotted modifier in `modifiers` is referenced from its
//!   slot. Head, stem and tail never hold more than one modifier.
//! - `duration`/`dynamic` always equal the defaults with every attached
//!   modifier overlaid in attachment order.
//! - Detach identifies the removed modifier by kind or identity, never by
//!   slot.

use crate::model::applicator::{duration_scale, overlay, Attributes, LocationSlots};
use crate::model::dynamic::{is_valid_dynamic, marking_for_dynamic, DEFAULT_DYNAMIC};
use crate::model::modifier::{
    Location, Modifier, ModifierCategory, ModifierId, ModifierKind, ModifierValidationError,
};
use crate::model::sticking::{StemDirection, Sticking};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NoteResult<T> = Result<T, NoteError>;

/// Errors from note construction and modifier application.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteError {
    /// Duration is not a finite positive number.
    InvalidDuration(f64),
    /// Dynamic level is outside `1..=15`.
    InvalidDynamic(i32),
    /// A modifier of this kind is already attached.
    DuplicateModifierKind(ModifierKind),
    /// A note carries at most one duration modifier.
    ConflictingModifier {
        existing: ModifierKind,
        incoming: ModifierKind,
    },
    /// No detachable modifier of this kind is attached.
    ModifierNotFound(ModifierKind),
    /// No modifier with this identity is attached.
    ModifierNotAttached(ModifierId),
    /// This exact modifier is already attached.
    ModifierAlreadyAttached(ModifierId),
    /// A head, stem or tail slot already holds a modifier.
    SlotOccupied {
        location: Location,
        occupant: ModifierKind,
    },
    /// Custom modifier failed validation.
    Validation(ModifierValidationError),
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDuration(value) => {
                write!(f, "note duration must be finite and > 0, got {value}")
            }
            Self::InvalidDynamic(value) => {
                write!(f, "note dynamic must be within 1..=15, got {value}")
            }
            Self::DuplicateModifierKind(kind) => {
                write!(f, "modifier already attached to note: {kind}")
            }
            Self::ConflictingModifier { existing, incoming } => write!(
                f,
                "modifier {incoming} conflicts with attached duration modifier {existing}"
            ),
            Self::ModifierNotFound(kind) => write!(f, "modifier not attached to note: {kind}"),
            Self::ModifierNotAttached(id) => write!(f, "modifier not attached to note: {id}"),
            Self::ModifierAlreadyAttached(id) => {
                write!(f, "modifier already attached to note: {id}")
            }
            Self::SlotOccupied { location, occupant } => {
                write!(f, "{location:?} slot already holds {occupant}")
            }
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModifierValidationError> for NoteError {
    fn from(value: ModifierValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Dot shorthand accepted at note construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dotted {
    #[default]
    None,
    Single,
    Double,
}

/// One percussion note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    duration: f64,
    duration_default: f64,
    sticking: Sticking,
    sticking_default: Sticking,
    dynamic: u8,
    dynamic_default: u8,
    stem_direction: StemDirection,
    #[serde(flatten)]
    slots: LocationSlots,
    modifiers: Vec<Modifier>,
}

/// Builder for notes with initial modifiers.
#[derive(Debug, Clone)]
pub struct NoteBuilder {
    duration: f64,
    sticking: Sticking,
    modifiers: Vec<Modifier>,
    dynamic: u8,
    dotted: Dotted,
    stem_direction: StemDirection,
}

impl NoteBuilder {
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn dynamic(mut self, dynamic: u8) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn dotted(mut self, dotted: Dotted) -> Self {
        self.dotted = dotted;
        self
    }

    pub fn stem_direction(mut self, stem_direction: StemDirection) -> Self {
        self.stem_direction = stem_direction;
        self
    }

    /// Validates base attributes and attaches every initial modifier.
    ///
    /// # Errors
    /// - `InvalidDuration` / `InvalidDynamic` for unusable base values.
    /// - Any attach error from an initial modifier, including the dot
    ///   shorthand.
    pub fn build(self) -> NoteResult<Note> {
        validate_duration(self.duration)?;
        validate_dynamic(i32::from(self.dynamic))?;

        let mut note = Note {
            duration: self.duration,
            duration_default: self.duration,
            sticking: self.sticking,
            sticking_default: self.sticking,
            dynamic: self.dynamic,
            dynamic_default: self.dynamic,
            stem_direction: self.stem_direction,
            slots: LocationSlots::default(),
            modifiers: Vec::new(),
        };

        for modifier in self.modifiers {
            note.attach(modifier)?;
        }
        match self.dotted {
            Dotted::None => {}
            Dotted::Single => note.attach(Modifier::new(ModifierKind::Dot))?,
            Dotted::Double => note.attach(Modifier::new(ModifierKind::DoubleDot))?,
        }

        Ok(note)
    }
}

impl Note {
    /// Starts a note with `duration` as a fraction of a whole note
    /// (an eighth is `0.125`).
    pub fn builder(duration: f64, sticking: Sticking) -> NoteBuilder {
        NoteBuilder {
            duration,
            sticking,
            modifiers: Vec::new(),
            dynamic: DEFAULT_DYNAMIC,
            dotted: Dotted::None,
            stem_direction: StemDirection::default(),
        }
    }

    /// Creates an unmodified note.
    pub fn new(duration: f64, sticking: Sticking) -> NoteResult<Self> {
        Self::builder(duration, sticking).build()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn duration_default(&self) -> f64 {
        self.duration_default
    }

    pub fn sticking(&self) -> Sticking {
        self.sticking
    }

    pub fn sticking_default(&self) -> Sticking {
        self.sticking_default
    }

    pub fn dynamic(&self) -> u8 {
        self.dynamic
    }

    /// Closest marking at or below the current dynamic, e.g. `mf`.
    pub fn dynamic_marking(&self) -> &'static str {
        marking_for_dynamic(self.dynamic)
    }

    pub fn dynamic_default(&self) -> u8 {
        self.dynamic_default
    }

    pub fn stem_direction(&self) -> StemDirection {
        self.stem_direction
    }

    /// Attached modifiers in attachment order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn modifier_names(&self) -> Vec<&'static str> {
        self.modifiers.iter().map(Modifier::name).collect()
    }

    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        self.modifiers.iter().any(|modifier| modifier.kind() == kind)
    }

    /// Returns the attached modifier with this identity.
    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.iter().find(|modifier| modifier.id() == id)
    }

    pub fn holds(&self, id: ModifierId) -> bool {
        self.modifier(id).is_some()
    }

    /// Modifiers occupying `location`, in slot order. `Center` is always
    /// empty.
    pub fn attached_at(&self, location: Location) -> Vec<&Modifier> {
        self.slots
            .ids_at(location)
            .into_iter()
            .filter_map(|id| self.modifier(id))
            .collect()
    }

    pub fn set_stem_direction(&mut self, stem_direction: StemDirection) {
        self.stem_direction = stem_direction;
    }

    pub fn set_sticking(&mut self, sticking: Sticking) {
        self.sticking = sticking;
    }

    /// Swaps R and L; `Both` is unchanged.
    pub fn flip_sticking(&mut self) {
        self.sticking = self.sticking.flipped();
    }

    /// Returns sticking to its construction-time value.
    pub fn restore_sticking(&mut self) {
        self.sticking = self.sticking_default;
    }

    /// Sets the sounding duration to `duration`.
    ///
    /// The base is rescaled so that attached duration modifiers still
    /// compose to exactly `duration`; detaching a dot afterwards returns the
    /// note to that rescaled base.
    pub fn set_duration(&mut self, duration: f64) -> NoteResult<()> {
        validate_duration(duration)?;
        self.duration_default = duration / duration_scale(&self.modifiers);
        self.apply_modifiers();
        self.duration = duration;
        Ok(())
    }

    /// Replaces the base dynamic and recomposes modifiers on top of it.
    pub fn set_dynamic(&mut self, dynamic: u8) -> NoteResult<()> {
        validate_dynamic(i32::from(dynamic))?;
        self.dynamic_default = dynamic;
        self.apply_modifiers();
        Ok(())
    }

    /// Attaches `modifier` and overlays its effects.
    ///
    /// # Errors
    /// - `ModifierAlreadyAttached` when this exact modifier is present.
    /// - `DuplicateModifierKind` when a modifier of the same kind is present
    ///   and either one of the pair is not a modulator.
    /// - `ConflictingModifier` when a second duration modifier is attached.
    /// - `SlotOccupied` when the modifier targets a taken head, stem or tail
    ///   slot.
    ///
    /// The note is unchanged on error.
    pub fn attach(&mut self, modifier: Modifier) -> NoteResult<()> {
        if self.holds(modifier.id()) {
            return Err(NoteError::ModifierAlreadyAttached(modifier.id()));
        }
        if self.modifiers.iter().any(|existing| {
            existing.kind() == modifier.kind()
                && !(existing.is_modulator() && modifier.is_modulator())
        }) {
            return Err(NoteError::DuplicateModifierKind(modifier.kind()));
        }
        if modifier.category() == ModifierCategory::Duration {
            if let Some(existing) = self
                .modifiers
                .iter()
                .find(|existing| existing.category() == ModifierCategory::Duration)
            {
                return Err(NoteError::ConflictingModifier {
                    existing: existing.kind(),
                    incoming: modifier.kind(),
                });
            }
        }

        let location = modifier.location();
        if location.is_single_slot() {
            if let Some(occupant) = self.attached_at(location).first() {
                return Err(NoteError::SlotOccupied {
                    location,
                    occupant: occupant.kind(),
                });
            }
        }

        let mut attributes = self.attributes();
        overlay(&mut attributes, &modifier);
        self.set_attributes(attributes);
        self.slots.place(&modifier);
        self.modifiers.push(modifier);
        Ok(())
    }

    /// Detaches the first non-modulator modifier of `kind`.
    ///
    /// Visiting modulators are never removed here; they are moved by the
    /// owning sequence.
    pub fn detach(&mut self, kind: ModifierKind) -> NoteResult<Modifier> {
        let index = self
            .modifiers
            .iter()
            .position(|modifier| modifier.kind() == kind && !modifier.is_modulator())
            .ok_or(NoteError::ModifierNotFound(kind))?;
        Ok(self.remove_at(index))
    }

    /// Detaches the modifier with this identity.
    pub fn detach_modifier(&mut self, id: ModifierId) -> NoteResult<Modifier> {
        self.take_modifier(id)
            .map(|(_, modifier)| modifier)
            .ok_or(NoteError::ModifierNotAttached(id))
    }

    /// Deep copy with fresh modifier identities and without visiting
    /// modulators.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.modifiers = self
            .modifiers
            .iter()
            .filter(|modifier| !modifier.is_modulator())
            .map(Modifier::with_fresh_id)
            .collect();
        copy.apply_modifiers();
        copy
    }

    /// Removes by identity and reports the list position it held.
    pub(crate) fn take_modifier(&mut self, id: ModifierId) -> Option<(usize, Modifier)> {
        let index = self
            .modifiers
            .iter()
            .position(|modifier| modifier.id() == id)?;
        Some((index, self.remove_at(index)))
    }

    /// Reinserts a previously taken modifier at its former list position so
    /// that overlay order is unchanged.
    pub(crate) fn restore_modifier(&mut self, index: usize, modifier: Modifier) {
        let index = index.min(self.modifiers.len());
        self.modifiers.insert(index, modifier);
        self.apply_modifiers();
    }

    fn remove_at(&mut self, index: usize) -> Modifier {
        let removed = self.modifiers.remove(index);
        self.apply_modifiers();
        removed
    }

    /// Resets modifier-driven attributes to their defaults, then overlays
    /// every attached modifier in attachment order.
    fn apply_modifiers(&mut self) {
        let mut attributes = Attributes {
            duration: self.duration_default,
            dynamic: self.dynamic_default,
        };
        self.reset_locations();
        for modifier in &self.modifiers {
            overlay(&mut attributes, modifier);
            self.slots.place(modifier);
        }
        self.set_attributes(attributes);
    }

    /// Clears all seven location slots; `modifiers` is left untouched.
    fn reset_locations(&mut self) {
        self.slots.clear();
    }

    fn attributes(&self) -> Attributes {
        Attributes {
            duration: self.duration,
            dynamic: self.dynamic,
        }
    }

    fn set_attributes(&mut self, attributes: Attributes) {
        self.duration = attributes.duration;
        self.dynamic = attributes.dynamic;
    }
}

fn validate_duration(duration: f64) -> NoteResult<()> {
    if duration.is_finite() && duration > 0.0 {
        Ok(())
    } else {
        Err(NoteError::InvalidDuration(duration))
    }
}

fn validate_dynamic(dynamic: i32) -> NoteResult<()> {
    if is_valid_dynamic(dynamic) {
        Ok(())
    } else {
        Err(NoteError::InvalidDynamic(dynamic))
    }
}

#[cfg(test)]
mod tests {
    use super::Note;
    use crate::model::modifier::{Location, Modifier, ModifierKind};
    use crate::model::sticking::Sticking;

    #[test]
    fn reset_locations_keeps_modifier_list() {
        let mut note = Note::builder(0.25, Sticking::Right)
            .modifier(Modifier::new(ModifierKind::Accent))
            .modifier(Modifier::new(ModifierKind::Diddle))
            .build()
            .unwrap();

        note.reset_locations();

        assert!(note.slots.is_empty());
        assert_eq!(note.modifiers().len(), 2);

        note.apply_modifiers();
        assert_eq!(note.attached_at(Location::Top).len(), 1);
        assert_eq!(note.attached_at(Location::Stem).len(), 1);
    }

    #[test]
    fn restore_modifier_reinserts_at_previous_position() {
        let marcato = Modifier::new(ModifierKind::Marcato);
        let tenuto = Modifier::new(ModifierKind::Tenuto);
        let tenuto_id = tenuto.id();
        let mut note = Note::builder(0.25, Sticking::Left)
            .modifier(tenuto)
            .modifier(marcato)
            .build()
            .unwrap();
        assert_eq!(note.dynamic(), 15);

        let (index, taken) = note.take_modifier(tenuto_id).unwrap();
        assert_eq!(index, 0);
        note.restore_modifier(index, taken);

        assert_eq!(note.modifiers()[0].id(), tenuto_id);
        assert_eq!(note.dynamic(), 15);
    }
}
