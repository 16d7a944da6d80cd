//! Modifier effect table and overlay rules.
//!
//! # Responsibility
//! - Map each modifier kind to the note attributes it touches and how.
//! - Place modifier references into the location slots of a note.
//!
//! # Invariants
//! - Overlay is a pure function of (defaults, ordered modifiers); replaying
//!   the same modifiers over the same defaults yields the same attributes.
//! - Zero-valued deltas never touch an attribute.

use crate::model::dynamic::{clamp_dynamic, MIN_DYNAMIC};
use crate::model::modifier::{Location, Modifier, ModifierCategory, ModifierId, ModifierKind};
use serde::Serialize;

/// How a modifier's `duration_delta` combines with the note duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationRule {
    /// `duration *= 1 + duration_delta`.
    Scale,
}

/// How a modifier's `dynamic_delta` combines with the note dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicRule {
    /// The delta is the absolute level to impose.
    Set,
    /// The delta is added to the current level.
    Add,
}

/// Per-kind combine rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub duration: DurationRule,
    pub dynamic: DynamicRule,
}

/// Looks up the combine rules for `kind`.
pub fn effect_of(kind: ModifierKind) -> Effect {
    let dynamic = match kind.category() {
        ModifierCategory::Articulation => DynamicRule::Set,
        ModifierCategory::Duration
        | ModifierCategory::Tremolo
        | ModifierCategory::GraceNote
        | ModifierCategory::RepeatAndJump => DynamicRule::Add,
    };
    Effect {
        duration: DurationRule::Scale,
        dynamic,
    }
}

/// Attribute values a modifier overlay operates on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Attributes {
    pub duration: f64,
    pub dynamic: u8,
}

/// Overlays one modifier's non-zero fields onto `attributes`.
pub(crate) fn overlay(attributes: &mut Attributes, modifier: &Modifier) {
    let effect = effect_of(modifier.kind());

    if modifier.has_duration_effect() {
        match effect.duration {
            DurationRule::Scale => attributes.duration *= 1.0 + modifier.duration_delta(),
        }
    }

    if modifier.has_dynamic_effect() {
        let next = match effect.dynamic {
            DynamicRule::Set => modifier.dynamic_delta(),
            DynamicRule::Add => i32::from(attributes.dynamic) + modifier.dynamic_delta(),
        };
        attributes.dynamic = clamp_dynamic(next);
    }
}

/// Factor the duration overlays of `modifiers` apply to a base duration.
pub(crate) fn duration_scale<'a>(modifiers: impl IntoIterator<Item = &'a Modifier>) -> f64 {
    let mut attributes = Attributes {
        duration: 1.0,
        dynamic: MIN_DYNAMIC,
    };
    for modifier in modifiers {
        overlay(&mut attributes, modifier);
    }
    attributes.duration
}

/// Location slots of a note, holding modifier identities.
///
/// Head/stem/tail hold at most one modifier and `Note::attach` refuses a
/// second one; the other slots keep every placed modifier in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationSlots {
    head: Option<ModifierId>,
    stem: Option<ModifierId>,
    tail: Option<ModifierId>,
    top: Vec<ModifierId>,
    bottom: Vec<ModifierId>,
    left: Vec<ModifierId>,
    right: Vec<ModifierId>,
}

impl LocationSlots {
    /// Empties every slot.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Pushes or sets `modifier` into the slot named by its location.
    pub(crate) fn place(&mut self, modifier: &Modifier) {
        let id = modifier.id();
        match modifier.location() {
            Location::Head => self.head = Some(id),
            Location::Stem => self.stem = Some(id),
            Location::Tail => self.tail = Some(id),
            Location::Top => self.top.push(id),
            Location::Bottom => self.bottom.push(id),
            Location::Left => self.left.push(id),
            Location::Right => self.right.push(id),
            Location::Center => {}
        }
    }

    /// Identities held at `location`, in slot order.
    pub fn ids_at(&self, location: Location) -> Vec<ModifierId> {
        match location {
            Location::Head => self.head.into_iter().collect(),
            Location::Stem => self.stem.into_iter().collect(),
            Location::Tail => self.tail.into_iter().collect(),
            Location::Top => self.top.clone(),
            Location::Bottom => self.bottom.clone(),
            Location::Left => self.left.clone(),
            Location::Right => self.right.clone(),
            Location::Center => Vec::new(),
        }
    }

    /// Returns whether any slot holds `id`.
    pub fn contains(&self, id: ModifierId) -> bool {
        Location::SLOTS
            .iter()
            .any(|location| self.ids_at(*location).contains(&id))
    }

    pub fn is_empty(&self) -> bool {
        Location::SLOTS
            .iter()
            .all(|location| self.ids_at(*location).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{duration_scale, effect_of, overlay, Attributes, DynamicRule, LocationSlots};
    use crate::model::modifier::{Location, Modifier, ModifierKind};

    #[test]
    fn articulations_set_and_others_add() {
        assert_eq!(effect_of(ModifierKind::Accent).dynamic, DynamicRule::Set);
        assert_eq!(effect_of(ModifierKind::Tenuto).dynamic, DynamicRule::Set);
        assert_eq!(effect_of(ModifierKind::Flam).dynamic, DynamicRule::Add);
        assert_eq!(effect_of(ModifierKind::Dot).dynamic, DynamicRule::Add);
    }

    #[test]
    fn overlay_scales_duration_and_sets_dynamic() {
        let mut attributes = Attributes {
            duration: 0.25,
            dynamic: 3,
        };
        overlay(&mut attributes, &Modifier::new(ModifierKind::Dot));
        overlay(&mut attributes, &Modifier::new(ModifierKind::Marcato));

        assert_eq!(attributes.duration, 0.375);
        assert_eq!(attributes.dynamic, 15);
    }

    #[test]
    fn overlay_adds_and_clamps_custom_dynamic() {
        let mut attributes = Attributes {
            duration: 0.25,
            dynamic: 12,
        };
        let bump = Modifier::custom(ModifierKind::Flam, Location::Left, 0.0, 6).unwrap();
        overlay(&mut attributes, &bump);

        assert_eq!(attributes.dynamic, 15);
        assert_eq!(attributes.duration, 0.25);
    }

    #[test]
    fn neutral_modifier_touches_nothing() {
        let mut attributes = Attributes {
            duration: 0.125,
            dynamic: 6,
        };
        overlay(&mut attributes, &Modifier::new(ModifierKind::Diddle));

        assert_eq!(
            attributes,
            Attributes {
                duration: 0.125,
                dynamic: 6
            }
        );
    }

    #[test]
    fn slots_hold_placed_ids_and_center_has_no_slot() {
        let diddle = Modifier::new(ModifierKind::Diddle);
        let accent = Modifier::new(ModifierKind::Accent);
        let repeat_bar = Modifier::new(ModifierKind::RepeatBar);
        let mut slots = LocationSlots::default();

        slots.place(&diddle);
        slots.place(&accent);
        slots.place(&repeat_bar);

        assert_eq!(slots.ids_at(Location::Stem), vec![diddle.id()]);
        assert!(slots.contains(accent.id()));
        assert!(!slots.contains(repeat_bar.id()));

        slots.clear();
        assert!(slots.is_empty());
    }

    #[test]
    fn duration_scale_multiplies_duration_overlays_only() {
        let dot = Modifier::new(ModifierKind::Dot);
        let accent = Modifier::new(ModifierKind::Accent);
        assert_eq!(duration_scale([&dot, &accent]), 1.5);
        assert_eq!(duration_scale([&accent]), 1.0);
    }
}
