//! Modulator relocation across a sequence.
//!
//! # Invariants
//! - Relocation goes through `Note::detach_modifier` and `Note::attach`
//!   only.
//! - `modulate` is all-or-nothing: on any failure every modulator already
//!   moved by the call is returned to its original note and list position.

use super::{Sequence, SequenceError, SequenceResult};
use crate::model::modifier::ModifierId;
use log::{debug, error, warn};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Direction a modulator travels through the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Target index for a modulator currently at `current`.
    ///
    /// Unattached modulators enter at the first note going forward and at
    /// the last note going backward. `len` must be non-zero.
    pub fn target(self, current: Option<usize>, len: usize) -> usize {
        let raw = match (self, current) {
            (Self::Forward, Some(index)) => index as i64 + 1,
            (Self::Forward, None) => 0,
            (Self::Backward, Some(index)) => index as i64 - 1,
            (Self::Backward, None) => -1,
        };
        raw.rem_euclid(len as i64) as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SequenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            _ => Err(SequenceError::InvalidDirection(value.to_string())),
        }
    }
}

/// One completed move, kept for rollback.
#[derive(Debug, Clone, Copy)]
struct Relocation {
    id: ModifierId,
    /// `(note index, modifier list position)` before the move.
    origin: Option<(usize, usize)>,
    target: usize,
}

impl Sequence {
    /// Moves every modulator (or only `name`) one note in `direction`,
    /// wrapping around both ends.
    ///
    /// # Errors
    /// - `ModulatorNotFound` when `name` is not registered.
    /// - `EmptySequence` when a modulator is selected but there are no
    ///   notes.
    /// - Attach errors from a target note (e.g. duplicate kind); all moves
    ///   made by this call are rolled back first.
    pub fn modulate(&mut self, direction: Direction, name: Option<&str>) -> SequenceResult<()> {
        let selected: Vec<(String, ModifierId)> = match name {
            Some(name) => vec![(name.to_string(), self.modulator_id(name)?)],
            None => self
                .modulators
                .iter()
                .map(|(name, modifier)| (name.clone(), modifier.id()))
                .collect(),
        };
        if selected.is_empty() {
            return Ok(());
        }
        if self.notes.is_empty() {
            return Err(SequenceError::EmptySequence);
        }

        let mut moved = Vec::with_capacity(selected.len());
        for (name, id) in selected {
            let from = self.locate(id);
            let to = direction.target(from, self.notes.len());
            match self.relocate(&name, id, from, to) {
                Ok(relocation) => {
                    debug!(
                        "event=modulator_moved module=sequence status=ok name={} direction={} from={:?} to={}",
                        name, direction, from, to
                    );
                    moved.push(relocation);
                }
                Err(err) => {
                    warn!(
                        "event=modulator_moved module=sequence status=rolled_back name={} direction={} from={:?} to={} error={}",
                        name, direction, from, to, err
                    );
                    self.roll_back(moved)?;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Detaches from `from` (if attached) and attaches to `to`, restoring
    /// the original attachment when the attach fails.
    fn relocate(
        &mut self,
        name: &str,
        id: ModifierId,
        from: Option<usize>,
        to: usize,
    ) -> SequenceResult<Relocation> {
        let (origin, modifier) = match from {
            Some(index) => {
                let (position, modifier) = self.notes[index]
                    .take_modifier(id)
                    .ok_or(SequenceError::InconsistentState("located modulator missing"))?;
                (Some((index, position)), modifier)
            }
            None => {
                let modifier = self
                    .modulators
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SequenceError::ModulatorNotFound(name.to_string()))?;
                (None, modifier)
            }
        };

        if let Err(err) = self.notes[to].attach(modifier.clone()) {
            if let Some((index, position)) = origin {
                self.notes[index].restore_modifier(position, modifier);
            }
            return Err(err.into());
        }

        Ok(Relocation {
            id,
            origin,
            target: to,
        })
    }

    /// Undoes completed relocations in reverse order.
    fn roll_back(&mut self, moved: Vec<Relocation>) -> SequenceResult<()> {
        for relocation in moved.into_iter().rev() {
            let Some((_, modifier)) = self.notes[relocation.target].take_modifier(relocation.id)
            else {
                error!(
                    "event=modulator_rollback module=sequence status=error target={} reason=missing",
                    relocation.target
                );
                return Err(SequenceError::InconsistentState(
                    "moved modulator missing during rollback",
                ));
            };
            if let Some((index, position)) = relocation.origin {
                self.notes[index].restore_modifier(position, modifier);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Direction;
    use crate::sequence::SequenceError;

    #[test]
    fn target_wraps_in_both_directions() {
        assert_eq!(Direction::Forward.target(Some(3), 4), 0);
        assert_eq!(Direction::Forward.target(Some(1), 4), 2);
        assert_eq!(Direction::Backward.target(Some(0), 4), 3);
        assert_eq!(Direction::Backward.target(Some(2), 4), 1);
    }

    #[test]
    fn target_from_unattached_enters_at_the_ends() {
        assert_eq!(Direction::Forward.target(None, 4), 0);
        assert_eq!(Direction::Backward.target(None, 4), 3);
        assert_eq!(Direction::Backward.target(None, 1), 0);
    }

    #[test]
    fn parse_rejects_unknown_direction() {
        assert_eq!("Forward".parse::<Direction>(), Ok(Direction::Forward));
        assert_eq!(" backward".parse::<Direction>(), Ok(Direction::Backward));
        assert_eq!(
            "sideways".parse::<Direction>(),
            Err(SequenceError::InvalidDirection("sideways".to_string()))
        );
    }
}
