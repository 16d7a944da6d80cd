//! Common snare rudiments built on the public sequence API.
//!
//! Every builder takes the total duration of the rudiment and spreads it
//! evenly across its notes.

use crate::model::modifier::{Modifier, ModifierKind};
use crate::sequence::{Sequence, SequenceResult};

/// `RLRR`, optionally accented on the downbeat.
pub fn paradiddle(total: f64, downbeat_accent: bool) -> SequenceResult<Sequence> {
    let mut rudiment = Sequence::new(1.0 / 16.0)?;
    if downbeat_accent {
        rudiment.add_note("R", Modifier::new(ModifierKind::Accent))?;
    } else {
        rudiment.add_note("R", ())?;
    }
    rudiment.add_note("L", ())?;
    rudiment.add_note("R", ())?;
    rudiment.add_note("R", ())?;
    rudiment.fit_duration(total)?;
    Ok(rudiment)
}

/// Accented paradiddle extended with a closing `LL`.
pub fn paradiddlediddle(total: f64) -> SequenceResult<Sequence> {
    let mut rudiment = paradiddle(4.0 / 24.0, true)?;
    rudiment.add_note("L", ())?;
    rudiment.add_note("L", ())?;
    rudiment.fit_duration(total)?;
    Ok(rudiment)
}

/// Flammed, accented `R` followed by `L R`.
pub fn flam_accent(total: f64) -> SequenceResult<Sequence> {
    let mut rudiment = Sequence::new(1.0 / 12.0)?;
    rudiment.add_note(
        "R",
        vec![
            Modifier::new(ModifierKind::Flam),
            Modifier::new(ModifierKind::Accent),
        ],
    )?;
    rudiment.add_note("L", ())?;
    rudiment.add_note("R", ())?;
    rudiment.fit_duration(total)?;
    Ok(rudiment)
}

/// `R(flam) L(accent) R L R(flam)`.
pub fn flamacue(total: f64) -> SequenceResult<Sequence> {
    let mut rudiment = Sequence::new(1.0 / 16.0)?;
    rudiment.add_note("R", Modifier::new(ModifierKind::Flam))?;
    rudiment.add_note("L", Modifier::new(ModifierKind::Accent))?;
    rudiment.add_note("R", ())?;
    rudiment.add_note("L", ())?;
    rudiment.add_note("R", Modifier::new(ModifierKind::Flam))?;
    rudiment.fit_duration(total)?;
    Ok(rudiment)
}
