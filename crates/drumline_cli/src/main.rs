//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `drumline_core` linkage with a deterministic walk of one
//!   modulator around a paradiddle.
//! - Optionally start file logging when `DRUMLINE_LOG_DIR` is set.

use drumline_core::rudiments::paradiddle;
use drumline_core::{Direction, Modifier, ModifierKind, Sequence, SequenceError};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("DRUMLINE_LOG_DIR") {
        if let Err(err) = drumline_core::init_logging(drumline_core::default_log_level(), &log_dir)
        {
            eprintln!("logging disabled: {err}");
        }
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("drumline_cli failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SequenceError> {
    println!("drumline_core version={}", drumline_core::core_version());

    let mut rhythm = paradiddle(0.25, false)?;
    rhythm.add_modulator(Modifier::new(ModifierKind::Accent), "accent", None)?;
    println!(
        "sticking={} total_duration={}",
        rhythm.sticking_string(),
        rhythm.total_duration()
    );

    for _ in 0..rhythm.len() {
        rhythm.modulate(Direction::Forward, Some("accent"))?;
        print_state(&rhythm)?;
    }

    info!(
        "event=cli_smoke module=cli status=ok notes={}",
        rhythm.len()
    );
    Ok(())
}

fn print_state(rhythm: &Sequence) -> Result<(), SequenceError> {
    let position = rhythm.modulator_position("accent")?;
    let dynamics: Vec<String> = rhythm
        .notes()
        .iter()
        .map(|note| note.dynamic().to_string())
        .collect();
    println!(
        "accent_at={:?} dynamics=[{}]",
        position,
        dynamics.join(",")
    );
    Ok(())
}
