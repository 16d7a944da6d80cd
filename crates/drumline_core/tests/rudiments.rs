use drumline_core::rudiments::{flam_accent, flamacue, paradiddle, paradiddlediddle};
use drumline_core::{Direction, Location, Modifier, ModifierKind};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn paradiddle_spreads_total_over_four_notes() {
    let rudiment = paradiddle(0.25, true).unwrap();

    assert_eq!(rudiment.sticking_string(), "RLRR");
    assert_eq!(rudiment.total_duration(), 0.25);
    assert!(rudiment.notes().iter().all(|note| note.duration() == 0.0625));
    assert_eq!(rudiment.notes()[0].dynamic(), 12);
    assert_eq!(rudiment.notes()[1].dynamic(), 3);
}

#[test]
fn unaccented_paradiddle_has_no_modifiers() {
    let rudiment = paradiddle(0.5, false).unwrap();

    assert!(rudiment
        .notes()
        .iter()
        .all(|note| note.modifiers().is_empty()));
}

#[test]
fn paradiddlediddle_extends_with_double() {
    let rudiment = paradiddlediddle(0.25).unwrap();

    assert_eq!(rudiment.sticking_string(), "RLRRLL");
    assert_close(rudiment.total_duration(), 0.25);
    assert!(rudiment.notes()[0].has_modifier(ModifierKind::Accent));
}

#[test]
fn flam_accent_places_grace_note_left_and_accent_on_top() {
    let rudiment = flam_accent(0.25).unwrap();
    let first = &rudiment.notes()[0];

    assert_eq!(rudiment.sticking_string(), "RLR");
    assert_close(rudiment.total_duration(), 0.25);
    assert_eq!(
        first.attached_at(Location::Left)[0].kind(),
        ModifierKind::Flam
    );
    assert_eq!(
        first.attached_at(Location::Top)[0].kind(),
        ModifierKind::Accent
    );
}

#[test]
fn flamacue_flams_both_ends() {
    let rudiment = flamacue(5.0 / 16.0).unwrap();

    assert_eq!(rudiment.sticking_string(), "RLRLR");
    assert_eq!(rudiment.total_duration(), 5.0 / 16.0);
    assert!(rudiment.notes()[0].has_modifier(ModifierKind::Flam));
    assert!(rudiment.notes()[1].has_modifier(ModifierKind::Accent));
    assert!(rudiment.notes()[4].has_modifier(ModifierKind::Flam));
}

#[test]
fn moving_accent_walks_a_paradiddle() {
    let mut rudiment = paradiddle(0.25, false).unwrap();
    rudiment
        .add_modulator(Modifier::new(ModifierKind::Accent), "accent", None)
        .unwrap();

    let mut accented = Vec::new();
    for _ in 0..4 {
        rudiment.modulate(Direction::Forward, None).unwrap();
        let loud: Vec<usize> = rudiment
            .notes()
            .iter()
            .enumerate()
            .filter(|(_, note)| note.dynamic() == 12)
            .map(|(index, _)| index)
            .collect();
        accented.push(loud);
    }

    assert_eq!(accented, vec![vec![0], vec![1], vec![2], vec![3]]);
}
