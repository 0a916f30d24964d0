//! Beam grouping for a formatted voice.

use crate::ticks::BEAT_TICKS;
use super::layout::Voice;

/// Consecutive notes of a voice joined by one beam, as indices into `voice.notes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamGroup {
    pub notes: Vec<usize>,
}

/// Group the voice's beamable notes by quarter-note beat.
///
/// Rests are left out entirely, so they neither join nor split a group.
/// Notes of a quarter or longer close the current group; a group needs at
/// least two notes to get a beam.
pub fn generate_beams(voice: &Voice) -> Vec<BeamGroup> {
    let mut groups = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_beat = 0u32;
    let mut onset = 0u32;

    let mut flush = |current: &mut Vec<usize>| {
        if current.len() >= 2 {
            groups.push(BeamGroup { notes: std::mem::take(current) });
        } else {
            current.clear();
        }
    };

    for (i, note) in voice.notes.iter().enumerate() {
        let beat = onset / BEAT_TICKS;
        onset += note.ticks;

        if note.is_rest {
            continue;
        }
        if note.code.flag_count() == 0 {
            flush(&mut current);
            continue;
        }
        if !current.is_empty() && beat != current_beat {
            flush(&mut current);
        }
        if current.is_empty() {
            current_beat = beat;
        }
        current.push(i);
    }
    flush(&mut current);

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::parser::parse_note_event;
    use crate::renderer::layout::StaveSlot;
    use crate::renderer::realize::realize;
    use pretty_assertions::assert_eq;

    fn voice(durations: &[&str]) -> Voice {
        let notes = durations
            .iter()
            .map(|d| {
                let keys: &[&str] = if d.ends_with('r') { &["r/4"] } else { &["e/4"] };
                let ev = parse_note_event(&NoteEventSpec::new(keys, d)).unwrap();
                realize(&ev, Clef::Treble, false).unwrap()
            })
            .collect();
        Voice::new(StaveSlot::Upper, notes)
    }

    fn groups(v: &Voice) -> Vec<Vec<usize>> {
        generate_beams(v).into_iter().map(|g| g.notes).collect()
    }

    #[test]
    fn eighths_pair_up_per_beat() {
        let v = voice(&["8", "8", "8", "8"]);
        assert_eq!(groups(&v), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn sixteenths_fill_a_beat() {
        let v = voice(&["16", "16", "16", "16", "8", "8"]);
        assert_eq!(groups(&v), vec![vec![0, 1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn quarters_and_lone_notes_get_no_beam() {
        let v = voice(&["q", "8", "8", "q"]);
        assert_eq!(groups(&v), vec![vec![1, 2]]);

        // Off-beat eighth followed by an on-beat one: different beats.
        let v = voice(&["q", "8", "q", "8", "8"]);
        assert!(generate_beams(&v).is_empty());

        let v = voice(&["q.", "8"]);
        assert!(generate_beams(&v).is_empty());
    }

    #[test]
    fn rests_are_skipped_not_beamed() {
        let v = voice(&["16", "16r", "16", "16"]);
        assert_eq!(groups(&v), vec![vec![0, 2, 3]]);
    }
}
