//! Tick contexts and x positions shared by the voices of one system, plus
//! pitch-to-staff placement.

use std::collections::BTreeMap;

use crate::error::FormatError;
use crate::model::*;
use super::constants::*;
use super::layout::Voice;
use super::realize::RealizedNote;

/// Horizontal offsets produced by formatting a system's voices.
#[derive(Debug, Clone, PartialEq)]
pub struct Formatting {
    /// Notehead center of every note, per voice, relative to the note area start.
    pub offsets: Vec<Vec<f64>>,
    /// Width the formatted notes occupy.
    pub width: f64,
}

/// Onset tick of each note in a voice.
pub(super) fn note_onsets(notes: &[RealizedNote]) -> Vec<u32> {
    let mut onsets = Vec::with_capacity(notes.len());
    let mut current = 0u32;
    for note in notes {
        onsets.push(current);
        current += note.ticks;
    }
    onsets
}

/// Room one note needs: notehead plus accidentals, dots, flag and the
/// widest annotation line.
pub(super) fn note_min_width(note: &RealizedNote) -> f64 {
    let mut w = MIN_NOTE_WIDTH + note.dots as f64 * DOT_SPACING;
    if !note.accidentals.is_empty() {
        w += ACCIDENTAL_WIDTH;
    }
    if !note.is_rest && note.code.flag_count() > 0 {
        w += FLAG_WIDTH;
    }
    let text = note
        .annotations
        .iter()
        .map(|a| a.chars().count())
        .max()
        .unwrap_or(0) as f64
        * ANNOTATION_CHAR_WIDTH;
    w.max(text + 4.0)
}

/// Room to the left of the notehead center.
fn note_left_room(note: &RealizedNote) -> f64 {
    if note.accidentals.is_empty() {
        NOTEHEAD_RX + 4.0
    } else {
        NOTEHEAD_RX + ACCIDENTAL_WIDTH
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TickContext {
    min_width: f64,
    left_room: f64,
}

/// Lay out joined voices on shared tick contexts.
///
/// Notes of different voices starting at the same tick share an x position.
/// With `width` set, contexts get at least their minimum width and any slack
/// is shared out in proportion to duration; if the minimums do not fit the
/// call fails. Without `width` every context gets exactly its minimum.
pub(super) fn format_voices(voices: &[Voice], width: Option<f64>) -> Result<Formatting, FormatError> {
    let onsets: Vec<Vec<u32>> = voices.iter().map(|v| note_onsets(&v.notes)).collect();

    let mut contexts: BTreeMap<u32, TickContext> = BTreeMap::new();
    for (voice, voice_onsets) in voices.iter().zip(&onsets) {
        for (note, &onset) in voice.notes.iter().zip(voice_onsets) {
            let ctx = contexts.entry(onset).or_default();
            ctx.min_width = ctx.min_width.max(note_min_width(note));
            ctx.left_room = ctx.left_room.max(note_left_room(note));
        }
    }
    if contexts.is_empty() {
        return Err(FormatError::NoTickables);
    }

    let total_ticks = voices.iter().map(Voice::time_span).max().unwrap_or(0).max(1);
    let ticks: Vec<u32> = contexts.keys().copied().collect();
    let mins: Vec<f64> = contexts.values().map(|c| c.min_width).collect();
    let required: f64 = mins.iter().sum();

    let width = match width {
        Some(available) if required > available => {
            return Err(FormatError::TooNarrow { required, available });
        }
        Some(available) => available,
        None => required,
    };

    // Each context's share of the width by duration, up to the next onset.
    let proportional: Vec<f64> = ticks
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let next = ticks.get(i + 1).copied().unwrap_or(total_ticks);
            (next - t) as f64 / total_ticks as f64 * width
        })
        .collect();
    let excess: f64 = proportional
        .iter()
        .zip(&mins)
        .map(|(p, m)| (p - m).max(0.0))
        .sum();
    let k = if excess > 0.0 {
        ((width - required) / excess).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut x_at: BTreeMap<u32, f64> = BTreeMap::new();
    let mut x = 0.0;
    for (i, (&t, ctx)) in contexts.iter().enumerate() {
        x_at.insert(t, x + ctx.left_room);
        x += mins[i] + (proportional[i] - mins[i]).max(0.0) * k;
    }

    let offsets = onsets
        .iter()
        .map(|voice_onsets| voice_onsets.iter().map(|t| x_at[t]).collect())
        .collect();

    Ok(Formatting { offsets, width: x })
}

/// Vertical offset of a pitch from the top staff line (down is positive).
pub(super) fn pitch_to_staff_y(pitch: &PitchSpec, clef: Clef) -> f64 {
    let (ref_position, ref_line) = match clef {
        Clef::Treble => (4 * 7 + 4, 2), // G4 on the second line
        Clef::Bass => (3 * 7 + 3, 4),   // F3 on the fourth line
        Clef::Alto => (4 * 7, 3),       // C4 on the middle line
    };
    let ref_y = (5 - ref_line) as f64 * STAFF_LINE_SPACING;
    let staff_steps = pitch.diatonic_position() - ref_position;
    ref_y - staff_steps as f64 * (STAFF_LINE_SPACING / 2.0)
}
