//! Note realization: turns a typed note event into the glyph configuration
//! handed to the drawing backend: keys, accidental requests, dots, annotation
//! text and colors.

use crate::error::RealizeError;
use crate::model::*;
use crate::segment::Line;

/// Pitch a rest is positioned on so the backend can place its glyph.
pub const REST_PLACEHOLDER: PitchSpec = PitchSpec::natural(Letter::B, 4);

/// Octaves a notehead can be drawn in.
const DRAWABLE_OCTAVES: std::ops::RangeInclusive<i32> = 0..=9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStyle {
    pub fill: &'static str,
    pub stroke: &'static str,
}

/// One note, chord or rest ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedNote {
    pub keys: Vec<PitchSpec>,
    /// Accidental glyph requests as `(key index, accidental)`.
    pub accidentals: Vec<(usize, Accidental)>,
    pub annotations: Vec<String>,
    pub code: DurationCode,
    pub dots: u8,
    pub ticks: u32,
    pub is_rest: bool,
    pub clef: Clef,
    pub style: NoteStyle,
}

/// Fill and stroke for a feedback status.
pub fn style_for(status: Status) -> NoteStyle {
    match status {
        Status::Default => NoteStyle { fill: "#333", stroke: "#333" },
        Status::Highlight => NoteStyle { fill: "#ff9800", stroke: "#e65100" },
        Status::Correct => NoteStyle { fill: "#28a745", stroke: "#1c7430" },
        Status::Incorrect => NoteStyle { fill: "rgba(220, 53, 69, 0.7)", stroke: "#a71d2a" },
        Status::Expected => NoteStyle { fill: "rgba(0, 123, 255, 0.5)", stroke: "rgba(0, 90, 200, 0.7)" },
    }
}

/// Fixed-do solfège name of a letter.
pub fn solfege(letter: Letter) -> &'static str {
    match letter {
        Letter::C => "Do",
        Letter::D => "Re",
        Letter::E => "Mi",
        Letter::F => "Fa",
        Letter::G => "Sol",
        Letter::A => "La",
        Letter::B => "Si",
    }
}

pub fn realize(event: &NoteEvent, clef: Clef, show_annotations: bool) -> Result<RealizedNote, RealizeError> {
    let mut note = RealizedNote {
        keys: Vec::new(),
        accidentals: Vec::new(),
        annotations: Vec::new(),
        code: event.duration.code,
        dots: event.duration.dots,
        ticks: event.ticks(),
        is_rest: false,
        clef,
        style: style_for(Status::Default),
    };

    match &event.kind {
        NoteKind::Rest => {
            note.keys.push(REST_PLACEHOLDER);
            note.is_rest = true;
            return Ok(note);
        }
        NoteKind::Chord(pitches) => {
            for (i, pitch) in pitches.iter().enumerate() {
                if !DRAWABLE_OCTAVES.contains(&pitch.octave) {
                    return Err(RealizeError::OctaveOutOfRange {
                        letter: pitch.letter.as_char(),
                        octave: pitch.octave,
                    });
                }
                note.keys.push(*pitch);
                if let Some(acc) = pitch.accidental {
                    note.accidentals.push((i, acc));
                }
                if show_annotations {
                    // The accidental has its own glyph; the name is the bare letter.
                    note.annotations.push(solfege(pitch.letter).to_string());
                }
            }
        }
    }

    if let Some(ann) = &event.annotation {
        if ann.replaces_name {
            note.annotations.clear();
        }
        note.annotations.push(ann.text.clone());
    }

    note.style = style_for(event.status);
    Ok(note)
}

/// Realize every event of a line, skipping the ones that cannot be drawn.
pub fn realize_line(line: &Line<'_>, clef: Clef, show_annotations: bool) -> Vec<RealizedNote> {
    line.events
        .iter()
        .filter_map(|event| match realize(event, clef, show_annotations) {
            Ok(note) => Some(note),
            Err(e) => {
                tracing::warn!("{e}; note skipped");
                None
            }
        })
        .collect()
}
