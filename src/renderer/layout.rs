//! System layout: pairs the segmented lines of each part into systems,
//! bundles realized notes into voices, and places the staves.

use crate::model::*;
use crate::segment::Line;
use crate::ticks::{beats_for_ticks, RESOLUTION};
use super::constants::*;
use super::context::{LayoutMode, RenderContext};
use super::realize::{realize_line, RealizedNote};

// ═══════════════════════════════════════════════════════════════════════
// Layout structures
// ═══════════════════════════════════════════════════════════════════════

/// Which stave of a system a voice is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaveSlot {
    Upper,
    Lower,
}

/// Position and modifiers of one stave.
#[derive(Debug, Clone, PartialEq)]
pub struct StaveGeometry {
    pub x: f64,
    /// Top of the stave box; the first staff line sits `STAFF_TOP_PADDING` below.
    pub y: f64,
    pub width: f64,
    pub clef: Clef,
    pub key_signature: Option<KeySignature>,
    pub time_signature: Option<TimeSignature>,
}

impl StaveGeometry {
    pub fn staff_top(&self) -> f64 {
        self.y + STAFF_TOP_PADDING
    }

    pub fn staff_bottom(&self) -> f64 {
        self.staff_top() + STAFF_HEIGHT
    }

    /// Horizontal room taken by clef, key and time signature.
    pub fn modifier_width(&self) -> f64 {
        CLEF_SPACE
            + key_sig_width(self.key_signature.as_ref())
            + if self.time_signature.is_some() { TIME_SIG_SPACE } else { 0.0 }
    }

    /// Narrowest stave that still fits its modifiers.
    pub fn min_width(&self) -> f64 {
        self.modifier_width() + 2.0 * NOTE_AREA_PADDING
    }

    pub fn note_start_x(&self) -> f64 {
        self.x + self.modifier_width() + NOTE_AREA_PADDING
    }

    pub fn note_area_width(&self) -> f64 {
        (self.x + self.width - NOTE_AREA_PADDING) - self.note_start_x()
    }
}

/// One rhythmic stream of realized notes on one stave.
///
/// The declared beat count comes from the ticks actually present, so partial
/// and irregular lines are accepted as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub slot: StaveSlot,
    pub notes: Vec<RealizedNote>,
    pub num_beats: u32,
    pub beat_value: u32,
}

impl Voice {
    pub fn new(slot: StaveSlot, notes: Vec<RealizedNote>) -> Self {
        let ticks: u32 = notes.iter().map(|n| n.ticks).sum();
        Self {
            slot,
            notes,
            num_beats: beats_for_ticks(ticks),
            beat_value: 4,
        }
    }

    pub fn total_ticks(&self) -> u32 {
        self.notes.iter().map(|n| n.ticks).sum()
    }

    /// Ticks covered by the declared beats; the formatter spreads notes over this span.
    pub fn time_span(&self) -> u32 {
        self.num_beats.saturating_mul(RESOLUTION / self.beat_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    Brace,
    SingleLeft,
    SingleRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemLayout {
    pub index: usize,
    pub upper: StaveGeometry,
    pub lower: Option<StaveGeometry>,
    pub connectors: Vec<Connector>,
    pub voices: Vec<Voice>,
}

impl SystemLayout {
    pub fn stave(&self, slot: StaveSlot) -> Option<&StaveGeometry> {
        match slot {
            StaveSlot::Upper => Some(&self.upper),
            StaveSlot::Lower => self.lower.as_ref(),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.lower.as_ref().unwrap_or(&self.upper).y + STAVE_BOX_HEIGHT
    }

    /// Right edge of the widest stave.
    pub fn right(&self) -> f64 {
        std::iter::once(&self.upper)
            .chain(self.lower.as_ref())
            .map(|s| s.x + s.width)
            .fold(0.0, f64::max)
    }
}

/// Segmented lines of the two parts. Single-stave exercises only use `upper`.
#[derive(Debug, Clone, Default)]
pub struct PartLines<'a> {
    pub upper: Vec<Line<'a>>,
    pub lower: Vec<Line<'a>>,
}

// ═══════════════════════════════════════════════════════════════════════
// Helper functions
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn key_sig_width(key: Option<&KeySignature>) -> f64 {
    match key {
        Some(k) if k.fifths > 0 => k.fifths as f64 * KEY_SIG_SHARP_SPACE,
        Some(k) if k.fifths < 0 => k.fifths.unsigned_abs() as f64 * KEY_SIG_FLAT_SPACE,
        _ => 0.0,
    }
}

fn voice_for(line: Option<&Line<'_>>, slot: StaveSlot, clef: Clef, show_annotations: bool) -> Option<Voice> {
    let notes = realize_line(line?, clef, show_annotations);
    if notes.is_empty() {
        return None;
    }
    Some(Voice::new(slot, notes))
}

// ═══════════════════════════════════════════════════════════════════════
// Main layout computation
// ═══════════════════════════════════════════════════════════════════════

/// Build one system per line index.
///
/// Parts are paired purely by index: line `i` of the treble part shares a
/// system with line `i` of the bass part whatever their musical onsets. A part
/// that has run out of lines gets an empty stave.
pub fn layout_systems(parts: &PartLines<'_>, ctx: &RenderContext) -> Vec<SystemLayout> {
    let num_systems = match ctx.layout {
        LayoutMode::Grand => parts.upper.len().max(parts.lower.len()),
        LayoutMode::Single(_) => parts.upper.len(),
    };
    let stave_width = ctx.stave_width();
    let key = ctx.key_signature.clone().filter(KeySignature::has_accidentals);

    let mut systems = Vec::with_capacity(num_systems);

    for i in 0..num_systems {
        let is_first = i == 0;
        // A stave never comes out narrower than its modifiers; a tight note
        // area is left to the formatter.
        let stave = |y: f64, clef: Clef| {
            let mut geometry = StaveGeometry {
                x: STAVE_START_X,
                y,
                width: stave_width,
                clef,
                key_signature: if is_first { key.clone() } else { None },
                time_signature: if is_first { ctx.time_signature } else { None },
            };
            geometry.width = geometry.width.max(geometry.min_width());
            geometry
        };

        let system = match ctx.layout {
            LayoutMode::Single(clef) => {
                let y = ctx.start_y.unwrap_or(STAVE_START_Y_SINGLE)
                    + i as f64 * SINGLE_STAVE_SYSTEM_SPACING;
                let voices = voice_for(parts.upper.get(i), StaveSlot::Upper, clef, ctx.show_annotations)
                    .into_iter()
                    .collect();
                SystemLayout {
                    index: i,
                    upper: stave(y, clef),
                    lower: None,
                    connectors: Vec::new(),
                    voices,
                }
            }
            LayoutMode::Grand => {
                let treble_y = ctx.start_y.unwrap_or(STAVE_START_Y_GRAND) + i as f64 * GRAND_SYSTEM_SPACING;
                let bass_y = treble_y + GRAND_STAVE_DISTANCE;

                let mut connectors = Vec::with_capacity(3);
                if is_first {
                    connectors.push(Connector::Brace);
                }
                connectors.push(Connector::SingleLeft);
                connectors.push(Connector::SingleRight);

                let voices = [
                    voice_for(parts.upper.get(i), StaveSlot::Upper, Clef::Treble, ctx.show_annotations),
                    voice_for(parts.lower.get(i), StaveSlot::Lower, Clef::Bass, ctx.show_annotations),
                ]
                .into_iter()
                .flatten()
                .collect();

                SystemLayout {
                    index: i,
                    upper: stave(treble_y, Clef::Treble),
                    lower: Some(stave(bass_y, Clef::Bass)),
                    connectors,
                    voices,
                }
            }
        };

        tracing::debug!(system = i, voices = system.voices.len(), "system laid out");
        systems.push(system);
    }

    systems
}
