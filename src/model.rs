//! Data model for exercises handed to the score engine.
//!
//! Two layers live here: the serde wire shapes callers send (`Exercise`,
//! `NoteEventSpec`, `RenderOptions`) and the typed values the engine works on
//! once the strings have been parsed (`NoteEvent`, `PitchSpec`, `Duration`).

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Wire shapes
// ═══════════════════════════════════════════════════════════════════════

/// An exercise as sent by the UI layer.
///
/// Single-stave exercises use `clef` + `notes`; grand-staff exercises set
/// `stave_layout` to `"grand"` and fill `notes_treble` / `notes_bass`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Exercise {
    pub clef: Option<String>,
    pub stave_layout: Option<String>,
    pub time_signature: Option<String>,
    pub key_signature: Option<String>,
    pub notes: Option<Vec<NoteEventSpec>>,
    pub notes_treble: Option<Vec<NoteEventSpec>>,
    pub notes_bass: Option<Vec<NoteEventSpec>>,
}

impl Exercise {
    /// Grand layout is requested explicitly, or implied by both parts being present.
    pub fn is_grand(&self) -> bool {
        self.stave_layout.as_deref() == Some("grand")
            || (self.notes_treble.is_some() && self.notes_bass.is_some())
    }
}

/// One note, chord or rest in wire form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteEventSpec {
    /// `"c/4"`, `"f#/5"`, `"bb/3"`, or a rest marker (`"r"`, `"r/4"`)
    pub keys: Vec<String>,
    /// Duration code, optionally dotted (`"q."`, `"hd"`) or rest-suffixed (`"8r"`)
    pub duration: String,
    pub status: Option<String>,
    /// `"r"` marks a rest
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Free text drawn on the note in addition to the computed name
    pub annotation: Option<String>,
    /// When set, `annotation` replaces the computed name instead of joining it
    pub annotation_replaces_name: bool,
}

impl NoteEventSpec {
    pub fn new(keys: &[&str], duration: &str) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            duration: duration.to_string(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }
}

/// Per-call rendering options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub show_text_annotations: bool,
    pub custom_start_y: Option<f64>,
}

/// Arguments of the explicit empty-staff call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmptyStaffRequest {
    pub clef: String,
    pub time_signature: Option<String>,
    pub key_signature: Option<String>,
    /// Requested stave width; `None` or `0` uses the surface width
    pub width: Option<f64>,
    pub force_full_width: bool,
    pub custom_start_y: Option<f64>,
}

impl Default for EmptyStaffRequest {
    fn default() -> Self {
        Self {
            clef: "treble".into(),
            time_signature: Some("4/4".into()),
            key_signature: Some("C".into()),
            width: None,
            force_full_width: false,
            custom_start_y: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Typed values
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Diatonic index within an octave, C = 0.
    pub fn step_index(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Sharp,
    Flat,
    DoubleSharp,
    DoubleFlat,
}

impl Accidental {
    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
            Accidental::DoubleSharp => "##",
            Accidental::DoubleFlat => "bb",
        }
    }
}

/// A spelled pitch: letter, explicit accidental, octave (C4 = middle C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PitchSpec {
    pub letter: Letter,
    pub accidental: Option<Accidental>,
    pub octave: i32,
}

impl PitchSpec {
    pub const fn natural(letter: Letter, octave: i32) -> Self {
        Self { letter, accidental: None, octave }
    }

    /// Diatonic position counted from C0; used for staff placement.
    pub fn diatonic_position(&self) -> i32 {
        self.octave * 7 + self.letter.step_index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationCode {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl DurationCode {
    /// Number of flags (or beams) a note of this value carries.
    pub fn flag_count(self) -> usize {
        match self {
            DurationCode::Whole | DurationCode::Half | DurationCode::Quarter => 0,
            DurationCode::Eighth => 1,
            DurationCode::Sixteenth => 2,
            DurationCode::ThirtySecond => 3,
            DurationCode::SixtyFourth => 4,
        }
    }

    pub fn has_stem(self) -> bool {
        self != DurationCode::Whole
    }

    pub fn is_filled(self) -> bool {
        !matches!(self, DurationCode::Whole | DurationCode::Half)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    pub code: DurationCode,
    pub dots: u8,
}

impl Duration {
    pub const fn plain(code: DurationCode) -> Self {
        Self { code, dots: 0 }
    }

    pub const fn dotted(code: DurationCode, dots: u8) -> Self {
        Self { code, dots }
    }

    pub fn ticks(&self) -> u32 {
        crate::ticks::ticks(self.code, self.dots)
    }
}

/// Feedback state a note is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Default,
    Highlight,
    Correct,
    Incorrect,
    Expected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteKind {
    Rest,
    /// One or more simultaneous pitches; never empty.
    Chord(Vec<PitchSpec>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub text: String,
    pub replaces_name: bool,
}

/// A parsed note event. Built once from a `NoteEventSpec` and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEvent {
    pub kind: NoteKind,
    pub duration: Duration,
    pub status: Status,
    pub annotation: Option<Annotation>,
}

impl NoteEvent {
    pub fn rest(duration: Duration) -> Self {
        Self {
            kind: NoteKind::Rest,
            duration,
            status: Status::Default,
            annotation: None,
        }
    }

    pub fn chord(pitches: Vec<PitchSpec>, duration: Duration) -> Self {
        Self {
            kind: NoteKind::Chord(pitches),
            duration,
            status: Status::Default,
            annotation: None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, NoteKind::Rest)
    }

    pub fn ticks(&self) -> u32 {
        self.duration.ticks()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_value: u32,
}

/// A key signature by name together with its position on the circle of
/// fifths (sharps positive, flats negative).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySignature {
    pub name: String,
    pub fifths: i32,
}

impl KeySignature {
    /// C major and A minor draw nothing.
    pub fn has_accidentals(&self) -> bool {
        self.fifths != 0
    }
}
