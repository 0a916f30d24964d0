//! Error types for boundary parsing, note realization, formatting and drawing.
//!
//! None of these escape the public entry points: malformed notes are dropped,
//! formatting failures are retried, and drawing failures become an inline
//! message on the target surface.

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// A wire string that could not be turned into a typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("note has no keys")]
    MissingKeys,

    #[error("invalid key '{0}': expected <letter>[accidental]/<octave>")]
    InvalidKey(String),

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("invalid time signature '{0}'")]
    InvalidTimeSignature(String),

    #[error("unknown key signature '{0}'")]
    UnknownKeySignature(String),

    #[error("unknown clef '{0}'")]
    UnknownClef(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// A typed note event that cannot be placed on a staff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RealizeError {
    #[error("octave {octave} of {letter} is outside the drawable range")]
    OctaveOutOfRange { letter: char, octave: i32 },
}

/// The backend could not lay out a system's voices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("voices need {required:.1} units but only {available:.1} are available")]
    TooNarrow { required: f64, available: f64 },

    #[error("voices contain no tickable notes")]
    NoTickables,
}

/// Anything that aborts drawing into a target surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("target '{0}' not found")]
    TargetMissing(String),

    #[error("invalid stave geometry: {0}")]
    Geometry(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl RenderError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }
}
