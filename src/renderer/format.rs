//! Two-attempt formatting: constrained to the stave first, then at natural
//! width.

use crate::error::FormatError;
use super::backend::NotationBackend;
use super::beat_map::Formatting;
use super::layout::Voice;

#[derive(Debug, Clone, PartialEq)]
pub enum FormatAttempt {
    /// Fitted into the available width.
    Constrained(Formatting),
    /// Only fitted at natural width; may overflow the stave.
    Relaxed(Formatting),
    /// Both attempts failed with this error.
    Failed(FormatError),
}

/// Summary of a system's formatting for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStatus {
    Constrained,
    Relaxed,
    Failed,
    /// The system had nothing to format.
    NoVoices,
}

impl FormatAttempt {
    pub fn formatting(&self) -> Option<&Formatting> {
        match self {
            FormatAttempt::Constrained(f) | FormatAttempt::Relaxed(f) => Some(f),
            FormatAttempt::Failed(_) => None,
        }
    }

    pub fn status(&self) -> FormatStatus {
        match self {
            FormatAttempt::Constrained(_) => FormatStatus::Constrained,
            FormatAttempt::Relaxed(_) => FormatStatus::Relaxed,
            FormatAttempt::Failed(_) => FormatStatus::Failed,
        }
    }
}

pub fn format_with_retry<B: NotationBackend + ?Sized>(
    backend: &mut B,
    system: usize,
    voices: &[Voice],
    width: f64,
) -> FormatAttempt {
    match backend.format(voices, Some(width)) {
        Ok(f) => FormatAttempt::Constrained(f),
        Err(first) => {
            tracing::warn!(system, width, "formatting failed ({first}); retrying at natural width");
            match backend.format(voices, None) {
                Ok(f) => FormatAttempt::Relaxed(f),
                Err(second) => {
                    tracing::error!(system, "formatting failed again ({second}); skipping the system's notes");
                    FormatAttempt::Failed(second)
                }
            }
        }
    }
}
