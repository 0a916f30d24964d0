//! Per-call render configuration, built fresh from the exercise, the options
//! and the target size. Nothing here outlives one render call.

use crate::model::*;
use crate::parser::{parse_clef, parse_key_signature, parse_time_signature};
use crate::ticks::ticks_per_measure;
use super::constants::*;

const DEFAULT_TIME_SIGNATURE: &str = "4/4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// One stave per system, in the given clef.
    Single(Clef),
    /// Treble and bass staves joined into a grand staff.
    Grand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub layout: LayoutMode,
    pub time_signature: Option<TimeSignature>,
    pub key_signature: Option<KeySignature>,
    pub ticks_per_measure: u32,
    pub measures_per_line: u32,
    pub show_annotations: bool,
    /// Canvas width, side margins included.
    pub width: f64,
    pub height: f64,
    pub start_y: Option<f64>,
}

impl RenderContext {
    /// `surface_width` / `surface_height` of `0` mean the target has no
    /// measured size yet; defaults are used instead.
    pub fn new(exercise: &Exercise, options: &RenderOptions, surface_width: f64, surface_height: f64) -> Self {
        let layout = if exercise.is_grand() {
            LayoutMode::Grand
        } else {
            LayoutMode::Single(resolve_clef(exercise.clef.as_deref()))
        };

        let sig = exercise.time_signature.as_deref().unwrap_or(DEFAULT_TIME_SIGNATURE);

        Self {
            layout,
            time_signature: resolve_time_signature(Some(sig)),
            key_signature: resolve_key_signature(exercise.key_signature.as_deref()),
            ticks_per_measure: ticks_per_measure(Some(sig)),
            measures_per_line: MEASURES_PER_LINE,
            show_annotations: options.show_text_annotations,
            width: if surface_width > 0.0 {
                surface_width
            } else {
                DEFAULT_STAVE_WIDTH + 2.0 * STAVE_START_X
            },
            height: if surface_height > 0.0 { surface_height } else { DEFAULT_SURFACE_HEIGHT },
            start_y: options.custom_start_y,
        }
    }

    /// Every stave spans the full canvas minus the side margins.
    pub fn stave_width(&self) -> f64 {
        self.width - 2.0 * STAVE_START_X
    }

    pub fn is_grand(&self) -> bool {
        self.layout == LayoutMode::Grand
    }
}

/// Unknown clef names draw as treble.
pub(crate) fn resolve_clef(name: Option<&str>) -> Clef {
    match name.map(parse_clef) {
        None => Clef::Treble,
        Some(Ok(clef)) => clef,
        Some(Err(e)) => {
            tracing::warn!("{e}; using treble clef");
            Clef::Treble
        }
    }
}

/// A signature that cannot be parsed is simply not drawn.
pub(crate) fn resolve_time_signature(sig: Option<&str>) -> Option<TimeSignature> {
    match parse_time_signature(sig?) {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::warn!("{e}; time signature not drawn");
            None
        }
    }
}

pub(crate) fn resolve_key_signature(name: Option<&str>) -> Option<KeySignature> {
    let name = name.filter(|n| !n.trim().is_empty())?;
    match parse_key_signature(name) {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::warn!("{e}; key signature not drawn");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticks::RESOLUTION;

    #[test]
    fn defaults_for_an_unmeasured_target() {
        let ctx = RenderContext::new(&Exercise::default(), &RenderOptions::default(), 0.0, 0.0);
        assert_eq!(ctx.layout, LayoutMode::Single(Clef::Treble));
        assert_eq!(ctx.stave_width(), DEFAULT_STAVE_WIDTH);
        assert_eq!(ctx.height, DEFAULT_SURFACE_HEIGHT);
        assert_eq!(ctx.ticks_per_measure, RESOLUTION);
        assert_eq!(ctx.time_signature, Some(TimeSignature { beats: 4, beat_value: 4 }));
    }

    #[test]
    fn grand_layout_is_implied_by_both_parts() {
        let exercise = Exercise {
            notes_treble: Some(vec![]),
            notes_bass: Some(vec![]),
            ..Exercise::default()
        };
        let ctx = RenderContext::new(&exercise, &RenderOptions::default(), 600.0, 400.0);
        assert!(ctx.is_grand());
        assert_eq!(ctx.stave_width(), 570.0);
    }

    #[test]
    fn bad_signatures_degrade_quietly() {
        let exercise = Exercise {
            clef: Some("tenor".into()),
            time_signature: Some("x/y".into()),
            key_signature: Some("Q".into()),
            ..Exercise::default()
        };
        let ctx = RenderContext::new(&exercise, &RenderOptions::default(), 0.0, 0.0);
        assert_eq!(ctx.layout, LayoutMode::Single(Clef::Treble));
        assert_eq!(ctx.time_signature, None);
        assert_eq!(ctx.key_signature, None);
        assert_eq!(ctx.ticks_per_measure, RESOLUTION);
    }
}
