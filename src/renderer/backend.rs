//! The drawing seam: everything the layout pipeline asks of a notation
//! engine, and the SVG engine that answers it.

use crate::error::{FormatError, RenderError, RenderResult};
use super::beams::BeamGroup;
use super::beat_map::{format_voices, Formatting};
use super::layout::{Connector, StaveGeometry, Voice};
use super::svg_builder::SvgBuilder;
use super::{notes, staff};

/// A notation engine the renderer draws through.
///
/// Calls arrive in drawing order: `begin`, then per system its staves,
/// connectors, one `format` attempt or two, voices and beams.
pub trait NotationBackend {
    /// Start a fresh canvas, dropping anything drawn before.
    fn begin(&mut self, width: f64, height: f64);

    fn draw_stave(&mut self, stave: &StaveGeometry) -> RenderResult<()>;

    fn draw_connector(&mut self, connector: Connector, upper: &StaveGeometry, lower: &StaveGeometry) -> RenderResult<()>;

    /// Lay out joined voices. `Some(width)` constrains them to that width;
    /// `None` lets them take their natural width.
    fn format(&mut self, voices: &[Voice], width: Option<f64>) -> Result<Formatting, FormatError>;

    /// Draw a formatted voice; returns how many notes were drawn.
    fn draw_voice(&mut self, voice: &Voice, stave: &StaveGeometry, offsets: &[f64], beams: &[BeamGroup]) -> RenderResult<usize>;

    fn draw_beam(&mut self, voice: &Voice, stave: &StaveGeometry, offsets: &[f64], group: &BeamGroup) -> RenderResult<()>;

    /// The document drawn since the last `begin`.
    fn finish(&self) -> String;
}

/// Renders into an SVG document.
pub struct SvgBackend {
    svg: SvgBuilder,
}

impl SvgBackend {
    pub fn new() -> Self {
        Self { svg: SvgBuilder::new(0.0, 0.0) }
    }
}

impl Default for SvgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NotationBackend for SvgBackend {
    fn begin(&mut self, width: f64, height: f64) {
        self.svg = SvgBuilder::new(width, height);
    }

    fn draw_stave(&mut self, stave: &StaveGeometry) -> RenderResult<()> {
        if ![stave.x, stave.y, stave.width].iter().all(|v| v.is_finite()) {
            return Err(RenderError::geometry(format!(
                "non-finite stave at ({}, {}) width {}",
                stave.x, stave.y, stave.width
            )));
        }
        if stave.width < stave.min_width() {
            return Err(RenderError::geometry(format!(
                "stave width {:.1} is narrower than its modifiers ({:.1})",
                stave.width,
                stave.min_width()
            )));
        }
        staff::render_stave(&mut self.svg, stave);
        Ok(())
    }

    fn draw_connector(&mut self, connector: Connector, upper: &StaveGeometry, lower: &StaveGeometry) -> RenderResult<()> {
        staff::render_connector(&mut self.svg, connector, upper, lower);
        Ok(())
    }

    fn format(&mut self, voices: &[Voice], width: Option<f64>) -> Result<Formatting, FormatError> {
        format_voices(voices, width)
    }

    fn draw_voice(&mut self, voice: &Voice, stave: &StaveGeometry, offsets: &[f64], beams: &[BeamGroup]) -> RenderResult<usize> {
        if offsets.len() != voice.notes.len() {
            return Err(RenderError::geometry(format!(
                "{} offsets for {} notes",
                offsets.len(),
                voice.notes.len()
            )));
        }
        Ok(notes::render_voice(&mut self.svg, voice, stave, offsets, beams))
    }

    fn draw_beam(&mut self, voice: &Voice, stave: &StaveGeometry, offsets: &[f64], group: &BeamGroup) -> RenderResult<()> {
        notes::render_beam(&mut self.svg, voice, stave, offsets, group);
        Ok(())
    }

    fn finish(&self) -> String {
        self.svg.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Clef;

    fn stave(width: f64) -> StaveGeometry {
        StaveGeometry {
            x: 15.0,
            y: 20.0,
            width,
            clef: Clef::Bass,
            key_signature: None,
            time_signature: None,
        }
    }

    #[test]
    fn begin_clears_the_canvas() {
        let mut backend = SvgBackend::new();
        backend.begin(300.0, 150.0);
        backend.draw_stave(&stave(200.0)).unwrap();
        assert!(backend.finish().contains("<line"));

        backend.begin(300.0, 150.0);
        assert!(!backend.finish().contains("<line"));
    }

    #[test]
    fn bad_stave_geometry_is_an_error() {
        let mut backend = SvgBackend::new();
        backend.begin(300.0, 150.0);
        assert!(matches!(backend.draw_stave(&stave(20.0)), Err(RenderError::Geometry(_))));
        assert!(matches!(backend.draw_stave(&stave(f64::NAN)), Err(RenderError::Geometry(_))));
    }
}
