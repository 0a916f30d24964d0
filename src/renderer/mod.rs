//! Score renderer: turns an exercise into drawn staves through a
//! [`NotationBackend`].
//!
//! The pipeline per call is parse → segment → layout → per system
//! (staves, connectors, format, voices, beams). Layout is computed in full
//! before anything is drawn so the canvas can be sized once.

mod constants;
mod svg_builder;
mod staff;
mod notes;
pub mod backend;
pub mod beams;
pub mod beat_map;
pub mod context;
pub mod format;
pub mod layout;
pub mod realize;

use crate::error::RenderResult;
use crate::model::*;
use crate::parser::parse_note_event;
use crate::segment::segment;
use constants::*;
use context::{resolve_clef, resolve_key_signature, resolve_time_signature, RenderContext};
use layout::{layout_systems, PartLines, StaveGeometry, SystemLayout};

pub use backend::{NotationBackend, SvgBackend};
pub use beams::{generate_beams, BeamGroup};
pub use beat_map::Formatting;
pub use format::{format_with_retry, FormatAttempt, FormatStatus};
pub(crate) use svg_builder::message_svg;

// ═══════════════════════════════════════════════════════════════════════
// Reports
// ═══════════════════════════════════════════════════════════════════════

/// What happened to one system.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemReport {
    pub index: usize,
    pub format: FormatStatus,
    pub notes_drawn: usize,
    pub beams: usize,
}

/// What one render call drew.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderReport {
    pub systems: Vec<SystemReport>,
    /// Note events rejected at parse or realization time.
    pub dropped_notes: usize,
    /// The bare-stave fallback was drawn instead of systems.
    pub empty_staff: bool,
    pub width: f64,
    pub height: f64,
}

impl RenderReport {
    pub fn notes_drawn(&self) -> usize {
        self.systems.iter().map(|s| s.notes_drawn).sum()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Draw an exercise through `backend` on a canvas of the given size.
///
/// A `width` or `height` of 0 means the target has not been measured and
/// defaults are used. Malformed notes are dropped, systems whose voices
/// cannot be formatted are left without notes, and an exercise with nothing
/// drawable gets a bare stave. Only backend drawing failures are returned.
pub fn draw_exercise<B: NotationBackend + ?Sized>(
    backend: &mut B,
    exercise: &Exercise,
    options: &RenderOptions,
    width: f64,
    height: f64,
) -> RenderResult<RenderReport> {
    let ctx = RenderContext::new(exercise, options, width, height);
    let mut report = RenderReport::default();

    let (upper_specs, lower_specs) = if ctx.is_grand() {
        (exercise.notes_treble.as_deref(), exercise.notes_bass.as_deref())
    } else {
        (exercise.notes.as_deref(), None)
    };
    let upper_events = parse_part(upper_specs, &mut report.dropped_notes);
    let lower_events = parse_part(lower_specs, &mut report.dropped_notes);

    let parts = PartLines {
        upper: segment(&upper_events, ctx.ticks_per_measure, ctx.measures_per_line),
        lower: segment(&lower_events, ctx.ticks_per_measure, ctx.measures_per_line),
    };
    let systems = layout_systems(&parts, &ctx);

    let realized: usize = systems
        .iter()
        .flat_map(|s| &s.voices)
        .map(|v| v.notes.len())
        .sum();
    report.dropped_notes += upper_events.len() + lower_events.len() - realized;

    if realized == 0 {
        tracing::debug!("no drawable notes; drawing a bare stave");
        let request = fallback_request(exercise, &ctx);
        let (w, h) = draw_empty_staff(backend, &request, width, height)?;
        report.empty_staff = true;
        report.width = w;
        report.height = h;
        return Ok(report);
    }

    let bottom = systems.iter().map(SystemLayout::bottom).fold(0.0, f64::max);
    let right = systems.iter().map(SystemLayout::right).fold(0.0, f64::max);
    report.width = ctx.width.max(right + STAVE_START_X);
    report.height = ctx.height.max(bottom + BOTTOM_MARGIN);
    backend.begin(report.width, report.height);

    for system in &systems {
        report.systems.push(draw_system(backend, system)?);
    }

    tracing::debug!(
        systems = report.systems.len(),
        notes = report.notes_drawn(),
        dropped = report.dropped_notes,
        "exercise drawn"
    );
    Ok(report)
}

/// Draw one stave with its clef and signatures and nothing else.
///
/// Returns the canvas size used. The stave never comes out narrower than its
/// modifiers, so this only fails if the backend itself fails.
pub fn draw_empty_staff<B: NotationBackend + ?Sized>(
    backend: &mut B,
    request: &EmptyStaffRequest,
    surface_width: f64,
    surface_height: f64,
) -> RenderResult<(f64, f64)> {
    let canvas_width = if surface_width > 0.0 { surface_width } else { EMPTY_STAFF_DEFAULT_WIDTH };
    let canvas_height = if surface_height > 0.0 { surface_height } else { EMPTY_STAFF_DEFAULT_HEIGHT };

    let full_width = canvas_width - 2.0 * STAVE_START_X;
    let requested = match request.width {
        Some(w) if w > 0.0 && !request.force_full_width => w.min(full_width),
        _ => full_width,
    };

    let mut stave = StaveGeometry {
        x: STAVE_START_X,
        y: request
            .custom_start_y
            .unwrap_or_else(|| EMPTY_STAFF_MIN_Y.max((canvas_height - EMPTY_STAFF_BOX_HEIGHT) / 2.0)),
        width: requested,
        clef: resolve_clef(Some(&request.clef)),
        key_signature: resolve_key_signature(request.key_signature.as_deref())
            .filter(KeySignature::has_accidentals),
        time_signature: resolve_time_signature(request.time_signature.as_deref()),
    };
    stave.width = stave.width.max(stave.min_width());
    let canvas_width = canvas_width.max(stave.width + 2.0 * STAVE_START_X);

    backend.begin(canvas_width, canvas_height);
    backend.draw_stave(&stave)?;
    Ok((canvas_width, canvas_height))
}

// ═══════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════

fn parse_part(specs: Option<&[NoteEventSpec]>, dropped: &mut usize) -> Vec<NoteEvent> {
    specs
        .unwrap_or_default()
        .iter()
        .filter_map(|spec| match parse_note_event(spec) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(keys = ?spec.keys, duration = %spec.duration, "{e}; note dropped");
                *dropped += 1;
                None
            }
        })
        .collect()
}

/// The bare stave shown for an exercise with nothing to draw. Grand
/// exercises fall back to a treble stave.
fn fallback_request(exercise: &Exercise, ctx: &RenderContext) -> EmptyStaffRequest {
    let clef = match ctx.layout {
        context::LayoutMode::Grand => "treble".to_string(),
        context::LayoutMode::Single(_) => exercise.clef.clone().unwrap_or_else(|| "treble".into()),
    };
    EmptyStaffRequest {
        clef,
        time_signature: Some(exercise.time_signature.clone().unwrap_or_else(|| "4/4".into())),
        key_signature: exercise.key_signature.clone(),
        width: None,
        force_full_width: true,
        custom_start_y: ctx.start_y,
    }
}

fn draw_system<B: NotationBackend + ?Sized>(backend: &mut B, system: &SystemLayout) -> RenderResult<SystemReport> {
    backend.draw_stave(&system.upper)?;
    if let Some(lower) = &system.lower {
        backend.draw_stave(lower)?;
        for &connector in &system.connectors {
            backend.draw_connector(connector, &system.upper, lower)?;
        }
    }

    let mut report = SystemReport {
        index: system.index,
        format: FormatStatus::NoVoices,
        notes_drawn: 0,
        beams: 0,
    };
    if system.voices.is_empty() {
        return Ok(report);
    }

    let width = system
        .voices
        .iter()
        .filter_map(|v| system.stave(v.slot))
        .map(StaveGeometry::note_area_width)
        .fold(f64::INFINITY, f64::min);

    let attempt = format_with_retry(backend, system.index, &system.voices, width);
    report.format = attempt.status();
    let Some(formatting) = attempt.formatting() else {
        return Ok(report);
    };

    for (voice, offsets) in system.voices.iter().zip(&formatting.offsets) {
        let Some(stave) = system.stave(voice.slot) else {
            tracing::warn!(system = system.index, "voice has no stave; skipped");
            continue;
        };
        let beams = generate_beams(voice);
        report.notes_drawn += backend.draw_voice(voice, stave, offsets, &beams)?;
        for group in &beams {
            backend.draw_beam(voice, stave, offsets, group)?;
        }
        report.beams += beams.len();
    }

    tracing::debug!(
        system = system.index,
        notes = report.notes_drawn,
        beams = report.beams,
        format = ?report.format,
        "system drawn"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, RenderError};
    use super::layout::{Connector, Voice};
    use pretty_assertions::assert_eq;

    /// Records calls and fails formatting a set number of times.
    #[derive(Default)]
    struct Recorder {
        svg: SvgBackend,
        format_failures: usize,
        format_calls: Vec<Option<f64>>,
        staves: usize,
        connectors: Vec<Connector>,
        fail_voices: bool,
    }

    impl NotationBackend for Recorder {
        fn begin(&mut self, width: f64, height: f64) {
            self.svg.begin(width, height);
        }

        fn draw_stave(&mut self, stave: &StaveGeometry) -> RenderResult<()> {
            self.staves += 1;
            self.svg.draw_stave(stave)
        }

        fn draw_connector(&mut self, connector: Connector, upper: &StaveGeometry, lower: &StaveGeometry) -> RenderResult<()> {
            self.connectors.push(connector);
            self.svg.draw_connector(connector, upper, lower)
        }

        fn format(&mut self, voices: &[Voice], width: Option<f64>) -> Result<Formatting, FormatError> {
            self.format_calls.push(width);
            if self.format_failures > 0 {
                self.format_failures -= 1;
                return Err(FormatError::TooNarrow { required: 1e9, available: width.unwrap_or(0.0) });
            }
            self.svg.format(voices, width)
        }

        fn draw_voice(&mut self, voice: &Voice, stave: &StaveGeometry, offsets: &[f64], beams: &[BeamGroup]) -> RenderResult<usize> {
            if self.fail_voices {
                return Err(RenderError::geometry("broken pen"));
            }
            self.svg.draw_voice(voice, stave, offsets, beams)
        }

        fn draw_beam(&mut self, voice: &Voice, stave: &StaveGeometry, offsets: &[f64], group: &BeamGroup) -> RenderResult<()> {
            self.svg.draw_beam(voice, stave, offsets, group)
        }

        fn finish(&self) -> String {
            self.svg.finish()
        }
    }

    fn quarters(n: usize) -> Vec<NoteEventSpec> {
        (0..n).map(|_| NoteEventSpec::new(&["c/4"], "q")).collect()
    }

    fn single(notes: Vec<NoteEventSpec>) -> Exercise {
        Exercise { notes: Some(notes), ..Exercise::default() }
    }

    #[test]
    fn relaxed_retry_after_a_constrained_failure() {
        let mut backend = Recorder { format_failures: 1, ..Recorder::default() };
        let report = draw_exercise(&mut backend, &single(quarters(4)), &RenderOptions::default(), 0.0, 0.0).unwrap();

        assert_eq!(backend.format_calls.len(), 2);
        assert!(backend.format_calls[0].is_some());
        assert_eq!(backend.format_calls[1], None);
        assert_eq!(report.systems[0].format, FormatStatus::Relaxed);
        assert_eq!(report.notes_drawn(), 4);
    }

    #[test]
    fn failed_system_is_skipped_and_the_rest_continue() {
        // Two systems; the first one's both attempts fail.
        let mut backend = Recorder { format_failures: 2, ..Recorder::default() };
        let report = draw_exercise(&mut backend, &single(quarters(20)), &RenderOptions::default(), 0.0, 0.0).unwrap();

        assert_eq!(report.systems.len(), 2);
        assert_eq!(report.systems[0].format, FormatStatus::Failed);
        assert_eq!(report.systems[0].notes_drawn, 0);
        assert_eq!(report.systems[1].format, FormatStatus::Constrained);
        assert_eq!(report.systems[1].notes_drawn, 4);
        assert_eq!(backend.staves, 2);
    }

    #[test]
    fn backend_errors_propagate() {
        let mut backend = Recorder { fail_voices: true, ..Recorder::default() };
        let err = draw_exercise(&mut backend, &single(quarters(2)), &RenderOptions::default(), 0.0, 0.0).unwrap_err();
        assert_eq!(err, RenderError::Geometry("broken pen".into()));
    }

    #[test]
    fn grand_connectors_and_empty_bass_stave() {
        let exercise = Exercise {
            stave_layout: Some("grand".into()),
            notes_treble: Some(quarters(20)),
            notes_bass: Some(quarters(4)),
            ..Exercise::default()
        };
        let mut backend = Recorder::default();
        let report = draw_exercise(&mut backend, &exercise, &RenderOptions::default(), 800.0, 300.0).unwrap();

        assert_eq!(report.systems.len(), 2);
        assert_eq!(backend.staves, 4);
        assert_eq!(
            backend.connectors,
            vec![
                Connector::Brace,
                Connector::SingleLeft,
                Connector::SingleRight,
                Connector::SingleLeft,
                Connector::SingleRight
            ]
        );
        assert_eq!(report.systems[0].notes_drawn, 20);
        assert_eq!(report.systems[1].notes_drawn, 4);
        // Two grand systems do not fit in 300 units; the canvas grows.
        assert_eq!(report.height, 40.0 + GRAND_SYSTEM_SPACING + GRAND_STAVE_DISTANCE + STAVE_BOX_HEIGHT + BOTTOM_MARGIN);
    }

    #[test]
    fn nothing_drawable_falls_back_to_a_bare_stave() {
        let exercise = single(vec![NoteEventSpec::new(&["x/4"], "q"), NoteEventSpec::new(&["c/4"], "zz")]);
        let mut backend = Recorder::default();
        let report = draw_exercise(&mut backend, &exercise, &RenderOptions::default(), 0.0, 0.0).unwrap();

        assert!(report.empty_staff);
        assert_eq!(report.dropped_notes, 2);
        assert_eq!(backend.staves, 1);
        assert!(backend.format_calls.is_empty());
        assert_eq!((report.width, report.height), (EMPTY_STAFF_DEFAULT_WIDTH, EMPTY_STAFF_DEFAULT_HEIGHT));
    }

    #[test]
    fn undrawable_octaves_count_as_dropped() {
        let exercise = single(vec![NoteEventSpec::new(&["c/11"], "q"), NoteEventSpec::new(&["c/4"], "q")]);
        let mut backend = SvgBackend::new();
        let report = draw_exercise(&mut backend, &exercise, &RenderOptions::default(), 0.0, 0.0).unwrap();
        assert_eq!(report.dropped_notes, 1);
        assert_eq!(report.notes_drawn(), 1);
    }

    #[test]
    fn empty_staff_width_rules() {
        let mut backend = SvgBackend::new();
        let request = EmptyStaffRequest { width: Some(300.0), ..EmptyStaffRequest::default() };
        draw_empty_staff(&mut backend, &request, 800.0, 200.0).unwrap();
        // Right barline of a 300-wide stave.
        assert!(backend.finish().contains(r#"x1="315.0" y1="100.0""#));

        let forced = EmptyStaffRequest { force_full_width: true, ..request };
        draw_empty_staff(&mut backend, &forced, 800.0, 200.0).unwrap();
        assert!(backend.finish().contains(r#"x1="785.0" y1="100.0""#));

        // A tiny surface still gets a stave wide enough for its modifiers.
        let size = draw_empty_staff(&mut backend, &EmptyStaffRequest::default(), 40.0, 0.0).unwrap();
        assert!(size.0 > 40.0);
        assert_eq!(size.1, EMPTY_STAFF_DEFAULT_HEIGHT);
    }
}
