//! tutorscore: score layout and segmentation engine for a children's piano
//! tutor.
//!
//! Exercises arrive as lists of pitch/duration strings; the engine parses
//! them, packs them into systems of a few measures, colors each note by its
//! feedback status, and draws single or grand staves into a named surface.
//!
//! # Example
//! ```
//! use tutorscore::{render_exercise, Document, Exercise, NoteEventSpec, RenderOptions};
//!
//! let mut doc = Document::new();
//! doc.add_surface("staff", 800.0, 200.0);
//!
//! let exercise = Exercise {
//!     notes: Some(vec![NoteEventSpec::new(&["c/4"], "q"), NoteEventSpec::new(&["e/4"], "q")]),
//!     ..Exercise::default()
//! };
//! render_exercise(&mut doc, "staff", &exercise, &RenderOptions::default());
//! assert!(doc.surface("staff").unwrap().svg().is_some());
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod segment;
pub mod surface;
pub mod ticks;

#[cfg(target_os = "android")]
pub mod android;

pub use error::{FormatError, ParseError, RealizeError, RenderError, RenderResult};
pub use model::*;
pub use renderer::{draw_empty_staff, draw_exercise, NotationBackend, RenderReport, SvgBackend};
pub use renderer::beams::BeamGroup;
pub use renderer::beat_map::Formatting;
pub use renderer::layout::{Connector, StaveGeometry, Voice};
pub use surface::{Document, Surface, SurfaceContent};

/// Result of a render call into a document surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Drawn(RenderReport),
    /// Drawing failed; the surface shows this message instead.
    Failed(String),
    /// No surface with the requested id.
    TargetMissing,
}

impl RenderOutcome {
    pub fn report(&self) -> Option<&RenderReport> {
        match self {
            RenderOutcome::Drawn(report) => Some(report),
            _ => None,
        }
    }
}

/// Render an exercise into the surface `target_id`, replacing whatever it
/// showed before.
pub fn render_exercise(
    doc: &mut Document,
    target_id: &str,
    exercise: &Exercise,
    options: &RenderOptions,
) -> RenderOutcome {
    render_exercise_with(&mut SvgBackend::new(), doc, target_id, exercise, options)
}

/// Like [`render_exercise`], drawing through a caller-supplied backend.
pub fn render_exercise_with<B: NotationBackend>(
    backend: &mut B,
    doc: &mut Document,
    target_id: &str,
    exercise: &Exercise,
    options: &RenderOptions,
) -> RenderOutcome {
    render_into(backend, doc, target_id, |backend, w, h| draw_exercise(backend, exercise, options, w, h))
}

/// Draw a bare stave (clef, optional time and key signature) into `target_id`.
pub fn render_empty_staff(doc: &mut Document, target_id: &str, request: &EmptyStaffRequest) -> RenderOutcome {
    render_into(&mut SvgBackend::new(), doc, target_id, |backend, w, h| {
        let (width, height) = draw_empty_staff(backend, request, w, h)?;
        Ok(RenderReport {
            empty_staff: true,
            width,
            height,
            ..RenderReport::default()
        })
    })
}

fn render_into<B, F>(backend: &mut B, doc: &mut Document, target_id: &str, draw: F) -> RenderOutcome
where
    B: NotationBackend,
    F: FnOnce(&mut B, f64, f64) -> RenderResult<RenderReport>,
{
    let Some(surface) = doc.surface_mut(target_id) else {
        tracing::error!("{}", RenderError::TargetMissing(target_id.to_string()));
        return RenderOutcome::TargetMissing;
    };
    surface.clear();

    match draw(&mut *backend, surface.width, surface.height) {
        Ok(report) => {
            surface.set_svg(backend.finish());
            RenderOutcome::Drawn(report)
        }
        Err(e) => {
            tracing::error!(surface = target_id, "rendering failed: {e}");
            let message = format!("Rendering error: {e}");
            surface.show_message(message.clone());
            RenderOutcome::Failed(message)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Standalone and JSON entry points
// ═══════════════════════════════════════════════════════════════════════

/// Render an exercise straight to an SVG string.
///
/// A drawing failure yields a small SVG carrying the error message, so the
/// caller always gets markup it can display.
pub fn render_exercise_to_svg(exercise: &Exercise, options: &RenderOptions, width: f64, height: f64) -> String {
    let mut backend = SvgBackend::new();
    match draw_exercise(&mut backend, exercise, options, width, height) {
        Ok(_) => backend.finish(),
        Err(e) => {
            tracing::error!("rendering failed: {e}");
            renderer::message_svg(&format!("Rendering error: {e}"))
        }
    }
}

pub fn exercise_from_json(json: &str) -> Result<Exercise, ParseError> {
    serde_json::from_str(json).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

pub fn options_from_json(json: &str) -> Result<RenderOptions, ParseError> {
    serde_json::from_str(json).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Parse an exercise (and optional options) from JSON and render it to SVG.
pub fn render_exercise_json(
    exercise_json: &str,
    options_json: Option<&str>,
    width: f64,
    height: f64,
) -> Result<String, ParseError> {
    let exercise = exercise_from_json(exercise_json)?;
    let options = match options_json {
        Some(json) if !json.trim().is_empty() => options_from_json(json)?,
        _ => RenderOptions::default(),
    };
    Ok(render_exercise_to_svg(&exercise, &options, width, height))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI: for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Render an exercise given as JSON and return SVG as a C string.
/// The caller must free the returned string with `tutorscore_free_string`.
///
/// `width` / `height` of 0.0 use the defaults. Returns null when the JSON
/// cannot be read.
///
/// # Safety
/// `exercise_json` must be a valid null-terminated UTF-8 C string.
/// `options_json` may be null.
#[no_mangle]
pub unsafe extern "C" fn tutorscore_render_exercise_json(
    exercise_json: *const c_char,
    options_json: *const c_char,
    width: f64,
    height: f64,
) -> *mut c_char {
    if exercise_json.is_null() {
        return std::ptr::null_mut();
    }
    let exercise = match unsafe { CStr::from_ptr(exercise_json) }.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };
    let options = if options_json.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(options_json) }.to_str().ok()
    };

    match render_exercise_json(exercise, options, width, height) {
        Ok(svg) => CString::new(svg).unwrap_or_default().into_raw(),
        Err(e) => {
            tracing::warn!("{e}");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by tutorscore functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a tutorscore function, or null.
#[no_mangle]
pub unsafe extern "C" fn tutorscore_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffi_round_trip() {
        let json = CString::new(r#"{"notes":[{"keys":["g/4"],"duration":"h"}]}"#).unwrap();
        let ptr = unsafe { tutorscore_render_exercise_json(json.as_ptr(), std::ptr::null(), 0.0, 0.0) };
        assert!(!ptr.is_null());
        let svg = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { tutorscore_free_string(ptr) };
        assert!(svg.contains("<ellipse"));
    }

    #[test]
    fn ffi_rejects_bad_input() {
        let bad = CString::new("{not json").unwrap();
        let ptr = unsafe { tutorscore_render_exercise_json(bad.as_ptr(), std::ptr::null(), 0.0, 0.0) };
        assert!(ptr.is_null());
        let ptr = unsafe { tutorscore_render_exercise_json(std::ptr::null(), std::ptr::null(), 0.0, 0.0) };
        assert!(ptr.is_null());
    }
}
