//! Shared constants for the score renderer (all in SVG user units).

// ── Surface defaults ────────────────────────────────────────────────
pub(super) const DEFAULT_STAVE_WIDTH: f64 = 760.0; // used when the target reports no width
pub(super) const DEFAULT_SURFACE_HEIGHT: f64 = 300.0;
pub(super) const EMPTY_STAFF_DEFAULT_WIDTH: f64 = 700.0;
pub(super) const EMPTY_STAFF_DEFAULT_HEIGHT: f64 = 150.0;
pub(super) const EMPTY_STAFF_MIN_Y: f64 = 10.0;
pub(super) const EMPTY_STAFF_BOX_HEIGHT: f64 = 80.0;
pub(super) const BOTTOM_MARGIN: f64 = 20.0;

// ── System placement ────────────────────────────────────────────────
pub(super) const MEASURES_PER_LINE: u32 = 4;
pub(super) const STAVE_START_X: f64 = 15.0; // side margin, left and right
pub(super) const STAVE_START_Y_SINGLE: f64 = 20.0;
pub(super) const STAVE_START_Y_GRAND: f64 = 40.0;
pub(super) const SINGLE_STAVE_SYSTEM_SPACING: f64 = 150.0;
pub(super) const GRAND_SYSTEM_SPACING: f64 = 280.0;
pub(super) const GRAND_STAVE_DISTANCE: f64 = 100.0; // treble top to bass top within a system

// ── Staff dimensions ────────────────────────────────────────────────
pub(super) const STAFF_TOP_PADDING: f64 = 40.0; // stave box top to first staff line
pub(super) const STAFF_LINE_SPACING: f64 = 10.0;
pub(super) const STAFF_HEIGHT: f64 = 40.0; // 5 lines, 4 spaces
pub(super) const STAVE_BOX_HEIGHT: f64 = STAFF_TOP_PADDING + STAFF_HEIGHT + 40.0;
pub(super) const BRACE_WIDTH: f64 = 10.0;

// ── Stave modifiers ─────────────────────────────────────────────────
pub(super) const CLEF_SPACE: f64 = 32.0;
pub(super) const KEY_SIG_SHARP_SPACE: f64 = 10.0;
pub(super) const KEY_SIG_FLAT_SPACE: f64 = 8.0;
pub(super) const TIME_SIG_SPACE: f64 = 24.0;
pub(super) const NOTE_AREA_PADDING: f64 = 10.0;

// ── Note dimensions ─────────────────────────────────────────────────
pub(super) const NOTEHEAD_RX: f64 = 5.5;
pub(super) const NOTEHEAD_RY: f64 = 4.0;
pub(super) const STEM_LENGTH: f64 = 30.0;
pub(super) const STEM_WIDTH: f64 = 1.2;
pub(super) const MIN_BEAMED_STEM: f64 = 18.0;
pub(super) const BEAM_THICKNESS: f64 = 4.0;
pub(super) const BEAM_SPACING: f64 = 3.0;
pub(super) const BARLINE_WIDTH: f64 = 1.0;
pub(super) const STAFF_LINE_WIDTH: f64 = 0.8;
pub(super) const LEDGER_LINE_WIDTH: f64 = 0.8;
pub(super) const LEDGER_LINE_EXTEND: f64 = 5.0;
pub(super) const DOT_RADIUS: f64 = 1.8;
pub(super) const DOT_SPACING: f64 = 5.0;

// ── Formatting widths ───────────────────────────────────────────────
pub(super) const MIN_NOTE_WIDTH: f64 = 2.0 * NOTEHEAD_RX + 8.0;
pub(super) const ACCIDENTAL_WIDTH: f64 = 12.0;
pub(super) const FLAG_WIDTH: f64 = 8.0;
pub(super) const ANNOTATION_FONT_SIZE: f64 = 10.0;
pub(super) const ANNOTATION_CHAR_WIDTH: f64 = 6.5;
pub(super) const ANNOTATION_LINE_HEIGHT: f64 = 12.0;

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const STAFF_COLOR: &str = "#555555";
pub(super) const BARLINE_COLOR: &str = "#333333";
pub(super) const GLYPH_COLOR: &str = "#1a1a1a";
