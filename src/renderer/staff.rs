//! Staff, clef, key/time signature and connector rendering.

use crate::model::{Clef, KeySignature, TimeSignature};
use super::constants::*;
use super::layout::{key_sig_width, Connector, StaveGeometry};
use super::svg_builder::SvgBuilder;

const CLEF_INSET: f64 = 4.0;
const KEY_SIG_GLYPH_SIZE: f64 = 20.0;
const TIME_SIG_FONT_SIZE: f64 = 22.0;

// ═══════════════════════════════════════════════════════════════════════
// Stave rendering
// ═══════════════════════════════════════════════════════════════════════

/// Staff lines, end barlines and whatever modifiers the stave carries.
pub(super) fn render_stave(svg: &mut SvgBuilder, stave: &StaveGeometry) {
    let staff_y = stave.staff_top();
    let right = stave.x + stave.width;
    render_staff_lines(svg, stave.x, right, staff_y);
    svg.line(stave.x, staff_y, stave.x, staff_y + STAFF_HEIGHT, BARLINE_COLOR, BARLINE_WIDTH);
    svg.line(right, staff_y, right, staff_y + STAFF_HEIGHT, BARLINE_COLOR, BARLINE_WIDTH);

    let mut x = stave.x + CLEF_INSET;
    render_clef(svg, x, staff_y, stave.clef);
    x += CLEF_SPACE;

    if let Some(key) = &stave.key_signature {
        render_key_signature(svg, x, staff_y, key, stave.clef);
        x += key_sig_width(Some(key));
    }
    if let Some(time) = &stave.time_signature {
        render_time_signature(svg, x, staff_y, time);
    }
}

pub(super) fn render_staff_lines(svg: &mut SvgBuilder, x1: f64, x2: f64, staff_y: f64) {
    for i in 0..5 {
        let y = staff_y + i as f64 * STAFF_LINE_SPACING;
        svg.line(x1, y, x2, y, STAFF_COLOR, STAFF_LINE_WIDTH);
    }
}

pub(super) fn render_brace(svg: &mut SvgBuilder, x: f64, top_y: f64, bottom_y: f64) {
    let mid_y = (top_y + bottom_y) / 2.0;
    let h = bottom_y - top_y;
    let w = BRACE_WIDTH;

    let path = format!(
        "M{:.1},{:.1} C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} \
         C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
        x, top_y,
        x, top_y + h * 0.28,
        x - w, mid_y - h * 0.08,
        x - w, mid_y,
        x - w, mid_y + h * 0.08,
        x, bottom_y - h * 0.28,
        x, bottom_y,
    );
    svg.path(&path, "none", GLYPH_COLOR, 2.5);
}

/// Join the two staves of a grand system.
pub(super) fn render_connector(svg: &mut SvgBuilder, connector: Connector, upper: &StaveGeometry, lower: &StaveGeometry) {
    let top = upper.staff_top();
    let bottom = lower.staff_bottom();
    match connector {
        Connector::Brace => render_brace(svg, upper.x - 4.0, top, bottom),
        Connector::SingleLeft => {
            svg.line(upper.x, top, upper.x, bottom, BARLINE_COLOR, BARLINE_WIDTH);
        }
        Connector::SingleRight => {
            let x = upper.x + upper.width;
            svg.line(x, top, x, bottom, BARLINE_COLOR, BARLINE_WIDTH);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Clef rendering
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn render_clef(svg: &mut SvgBuilder, x: f64, staff_y: f64, clef: Clef) {
    match clef {
        Clef::Treble => svg.treble_clef(x + 10.0, staff_y + 30.0),
        Clef::Bass => svg.bass_clef(x + 10.0, staff_y + 10.0),
        Clef::Alto => svg.alto_clef(x + 10.0, staff_y + 2.0 * STAFF_LINE_SPACING),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Key signature rendering
// ═══════════════════════════════════════════════════════════════════════

/// Vertical offsets from the top line for the sharps of a key, in order.
fn sharp_positions(clef: Clef) -> [f64; 7] {
    match clef {
        Clef::Treble => [0.0, 15.0, -5.0, 10.0, 25.0, 5.0, 20.0],
        Clef::Bass => [10.0, 25.0, 5.0, 20.0, 35.0, 15.0, 30.0],
        Clef::Alto => [5.0, 20.0, 0.0, 15.0, 30.0, 10.0, 25.0],
    }
}

fn flat_positions(clef: Clef) -> [f64; 7] {
    match clef {
        Clef::Treble => [20.0, 5.0, 25.0, 10.0, 30.0, 15.0, 35.0],
        Clef::Bass => [30.0, 15.0, 35.0, 20.0, 40.0, 25.0, 45.0],
        Clef::Alto => [25.0, 10.0, 30.0, 15.0, 35.0, 20.0, 40.0],
    }
}

pub(super) fn render_key_signature(svg: &mut SvgBuilder, x: f64, staff_y: f64, key: &KeySignature, clef: Clef) {
    if key.fifths > 0 {
        let positions = sharp_positions(clef);
        for (i, offset) in positions.iter().take(key.fifths.min(7) as usize).enumerate() {
            let sx = x + i as f64 * KEY_SIG_SHARP_SPACE;
            svg.text(sx, staff_y + offset + 6.0, "\u{266F}", KEY_SIG_GLYPH_SIZE, "normal", GLYPH_COLOR, "start");
        }
    } else if key.fifths < 0 {
        let positions = flat_positions(clef);
        for (i, offset) in positions.iter().take(key.fifths.unsigned_abs().min(7) as usize).enumerate() {
            let sx = x + i as f64 * KEY_SIG_FLAT_SPACE;
            svg.text(sx, staff_y + offset + 4.0, "\u{266D}", KEY_SIG_GLYPH_SIZE, "normal", GLYPH_COLOR, "start");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Time signature rendering
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn render_time_signature(svg: &mut SvgBuilder, x: f64, staff_y: f64, time: &TimeSignature) {
    let cx = x + TIME_SIG_SPACE / 2.0;
    let top_y = staff_y + 2.0 * STAFF_LINE_SPACING - 2.0;
    let bot_y = staff_y + 4.0 * STAFF_LINE_SPACING - 2.0;
    svg.text(cx, top_y, &time.beats.to_string(), TIME_SIG_FONT_SIZE, "bold", GLYPH_COLOR, "middle");
    svg.text(cx, bot_y, &time.beat_value.to_string(), TIME_SIG_FONT_SIZE, "bold", GLYPH_COLOR, "middle");
}
