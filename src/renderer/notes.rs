//! Note, rest, beam, accidental, and ledger line rendering.

use crate::model::*;
use super::beams::BeamGroup;
use super::beat_map::pitch_to_staff_y;
use super::constants::*;
use super::layout::{StaveGeometry, Voice};
use super::realize::RealizedNote;
use super::svg_builder::SvgBuilder;

const ACCIDENTAL_FONT_SIZE: f64 = 16.0;
const ANNOTATION_GAP: f64 = 8.0;
const FLAG_SPACING: f64 = 7.0;

/// Draw every note of a voice at `stave.note_start_x() + offsets[i]`.
///
/// Notes that belong to a beam group get no stem or flag here; the beam
/// pass draws those. Returns the number of notes drawn.
pub(super) fn render_voice(
    svg: &mut SvgBuilder,
    voice: &Voice,
    stave: &StaveGeometry,
    offsets: &[f64],
    beams: &[BeamGroup],
) -> usize {
    let staff_y = stave.staff_top();
    let origin = stave.note_start_x();
    let mut drawn = 0;

    for (i, (note, offset)) in voice.notes.iter().zip(offsets).enumerate() {
        let nx = origin + offset;
        if note.is_rest {
            render_rest(svg, nx, staff_y, note);
        } else {
            let beamed = beams.iter().any(|g| g.notes.contains(&i));
            render_note(svg, nx, staff_y, note, beamed);
        }
        drawn += 1;
    }
    drawn
}

fn key_ys(note: &RealizedNote, staff_y: f64) -> Vec<f64> {
    note.keys
        .iter()
        .map(|k| staff_y + pitch_to_staff_y(k, note.clef))
        .collect()
}

/// Stems go up for notes sitting on or below the middle line.
fn stem_up(ys: &[f64], staff_y: f64) -> bool {
    let avg = ys.iter().sum::<f64>() / ys.len().max(1) as f64;
    avg >= staff_y + 2.0 * STAFF_LINE_SPACING
}

fn stem_extra(flag_count: usize) -> f64 {
    match flag_count {
        2 => 4.0,
        3 => 9.0,
        4 => 13.0,
        _ => 0.0,
    }
}

fn render_note(svg: &mut SvgBuilder, nx: f64, staff_y: f64, note: &RealizedNote, beamed: bool) {
    let ys = key_ys(note, staff_y);
    let style = note.style;
    let (top, bottom) = ys
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| (lo.min(y), hi.max(y)));

    for &y in &ys {
        render_ledger_lines(svg, nx, y, staff_y);
        svg.notehead(nx, y, note.code.is_filled(), style.fill);
        render_dots(svg, nx, y, staff_y, note.dots, style.fill);
    }

    for &(idx, acc) in &note.accidentals {
        if let Some(&y) = ys.get(idx) {
            render_accidental(svg, nx - NOTEHEAD_RX - 3.0, y, acc, style.fill);
        }
    }

    let up = stem_up(&ys, staff_y);
    let mut highest = top;
    if note.code.has_stem() && !beamed {
        let flags = note.code.flag_count();
        let len = STEM_LENGTH + stem_extra(flags);
        let (sx, from, to) = if up {
            (nx + NOTEHEAD_RX - 1.0, bottom, top - len)
        } else {
            (nx - NOTEHEAD_RX + 1.0, top, bottom + len)
        };
        svg.line(sx, from, sx, to, style.stroke, STEM_WIDTH);
        render_flags(svg, sx, to, flags, up, style.stroke);
        highest = highest.min(to);
    } else if note.code.has_stem() && up {
        highest -= STEM_LENGTH;
    }

    render_annotations(svg, nx, highest.min(staff_y), &note.annotations, style.stroke);
}

// ── Annotations ─────────────────────────────────────────────────────

/// Stack annotation lines above `top`, the last line closest to the note.
fn render_annotations(svg: &mut SvgBuilder, x: f64, top: f64, lines: &[String], color: &str) {
    let base = top - ANNOTATION_GAP;
    let n = lines.len();
    for (i, text) in lines.iter().enumerate() {
        let y = base - (n - 1 - i) as f64 * ANNOTATION_LINE_HEIGHT;
        svg.text(x, y, text, ANNOTATION_FONT_SIZE, "bold", color, "middle");
    }
}

// ── Dots ────────────────────────────────────────────────────────────

fn render_dots(svg: &mut SvgBuilder, nx: f64, y: f64, staff_y: f64, dots: u8, color: &str) {
    if dots == 0 {
        return;
    }
    // Dots of a note on a line move up into the space above.
    let steps = ((y - staff_y) / (STAFF_LINE_SPACING / 2.0)).round() as i64;
    let dot_y = if steps.rem_euclid(2) == 0 { y - STAFF_LINE_SPACING / 2.0 } else { y };
    for d in 0..dots {
        let dx = nx + NOTEHEAD_RX + 4.0 + d as f64 * DOT_SPACING;
        svg.circle(dx, dot_y, DOT_RADIUS, color);
    }
}

// ── Rest rendering ──────────────────────────────────────────────────

fn render_rest(svg: &mut SvgBuilder, x: f64, staff_y: f64, note: &RealizedNote) {
    let color = note.style.fill;
    let mid = staff_y + 2.0 * STAFF_LINE_SPACING;

    match note.code {
        DurationCode::Whole => svg.rect(x - 7.0, staff_y + 10.0, 14.0, 5.0, color),
        DurationCode::Half => svg.rect(x - 7.0, staff_y + 15.0, 14.0, 5.0, color),
        DurationCode::Quarter => {
            let d = format!(
                "M{:.1},{:.1} l5,7 l-4,5 l5,7 c-5,-2 -7,2 -3,6",
                x - 2.0, mid - 14.0
            );
            svg.path(&d, "none", color, 2.2);
        }
        code => {
            let flags = code.flag_count();
            let top = mid - 8.0;
            let stem_bottom = top + 12.0 + flags as f64 * 8.0;
            svg.line(x + 4.0, top, x - 1.0, stem_bottom, color, 1.4);
            for k in 0..flags {
                let y = top + 3.0 + k as f64 * 8.0;
                svg.circle(x - 3.0, y, 2.2, color);
                svg.line(x - 3.0, y + 1.0, x + 4.0 - k as f64 * 1.5, y - 1.0, color, 1.0);
            }
        }
    }

    for d in 0..note.dots {
        svg.circle(x + 10.0 + d as f64 * DOT_SPACING, mid - STAFF_LINE_SPACING / 2.0, DOT_RADIUS, color);
    }
}

// ── Accidental rendering ────────────────────────────────────────────

fn accidental_glyph(acc: Accidental) -> &'static str {
    match acc {
        Accidental::Sharp => "\u{266F}",
        Accidental::Flat => "\u{266D}",
        Accidental::DoubleSharp => "\u{1D12A}",
        Accidental::DoubleFlat => "\u{1D12B}",
    }
}

fn render_accidental(svg: &mut SvgBuilder, x: f64, y: f64, acc: Accidental, color: &str) {
    svg.text(x, y + 5.0, accidental_glyph(acc), ACCIDENTAL_FONT_SIZE, "normal", color, "end");
}

// ── Flag rendering ──────────────────────────────────────────────────

fn render_flags(svg: &mut SvgBuilder, stem_x: f64, stem_end_y: f64, count: usize, stem_up: bool, color: &str) {
    for k in 0..count {
        let d = if stem_up {
            let y = stem_end_y + k as f64 * FLAG_SPACING;
            format!("M{:.1},{:.1} c1,2 4,5 7,10 c2,3 2,6 -1,8", stem_x, y)
        } else {
            let y = stem_end_y - k as f64 * FLAG_SPACING;
            format!("M{:.1},{:.1} c1,-2 4,-5 7,-10 c2,-3 2,-6 -1,-8", stem_x, y)
        };
        svg.path(&d, "none", color, 1.4);
    }
}

// ── Ledger lines ────────────────────────────────────────────────────

fn render_ledger_lines(svg: &mut SvgBuilder, x: f64, note_y: f64, staff_y: f64) {
    let top = staff_y;
    let bottom = staff_y + STAFF_HEIGHT;

    if note_y < top {
        let mut y = top - STAFF_LINE_SPACING;
        while y >= note_y - 1.0 {
            svg.line(
                x - NOTEHEAD_RX - LEDGER_LINE_EXTEND,
                y,
                x + NOTEHEAD_RX + LEDGER_LINE_EXTEND,
                y,
                STAFF_COLOR, LEDGER_LINE_WIDTH,
            );
            y -= STAFF_LINE_SPACING;
        }
    }

    if note_y > bottom {
        let mut y = bottom + STAFF_LINE_SPACING;
        while y <= note_y + 1.0 {
            svg.line(
                x - NOTEHEAD_RX - LEDGER_LINE_EXTEND,
                y,
                x + NOTEHEAD_RX + LEDGER_LINE_EXTEND,
                y,
                STAFF_COLOR, LEDGER_LINE_WIDTH,
            );
            y += STAFF_LINE_SPACING;
        }
    }
}

// ── Beam rendering ──────────────────────────────────────────────────

/// Stems and beams of one group. All stems of a group point the same way.
pub(super) fn render_beam(
    svg: &mut SvgBuilder,
    voice: &Voice,
    stave: &StaveGeometry,
    offsets: &[f64],
    group: &BeamGroup,
) {
    let staff_y = stave.staff_top();
    let origin = stave.note_start_x();

    struct BeamNote<'a> { note: &'a RealizedNote, near_y: f64, far_y: f64, stem_x: f64, x: f64 }
    let mut notes: Vec<BeamNote> = Vec::with_capacity(group.notes.len());
    let mut all_ys = Vec::new();

    for &idx in &group.notes {
        let (Some(note), Some(offset)) = (voice.notes.get(idx), offsets.get(idx)) else {
            continue;
        };
        let ys = key_ys(note, staff_y);
        let top = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let bottom = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        all_ys.extend_from_slice(&ys);
        notes.push(BeamNote { note, near_y: top, far_y: bottom, stem_x: 0.0, x: origin + offset });
    }
    if notes.len() < 2 {
        return;
    }

    let up = stem_up(&all_ys, staff_y);
    for n in &mut notes {
        if up {
            n.stem_x = n.x + NOTEHEAD_RX - 1.0;
        } else {
            n.stem_x = n.x - NOTEHEAD_RX + 1.0;
            std::mem::swap(&mut n.near_y, &mut n.far_y);
        }
    }

    let (first, last) = (&notes[0], &notes[notes.len() - 1]);
    let stem_end = |n: &BeamNote| if up { n.near_y - STEM_LENGTH } else { n.near_y + STEM_LENGTH };
    let first_end = stem_end(first);
    let last_end = stem_end(last);
    let first_x = first.stem_x;
    let last_x = last.stem_x;
    let beam_dx = last_x - first_x;

    let slope = if beam_dx.abs() > 0.1 {
        ((last_end - first_end) / beam_dx).clamp(-0.5, 0.5)
    } else {
        0.0
    };
    let beam_y = |sx: f64| first_end + slope * (sx - first_x);

    let mut beam_shift = 0.0_f64;
    for n in &notes {
        let by = beam_y(n.stem_x) + beam_shift;
        let stem_len = (n.near_y - by).abs();
        let wrong_side = if up { by > n.near_y } else { by < n.near_y };
        if stem_len < MIN_BEAMED_STEM || wrong_side {
            let needed = if wrong_side { stem_len + MIN_BEAMED_STEM } else { MIN_BEAMED_STEM - stem_len };
            if up { beam_shift -= needed; } else { beam_shift += needed; }
        }
    }
    let beam_y_adj = |sx: f64| beam_y(sx) + beam_shift;

    for n in &notes {
        svg.line(n.stem_x, n.far_y, n.stem_x, beam_y_adj(n.stem_x), n.note.style.stroke, STEM_WIDTH);
    }

    let color = first.note.style.stroke;
    svg.beam_line(first_x, beam_y_adj(first_x), last_x, beam_y_adj(last_x), BEAM_THICKNESS, color);

    // Secondary beams over runs of sixteenths and shorter.
    let offset = if up { BEAM_THICKNESS + BEAM_SPACING } else { -(BEAM_THICKNESS + BEAM_SPACING) };
    let mut i = 0;
    while i < notes.len() {
        if notes[i].note.code.flag_count() < 2 {
            i += 1;
            continue;
        }
        let start = i;
        while i + 1 < notes.len() && notes[i + 1].note.code.flag_count() >= 2 {
            i += 1;
        }
        let (x1, x2) = if start == i {
            // Lone short note: a stub pointing into the group.
            let sx = notes[start].stem_x;
            if start + 1 < notes.len() { (sx, sx + 8.0) } else { (sx - 8.0, sx) }
        } else {
            (notes[start].stem_x, notes[i].stem_x)
        };
        svg.beam_line(x1, beam_y_adj(x1) + offset, x2, beam_y_adj(x2) + offset, BEAM_THICKNESS, color);
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_note_event;
    use crate::renderer::beams::generate_beams;
    use crate::renderer::layout::StaveSlot;
    use crate::renderer::realize::realize;

    fn stave() -> StaveGeometry {
        StaveGeometry {
            x: STAVE_START_X,
            y: 20.0,
            width: 500.0,
            clef: Clef::Treble,
            key_signature: None,
            time_signature: None,
        }
    }

    fn voice(specs: &[NoteEventSpec], show: bool) -> Voice {
        let notes = specs
            .iter()
            .map(|s| realize(&parse_note_event(s).unwrap(), Clef::Treble, show).unwrap())
            .collect();
        Voice::new(StaveSlot::Upper, notes)
    }

    fn offsets(n: usize) -> Vec<f64> {
        (0..n).map(|i| 20.0 + i as f64 * 40.0).collect()
    }

    #[test]
    fn notehead_and_stem_use_status_colors() {
        let v = voice(&[NoteEventSpec::new(&["c/4"], "q").with_status("correct")], false);
        let mut svg = SvgBuilder::new(600.0, 200.0);
        assert_eq!(render_voice(&mut svg, &v, &stave(), &offsets(1), &[]), 1);
        let out = svg.build();
        assert!(out.contains(r##"<ellipse cx="77.0" cy="110.0" rx="5.5" ry="4.0" fill="#28a745""##));
        assert!(out.contains(r##"stroke="#1c7430""##));
        // Middle C has a single ledger line below the staff.
        assert!(out.contains(r#"y1="110.0" x2="88.5" y2="110.0""#));
    }

    #[test]
    fn accidental_and_annotation_are_drawn() {
        let v = voice(&[NoteEventSpec::new(&["f#/4"], "h")], true);
        let mut svg = SvgBuilder::new(600.0, 200.0);
        render_voice(&mut svg, &v, &stave(), &offsets(1), &[]);
        let out = svg.build();
        assert!(out.contains("\u{266F}</text>"));
        assert!(out.contains(">Fa</text>"));
    }

    #[test]
    fn beamed_eighths_get_one_shared_beam_and_no_flags() {
        let v = voice(
            &[NoteEventSpec::new(&["e/4"], "8"), NoteEventSpec::new(&["g/4"], "8")],
            false,
        );
        let groups = generate_beams(&v);
        assert_eq!(groups.len(), 1);

        let mut svg = SvgBuilder::new(600.0, 200.0);
        render_voice(&mut svg, &v, &stave(), &offsets(2), &groups);
        let notes_only = svg.build();
        assert!(!notes_only.contains("<line"));

        render_beam(&mut svg, &v, &stave(), &offsets(2), &groups[0]);
        let out = svg.build();
        assert_eq!(out.matches("<line").count(), 2);
        assert_eq!(out.matches(" Z\"").count(), 1);
    }

    #[test]
    fn rests_draw_without_noteheads() {
        let v = voice(&[NoteEventSpec::new(&["r/4"], "hr"), NoteEventSpec::new(&["r/4"], "8r")], true);
        let mut svg = SvgBuilder::new(600.0, 200.0);
        assert_eq!(render_voice(&mut svg, &v, &stave(), &offsets(2), &[]), 2);
        let out = svg.build();
        assert!(!out.contains("<ellipse"));
        assert!(!out.contains("<text"));
        assert_eq!(out.matches("<rect").count(), 1);
    }
}
