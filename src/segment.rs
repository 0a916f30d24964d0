//! Line segmentation: greedy packing of an ordered note sequence into
//! per-system lines bounded by a tick budget.

use crate::model::NoteEvent;

/// A contiguous run of input events assigned to one rendered system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line<'a> {
    pub events: Vec<&'a NoteEvent>,
    pub ticks: u32,
}

impl<'a> Line<'a> {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn push(&mut self, event: &'a NoteEvent, ticks: u32) {
        self.events.push(event);
        self.ticks += ticks;
    }
}

/// Split `events` into lines of at most `ticks_per_measure * measures_per_line`
/// ticks, preserving order.
///
/// An event longer than a whole line is placed on a line of its own; the
/// lines around it are unaffected.
pub fn segment(events: &[NoteEvent], ticks_per_measure: u32, measures_per_line: u32) -> Vec<Line<'_>> {
    let ticks_per_line = ticks_per_measure.saturating_mul(measures_per_line);
    let mut lines = Vec::new();
    let mut current = Line::default();

    for event in events {
        let t = event.ticks();

        if !current.is_empty() && current.ticks.saturating_add(t) > ticks_per_line {
            lines.push(std::mem::take(&mut current));
        }

        current.push(event, t);

        if t > ticks_per_line {
            // Only reachable with `current` holding just this event.
            tracing::warn!(
                ticks = t,
                ticks_per_line,
                "note longer than a line; placing it on its own line"
            );
            lines.push(std::mem::take(&mut current));
        } else if current.ticks == ticks_per_line {
            lines.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
