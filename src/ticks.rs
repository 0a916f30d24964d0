//! Duration arithmetic in ticks.
//!
//! A whole note spans `RESOLUTION` ticks. Everything the segmenter and the
//! formatter compare is an integer tick count derived from these functions.

use crate::model::DurationCode;
use crate::parser::parse_time_signature;

/// Ticks per whole note.
pub const RESOLUTION: u32 = 16384;

/// Ticks per quarter note, the beat unit voices are declared in.
pub const BEAT_TICKS: u32 = RESOLUTION / 4;

/// Tick length of a duration code with `dots` augmentation dots.
///
/// Each dot adds half of the previous increment: one dot is ×1.5, two ×1.75.
pub fn ticks(code: DurationCode, dots: u8) -> u32 {
    let base = match code {
        DurationCode::Whole => 4 * BEAT_TICKS,
        DurationCode::Half => 2 * BEAT_TICKS,
        DurationCode::Quarter => BEAT_TICKS,
        DurationCode::Eighth => BEAT_TICKS / 2,
        DurationCode::Sixteenth => BEAT_TICKS / 4,
        DurationCode::ThirtySecond => BEAT_TICKS / 8,
        DurationCode::SixtyFourth => BEAT_TICKS / 16,
    };

    let mut total = base;
    let mut increment = base;
    for _ in 0..dots {
        increment /= 2;
        total += increment;
    }
    total
}

/// Ticks in one measure of `time_signature` (`"beats/beatValue"`).
///
/// A missing or malformed signature counts as one whole note per measure.
pub fn ticks_per_measure(time_signature: Option<&str>) -> u32 {
    let Some(sig) = time_signature else {
        return RESOLUTION;
    };
    match parse_time_signature(sig) {
        Ok(ts) => (RESOLUTION / ts.beat_value).saturating_mul(ts.beats),
        Err(e) => {
            tracing::warn!("{e}; falling back to {RESOLUTION} ticks per measure");
            RESOLUTION
        }
    }
}

/// Whole quarter-note beats needed to hold `ticks`, rounded up.
pub fn beats_for_ticks(ticks: u32) -> u32 {
    ticks.div_ceil(BEAT_TICKS)
}
