//! Wire-string parsing: turns the string codes of an exercise into typed
//! values once, at the boundary.
//!
//! Accepted forms:
//! - keys: `"c/4"`, `"F#/5"`, `"bb/3"` (B flat), `"ebb/4"`, rests `"r"` / `"r/4"`
//! - durations: `w h q 8 16 32 64` (or `1 2 4`), dots as `.` repeated or a
//!   trailing `d`, rests as a trailing `r`
//! - time signatures: `"3/4"`, `"C"` (4/4), `"C|"` (2/2)
//! - key signatures: major (`"Bb"`) and minor (`"F#m"`) names

use crate::error::ParseError;
use crate::model::*;
use crate::ticks::RESOLUTION;

/// Most dots a duration may carry.
const MAX_DOTS: u8 = 3;

/// Parse a complete wire note. Any failure means the whole event is dropped.
pub fn parse_note_event(spec: &NoteEventSpec) -> Result<NoteEvent, ParseError> {
    let first = spec.keys.first().ok_or(ParseError::MissingKeys)?;
    let (duration, rest_suffix) = parse_duration(&spec.duration)?;

    let is_rest = rest_suffix || spec.kind.as_deref() == Some("r") || is_rest_key(first);

    let kind = if is_rest {
        NoteKind::Rest
    } else {
        let pitches = spec
            .keys
            .iter()
            .map(|k| parse_pitch(k))
            .collect::<Result<Vec<_>, _>>()?;
        NoteKind::Chord(pitches)
    };

    let annotation = spec
        .annotation
        .as_ref()
        .filter(|t| !t.trim().is_empty())
        .map(|text| Annotation {
            text: text.clone(),
            replaces_name: spec.annotation_replaces_name,
        });

    Ok(NoteEvent {
        kind,
        duration,
        status: parse_status(spec.status.as_deref()),
        annotation,
    })
}

fn is_rest_key(key: &str) -> bool {
    let k = key.trim().to_ascii_lowercase();
    k == "r" || k.starts_with("r/")
}

/// Parse `"<letter>[accidental]/<octave>"`.
pub fn parse_pitch(key: &str) -> Result<PitchSpec, ParseError> {
    let invalid = || ParseError::InvalidKey(key.to_string());

    let (name, octave) = key.trim().split_once('/').ok_or_else(invalid)?;
    let mut chars = name.chars();
    let letter = chars.next().and_then(Letter::from_char).ok_or_else(invalid)?;

    // Whatever follows the letter is the accidental: "bb" is B flat, "bbb" B double flat.
    let accidental = match chars.as_str() {
        "" => None,
        "#" => Some(Accidental::Sharp),
        "##" => Some(Accidental::DoubleSharp),
        "b" => Some(Accidental::Flat),
        "bb" => Some(Accidental::DoubleFlat),
        _ => return Err(invalid()),
    };

    let octave = octave.trim().parse::<i32>().map_err(|_| invalid())?;

    Ok(PitchSpec { letter, accidental, octave })
}

/// Parse a duration code. The flag is set when the code carries a rest suffix.
pub fn parse_duration(code: &str) -> Result<(Duration, bool), ParseError> {
    let invalid = || ParseError::InvalidDuration(code.to_string());

    let mut s = code.trim();
    let mut rest = false;
    if let Some(stripped) = s.strip_suffix('r') {
        s = stripped;
        rest = true;
    }

    let mut dots: u8 = 0;
    while let Some(stripped) = s.strip_suffix('.') {
        if dots == MAX_DOTS {
            return Err(invalid());
        }
        s = stripped;
        dots += 1;
    }
    if dots == 0 {
        if let Some(stripped) = s.strip_suffix('d') {
            s = stripped;
            dots = 1;
        }
    }
    if !rest {
        if let Some(stripped) = s.strip_suffix('r') {
            s = stripped;
            rest = true;
        }
    }

    let code = match s {
        "w" | "1" => DurationCode::Whole,
        "h" | "2" => DurationCode::Half,
        "q" | "4" => DurationCode::Quarter,
        "8" => DurationCode::Eighth,
        "16" => DurationCode::Sixteenth,
        "32" => DurationCode::ThirtySecond,
        "64" => DurationCode::SixtyFourth,
        _ => return Err(invalid()),
    };

    Ok((Duration::dotted(code, dots), rest))
}

/// Unknown or absent statuses draw in the default colors.
pub fn parse_status(status: Option<&str>) -> Status {
    match status.map(str::trim) {
        Some("highlight") => Status::Highlight,
        Some("correct") => Status::Correct,
        Some("incorrect") => Status::Incorrect,
        Some("expected") => Status::Expected,
        _ => Status::Default,
    }
}

pub fn parse_time_signature(sig: &str) -> Result<TimeSignature, ParseError> {
    let invalid = || ParseError::InvalidTimeSignature(sig.to_string());

    match sig.trim() {
        "C" => return Ok(TimeSignature { beats: 4, beat_value: 4 }),
        "C|" => return Ok(TimeSignature { beats: 2, beat_value: 2 }),
        _ => {}
    }

    let (beats, beat_value) = sig.trim().split_once('/').ok_or_else(invalid)?;
    let beats = beats.trim().parse::<u32>().map_err(|_| invalid())?;
    let beat_value = beat_value.trim().parse::<u32>().map_err(|_| invalid())?;
    if beats == 0 || beat_value == 0 || beat_value > RESOLUTION {
        return Err(invalid());
    }
    // The measure must fit in a tick count.
    (RESOLUTION / beat_value).checked_mul(beats).ok_or_else(invalid)?;

    Ok(TimeSignature { beats, beat_value })
}

pub fn parse_key_signature(name: &str) -> Result<KeySignature, ParseError> {
    let fifths = match name.trim() {
        "C" | "Am" => 0,
        "G" | "Em" => 1,
        "D" | "Bm" => 2,
        "A" | "F#m" => 3,
        "E" | "C#m" => 4,
        "B" | "G#m" => 5,
        "F#" | "D#m" => 6,
        "C#" | "A#m" => 7,
        "F" | "Dm" => -1,
        "Bb" | "Gm" => -2,
        "Eb" | "Cm" => -3,
        "Ab" | "Fm" => -4,
        "Db" | "Bbm" => -5,
        "Gb" | "Ebm" => -6,
        "Cb" | "Abm" => -7,
        _ => return Err(ParseError::UnknownKeySignature(name.to_string())),
    };
    Ok(KeySignature { name: name.trim().to_string(), fifths })
}

pub fn parse_clef(name: &str) -> Result<Clef, ParseError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "treble" | "g" => Ok(Clef::Treble),
        "bass" | "f" => Ok(Clef::Bass),
        "alto" | "c" => Ok(Clef::Alto),
        _ => Err(ParseError::UnknownClef(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pitch_with_accidentals() {
        let p = parse_pitch("f#/4").unwrap();
        assert_eq!(p.letter, Letter::F);
        assert_eq!(p.accidental, Some(Accidental::Sharp));
        assert_eq!(p.octave, 4);

        assert_eq!(parse_pitch("C/5").unwrap().accidental, None);
        assert_eq!(parse_pitch("ebb/4").unwrap().accidental, Some(Accidental::DoubleFlat));
        assert_eq!(parse_pitch("g##/3").unwrap().accidental, Some(Accidental::DoubleSharp));
    }

    #[test]
    fn lone_b_is_the_letter_not_a_flat() {
        let b = parse_pitch("b/4").unwrap();
        assert_eq!((b.letter, b.accidental), (Letter::B, None));

        let b_flat = parse_pitch("bb/4").unwrap();
        assert_eq!((b_flat.letter, b_flat.accidental), (Letter::B, Some(Accidental::Flat)));

        let b_double_flat = parse_pitch("bbb/4").unwrap();
        assert_eq!(b_double_flat.accidental, Some(Accidental::DoubleFlat));
    }

    #[test]
    fn malformed_pitches_are_rejected() {
        for key in ["h/4", "c4", "c#x/4", "c/x", "/4", ""] {
            assert!(parse_pitch(key).is_err(), "{key} should not parse");
        }
    }

    #[test]
    fn duration_forms() {
        let (d, rest) = parse_duration("q").unwrap();
        assert_eq!(d, Duration::plain(DurationCode::Quarter));
        assert!(!rest);

        assert_eq!(parse_duration("h..").unwrap().0, Duration::dotted(DurationCode::Half, 2));
        assert_eq!(parse_duration("qd").unwrap().0, Duration::dotted(DurationCode::Quarter, 1));
        assert_eq!(parse_duration("1").unwrap().0.code, DurationCode::Whole);

        let (d, rest) = parse_duration("8r").unwrap();
        assert_eq!(d.code, DurationCode::Eighth);
        assert!(rest);

        let (d, rest) = parse_duration("qdr").unwrap();
        assert_eq!(d, Duration::dotted(DurationCode::Quarter, 1));
        assert!(rest);
    }

    #[test]
    fn unparseable_durations() {
        for code in ["", "x", "3", "q....", "dq", "128"] {
            assert!(parse_duration(code).is_err(), "{code} should not parse");
        }
    }

    #[test]
    fn long_dot_runs_are_rejected_not_counted() {
        let code = format!("q{}", ".".repeat(300));
        assert_eq!(parse_duration(&code), Err(ParseError::InvalidDuration(code.clone())));

        let spec = NoteEventSpec::new(&["c/4"], &code);
        assert!(parse_note_event(&spec).is_err());
    }

    #[test]
    fn oversized_time_signatures_are_rejected() {
        assert!(parse_time_signature("2000000/4").is_err());
        assert!(parse_time_signature("4/32768").is_err());
        assert_eq!(
            parse_time_signature("7/8"),
            Ok(TimeSignature { beats: 7, beat_value: 8 })
        );
    }

    #[test]
    fn rest_markers() {
        let by_key = parse_note_event(&NoteEventSpec::new(&["r/4"], "q")).unwrap();
        assert!(by_key.is_rest());

        let mut by_type = NoteEventSpec::new(&["b/4"], "h");
        by_type.kind = Some("r".into());
        assert!(parse_note_event(&by_type).unwrap().is_rest());

        let by_suffix = parse_note_event(&NoteEventSpec::new(&["b/4"], "qr")).unwrap();
        assert!(by_suffix.is_rest());
    }

    #[test]
    fn chord_keeps_every_pitch_in_order() {
        let ev = parse_note_event(&NoteEventSpec::new(&["c/4", "e/4", "g/4"], "w")).unwrap();
        match ev.kind {
            NoteKind::Chord(p) => {
                let letters: Vec<_> = p.iter().map(|p| p.letter).collect();
                assert_eq!(letters, vec![Letter::C, Letter::E, Letter::G]);
            }
            NoteKind::Rest => panic!("expected a chord"),
        }
    }

    #[test]
    fn one_bad_key_invalidates_the_chord() {
        let spec = NoteEventSpec::new(&["c/4", "q/4"], "q");
        assert_eq!(
            parse_note_event(&spec),
            Err(ParseError::InvalidKey("q/4".into()))
        );
        assert_eq!(
            parse_note_event(&NoteEventSpec::new(&[], "q")),
            Err(ParseError::MissingKeys)
        );
    }

    #[test]
    fn statuses_default_when_unknown() {
        assert_eq!(parse_status(Some("correct")), Status::Correct);
        assert_eq!(parse_status(Some("blinking")), Status::Default);
        assert_eq!(parse_status(None), Status::Default);
    }

    #[test]
    fn blank_annotations_are_ignored() {
        let mut spec = NoteEventSpec::new(&["c/4"], "q");
        spec.annotation = Some("  ".into());
        assert_eq!(parse_note_event(&spec).unwrap().annotation, None);

        spec.annotation = Some("1".into());
        spec.annotation_replaces_name = true;
        let ann = parse_note_event(&spec).unwrap().annotation.unwrap();
        assert_eq!(ann.text, "1");
        assert!(ann.replaces_name);
    }

    #[test]
    fn time_and_key_signatures() {
        assert_eq!(
            parse_time_signature("3/4").unwrap(),
            TimeSignature { beats: 3, beat_value: 4 }
        );
        assert_eq!(parse_time_signature("C").unwrap().beats, 4);
        assert!(parse_time_signature("4/0").is_err());
        assert!(parse_time_signature("four/4").is_err());

        assert_eq!(parse_key_signature("Bb").unwrap().fifths, -2);
        assert_eq!(parse_key_signature("F#m").unwrap().fifths, 3);
        assert!(parse_key_signature("H").is_err());
    }

    #[test]
    fn clef_names() {
        assert_eq!(parse_clef("Bass").unwrap(), Clef::Bass);
        assert!(parse_clef("tenor").is_err());
    }
}
