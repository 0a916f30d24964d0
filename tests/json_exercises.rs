//! Exercises in their JSON wire form, as the UI layer sends them.

use pretty_assertions::assert_eq;
use tutorscore::{exercise_from_json, render_exercise_json, ParseError};

const GRAND_EXERCISE: &str = r#"{
    "staveLayout": "grand",
    "timeSignature": "3/4",
    "keySignature": "G",
    "notesTreble": [
        { "keys": ["g/4"], "duration": "h", "status": "correct" },
        { "keys": ["b/4"], "duration": "q", "annotation": "1", "annotationReplacesName": true },
        { "keys": ["d/5"], "duration": "8" },
        { "keys": ["c/5"], "duration": "8" },
        { "keys": ["r/4"], "duration": "q", "type": "r" }
    ],
    "notesBass": [
        { "keys": ["g/2", "d/3"], "duration": "h." }
    ]
}"#;

fn texts(svg: &str) -> Vec<String> {
    let tree = roxmltree::Document::parse(svg).expect("SVG should be well formed");
    tree.descendants()
        .filter(|n| n.has_tag_name("text"))
        .filter_map(|n| n.text().map(str::to_string))
        .collect()
}

#[test]
fn wire_shape_deserializes() {
    let exercise = exercise_from_json(GRAND_EXERCISE).unwrap();
    assert!(exercise.is_grand());
    assert_eq!(exercise.time_signature.as_deref(), Some("3/4"));

    let treble = exercise.notes_treble.unwrap();
    assert_eq!(treble.len(), 5);
    assert!(treble[1].annotation_replaces_name);
    assert_eq!(treble[4].kind.as_deref(), Some("r"));
    assert_eq!(exercise.notes_bass.unwrap()[0].keys, vec!["g/2", "d/3"]);
}

#[test]
fn grand_exercise_renders_from_json() {
    let options = r#"{ "showTextAnnotations": true }"#;
    let svg = render_exercise_json(GRAND_EXERCISE, Some(options), 700.0, 0.0).unwrap();

    let labels = texts(&svg);
    // G major on both staves, 3/4 on both staves.
    assert_eq!(labels.iter().filter(|t| *t == "\u{266F}").count(), 2);
    assert_eq!(labels.iter().filter(|t| *t == "3").count(), 2);
    assert!(labels.contains(&"Sol".to_string()));
    assert!(labels.contains(&"1".to_string()));
    assert!(!labels.contains(&"Si".to_string()));
    assert!(labels.contains(&"Re".to_string()));
}

#[test]
fn missing_options_use_defaults() {
    let svg = render_exercise_json(GRAND_EXERCISE, None, 0.0, 0.0).unwrap();
    assert!(!texts(&svg).contains(&"Sol".to_string()));
    // The free-text annotation is drawn even with names off.
    assert!(texts(&svg).contains(&"1".to_string()));
}

#[test]
fn malformed_json_is_rejected() {
    let err = render_exercise_json("{ \"notes\": 3 }", None, 0.0, 0.0).unwrap_err();
    assert!(matches!(err, ParseError::InvalidJson(_)));
}
