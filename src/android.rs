//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::{jfloat, jstring};
use jni::JNIEnv;

use crate::render_exercise_json;

/// Render an exercise given as JSON to SVG.
///
/// Called from Kotlin as:
///   external fun renderExercise(exerciseJson: String, optionsJson: String?, width: Float, height: Float): String?
#[no_mangle]
pub extern "system" fn Java_com_pianotutor_app_ScoreEngine_renderExercise(
    mut env: JNIEnv,
    _class: JClass,
    exercise_json: JString,
    options_json: JString,
    width: jfloat,
    height: jfloat,
) -> jstring {
    let exercise: String = match env.get_string(&exercise_json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    let options: Option<String> = if options_json.is_null() {
        None
    } else {
        env.get_string(&options_json).ok().map(|s| s.into())
    };

    match render_exercise_json(&exercise, options.as_deref(), width as f64, height as f64) {
        Ok(svg) => match env.new_string(&svg) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            tracing::warn!("{e}");
            std::ptr::null_mut()
        }
    }
}
