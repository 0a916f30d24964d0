//! Named drawing targets owned by a host document.
//!
//! A surface holds whatever the last render call put there: nothing, an SVG
//! document, or an inline message when drawing failed.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceContent {
    #[default]
    Blank,
    Svg(String),
    Message(String),
}

/// One target area. `width` / `height` of 0 mean "not measured yet".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    content: SurfaceContent,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, content: SurfaceContent::Blank }
    }

    pub fn clear(&mut self) {
        self.content = SurfaceContent::Blank;
    }

    pub fn set_svg(&mut self, svg: String) {
        self.content = SurfaceContent::Svg(svg);
    }

    pub fn show_message(&mut self, message: impl Into<String>) {
        self.content = SurfaceContent::Message(message.into());
    }

    pub fn content(&self) -> &SurfaceContent {
        &self.content
    }

    pub fn svg(&self) -> Option<&str> {
        match &self.content {
            SurfaceContent::Svg(svg) => Some(svg),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.content {
            SurfaceContent::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

/// The host's set of surfaces, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct Document {
    surfaces: HashMap<String, Surface>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a surface and return it.
    pub fn add_surface(&mut self, id: impl Into<String>, width: f64, height: f64) -> &mut Surface {
        let slot = self.surfaces.entry(id.into()).or_default();
        *slot = Surface::new(width, height);
        slot
    }

    pub fn surface(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn surface_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_replaced_not_appended() {
        let mut doc = Document::new();
        doc.add_surface("staff", 300.0, 100.0).set_svg("<svg/>".into());
        let surface = doc.surface_mut("staff").unwrap();
        assert_eq!(surface.svg(), Some("<svg/>"));

        surface.show_message("oops");
        assert_eq!(surface.svg(), None);
        assert_eq!(surface.message(), Some("oops"));

        surface.clear();
        assert_eq!(surface.content(), &SurfaceContent::Blank);
    }

    #[test]
    fn unknown_ids_are_absent() {
        let doc = Document::new();
        assert!(doc.surface("nope").is_none());
    }
}
