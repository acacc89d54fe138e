//! Minimal SVG document builder used by the chart renderer.

use crate::error::Result;
use crate::format::escape_xml;
use crate::grid::GridColor;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    background: Option<GridColor>,
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names match SVG attribute names.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect { x: f32, y: f32, width: f32, height: f32, fill: GridColor },
    /// Line
    Line { x1: f32, y1: f32, x2: f32, y2: f32, stroke: GridColor, stroke_width: f32 },
    /// Text
    Text { x: f32, y: f32, text: String, font_size: f32, fill: GridColor, anchor: TextAnchor },
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the position.
    #[default]
    Start,
    /// Text is centered on the position.
    Middle,
    /// Text ends at the position.
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions and a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: Some(GridColor::White), elements: Vec::new() }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<GridColor>) -> Self {
        self.background = color;
        self
    }

    /// Add a rectangle.
    #[must_use]
    pub fn rect(mut self, x: f32, y: f32, width: f32, height: f32, fill: GridColor) -> Self {
        self.elements.push(SvgElement::Rect { x, y, width, height, fill });
        self
    }

    /// Add a line.
    #[must_use]
    pub fn line(mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: GridColor, stroke_width: f32) -> Self {
        self.elements.push(SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width });
        self
    }

    /// Add text with anchor.
    #[must_use]
    pub fn text(mut self, x: f32, y: f32, text: &str, font_size: f32, fill: GridColor, anchor: TextAnchor) -> Self {
        self.elements.push(SvgElement::Text { x, y, text: text.to_string(), font_size, fill, anchor });
        self
    }

    /// Number of elements added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{bg}"/>"#);
        }
        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect { x, y, width, height, fill } => {
            format!(r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}"/>"#)
        }
        SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width } => {
            format!(r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{stroke}" stroke-width="{stroke_width}"/>"#)
        }
        SvgElement::Text { x, y, text, font_size, fill, anchor } => {
            format!(
                r#"<text x="{x}" y="{y}" font-size="{font_size}" fill="{fill}" text-anchor="{}" font-family="sans-serif">{}</text>"#,
                anchor.as_str(),
                escape_xml(text, true)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_document_shape() {
        let svg = SvgEncoder::new(100, 50).rect(1.0, 2.0, 3.0, 4.0, GridColor::Rgb(255, 0, 0)).render();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="100""#));
        assert!(svg.contains(r##"<rect x="1" y="2" width="3" height="4" fill="#ff0000"/>"##));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_svg_text_escaping() {
        let svg = SvgEncoder::new(10, 10).text(0.0, 0.0, "a<b & 'c'", 12.0, GridColor::Black, TextAnchor::Middle).render();
        assert!(svg.contains("a&lt;b &amp; &#039;c&#039;"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn test_svg_transparent_background() {
        let svg = SvgEncoder::new(10, 10).background(None).render();
        assert!(!svg.contains("100%"));
        assert!(SvgEncoder::default().is_empty());
    }

    #[test]
    fn test_svg_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let encoder = SvgEncoder::new(10, 10).line(0.0, 0.0, 10.0, 10.0, GridColor::Gray, 1.0);
        assert_eq!(encoder.len(), 1);
        encoder.write_to_file(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<line"));
    }
}
