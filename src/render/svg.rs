//! Minimal SVG document builder

use std::fmt::Write as FmtWrite;
use std::io::Write;

use crate::error::Result;

/// Text anchor position for SVG text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
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

/// An SVG element
#[derive(Debug, Clone)]
pub enum SvgElement {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: &'static str,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: &'static str,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: &'static str,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        anchor: TextAnchor,
        rotate: bool,
    },
}

/// An SVG document built up element by element, then written once
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    elements: Vec<SvgElement>,
}

/// Escape XML special characters in text content
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
        } => format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" fill="{fill}"/>"#
        ),
        SvgElement::Circle { cx, cy, r, fill } => {
            format!(r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{fill}"/>"#)
        }
        SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => format!(
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="1"/>"#
        ),
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            anchor,
            rotate,
        } => {
            let transform = if *rotate {
                format!(r#" transform="rotate(-90 {x:.2} {y:.2})""#)
            } else {
                String::new()
            };
            format!(
                r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{font_size}" text-anchor="{}"{transform}>{}</text>"#,
                anchor.as_str(),
                escape(text)
            )
        }
    }
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &'static str) {
        self.elements.push(SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &'static str) {
        self.elements.push(SvgElement::Circle { cx, cy, r, fill });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &'static str) {
        self.elements.push(SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
    }

    pub fn text(&mut self, x: f64, y: f64, text: &str, font_size: f64, anchor: TextAnchor) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            anchor,
            rotate: false,
        });
    }

    /// Text rotated a quarter turn counter-clockwise, for vertical axis titles
    pub fn vertical_text(&mut self, x: f64, y: f64, text: &str, font_size: f64) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            anchor: TextAnchor::Middle,
            rotate: true,
        });
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Render to an SVG string
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(256 + 96 * self.elements.len());

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);
        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write the rendered document to `out`
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_elements() {
        let mut doc = SvgDocument::new(200, 100);
        doc.rect(1.0, 2.0, 3.0, 4.0, "steelblue");
        doc.circle(10.0, 10.0, 2.5, "black");
        doc.line(0.0, 0.0, 5.0, 5.0, "gray");
        doc.text(5.0, 5.0, "PC1", 12.0, TextAnchor::Middle);
        assert_eq!(doc.len(), 4);

        let svg = doc.render();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains(r#"<rect x="1.00" y="2.00" width="3.00" height="4.00" fill="steelblue"/>"#));
        assert!(svg.contains(r#"<circle cx="10.00" cy="10.00" r="2.50" fill="black"/>"#));
        assert!(svg.contains(r#"text-anchor="middle">PC1</text>"#));
    }

    #[test]
    fn test_text_escaping() {
        let mut doc = SvgDocument::new(10, 10);
        doc.text(0.0, 0.0, "a<b & \"c\"", 10.0, TextAnchor::Start);
        assert!(doc.render().contains("a&lt;b &amp; &quot;c&quot;"));
    }

    #[test]
    fn test_vertical_text() {
        let mut doc = SvgDocument::new(10, 10);
        doc.vertical_text(4.0, 5.0, "y", 10.0);
        assert!(doc.render().contains(r#"transform="rotate(-90 4.00 5.00)""#));
    }
}
