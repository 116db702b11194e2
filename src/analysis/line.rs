//! Per-line classification into headings, list items and body text.

use regex::Regex;

use crate::model::Line;
use crate::parser::Thresholds;

/// Glyphs that open a bulleted list item.
pub const BULLET_GLYPHS: [char; 8] = ['•', '○', '▪', '■', '◆', '▸', '-', '*'];

/// `1.`, `1)`, `a)`, `iv.`, `(1)`, `(a)`
const NUMBERING_PATTERN: &str = r"^(?:\d+\.|\d+\)|[a-z]\)|(?i:[ivx]+)\.|\(\d+\)|\([a-z]\))";
const BULLET_MARKER_PATTERN: &str = r"^\s*[•○▪■◆▸*-]\s*";
const NUMBER_MARKER_PATTERN: &str = r"^\s*(?:\d+[.)]|(?i:[ivx]+)\.|\([a-z0-9]+\)|[a-z]\))\s*";

/// Structural role of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Heading of level 1-3
    Heading(u8),
    /// Bulleted list item
    Bullet,
    /// Numbered list item
    Numbered,
    /// Body text
    Paragraph,
}

impl LineKind {
    /// Check if this is a list item of either kind.
    pub fn is_list_item(&self) -> bool {
        matches!(self, LineKind::Bullet | LineKind::Numbered)
    }
}

/// Classifies lines relative to the document's median font size.
///
/// Classification is a pure function of the line, the median size and the
/// page's left margin; the classifier holds only configuration.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    thresholds: Thresholds,
    numbering: Regex,
}

impl LineClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            numbering: Regex::new(NUMBERING_PATTERN).expect("numbering pattern is valid"),
        }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify one line. First match wins: bullet, numbered, heading 1-3,
    /// paragraph.
    pub fn classify(&self, line: &Line, median_font_size: f32, left_margin: f32) -> LineKind {
        let text = line.text();
        let trimmed = text.trim();
        let indented = line.x() - left_margin > self.thresholds.indent;

        if indented && self.is_bullet(trimmed) {
            return LineKind::Bullet;
        }
        if indented && self.is_numbered(trimmed) {
            return LineKind::Numbered;
        }

        self.heading_level(line.average_font_size(), median_font_size)
            .map(LineKind::Heading)
            .unwrap_or(LineKind::Paragraph)
    }

    /// Heading level implied by a font size, if any.
    pub fn heading_level(&self, font_size: f32, median_font_size: f32) -> Option<u8> {
        let t = &self.thresholds;
        if font_size > median_font_size * t.heading1 {
            Some(1)
        } else if font_size > median_font_size * t.heading2 {
            Some(2)
        } else if font_size > median_font_size * t.heading3 {
            Some(3)
        } else {
            None
        }
    }

    fn is_bullet(&self, trimmed: &str) -> bool {
        trimmed
            .chars()
            .next()
            .is_some_and(|c| BULLET_GLYPHS.contains(&c))
    }

    fn is_numbered(&self, trimmed: &str) -> bool {
        self.numbering.is_match(trimmed)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

/// Strips the visible marker (bullet glyph or numeral) from list item text.
#[derive(Debug, Clone)]
pub struct MarkerStripper {
    bullet: Regex,
    number: Regex,
}

impl MarkerStripper {
    /// Create a marker stripper.
    pub fn new() -> Self {
        Self {
            bullet: Regex::new(BULLET_MARKER_PATTERN).expect("bullet marker pattern is valid"),
            number: Regex::new(NUMBER_MARKER_PATTERN).expect("number marker pattern is valid"),
        }
    }

    /// Length in bytes of the leading marker, including trailing whitespace.
    pub fn marker_len(&self, text: &str, ordered: bool) -> usize {
        let re = if ordered { &self.number } else { &self.bullet };
        re.find(text).map(|m| m.end()).unwrap_or(0)
    }

    /// Text with the leading marker removed.
    pub fn strip<'a>(&self, text: &'a str, ordered: bool) -> &'a str {
        &text[self.marker_len(text, ordered)..]
    }
}

impl Default for MarkerStripper {
    fn default() -> Self {
        Self::new()
    }
}
