//! Positioned-glyph types produced by the geometry extractor.
//!
//! All coordinates are in PDF points in *top-down* page space: the origin is
//! the top-left corner of the page box and `y` grows downward, so a smaller
//! `y` is higher on the page. The extractor flips PDF's bottom-up user space
//! before any of these types are created.

use serde::{Deserialize, Serialize};

use crate::analysis::style::{is_bold, is_italic};

/// Axis-aligned bounding box in top-down page space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Bold/italic classification of a font, derived once from its name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    /// Font name indicates a heavy weight
    pub bold: bool,
    /// Font name indicates a slanted face
    pub italic: bool,
}

impl FontStyle {
    /// Regular (neither bold nor italic).
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };

    /// Classify a font by its name (e.g., `"Helvetica-BoldOblique"`).
    pub fn from_font_name(font_name: &str) -> Self {
        Self {
            bold: is_bold(font_name),
            italic: is_italic(font_name),
        }
    }
}

/// A single glyph with its position and font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// The decoded character
    pub text: char,
    /// Base font name as declared by the PDF
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f32,
    /// Left edge of the glyph origin
    pub x: f32,
    /// Baseline position
    pub y: f32,
    /// Horizontal advance
    pub width: f32,
    /// Cached style derived from `font_name`
    pub style: FontStyle,
}

impl Character {
    /// Create a character, classifying its font style from the font name.
    pub fn new(text: char, font_name: impl Into<String>, font_size: f32, x: f32, y: f32) -> Self {
        let font_name = font_name.into();
        let style = FontStyle::from_font_name(&font_name);
        Self {
            text,
            font_name,
            font_size,
            x,
            y,
            width: font_size * 0.5,
            style,
        }
    }

    /// Set the horizontal advance.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Whether the glyph is drawn with a bold font.
    pub fn is_bold(&self) -> bool {
        self.style.bold
    }

    /// Whether the glyph is drawn with an italic font.
    pub fn is_italic(&self) -> bool {
        self.style.italic
    }

    /// Approximate glyph box (80% ascender above, 20% descender below the baseline).
    pub fn bbox(&self) -> BBox {
        BBox {
            x0: self.x,
            y0: self.y - self.font_size * 0.8,
            x1: self.x + self.width,
            y1: self.y + self.font_size * 0.2,
        }
    }
}

/// Characters sharing a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Characters in reading order
    pub chars: Vec<Character>,
    /// Bounding box of all characters
    pub bbox: BBox,
}

impl Line {
    /// Build a line, computing its bounding box from the characters.
    pub fn from_chars(chars: Vec<Character>) -> Self {
        let bbox = chars
            .iter()
            .map(Character::bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self { chars, bbox }
    }

    /// The line's text, exactly as the characters spell it.
    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.text).collect()
    }

    /// Horizontal start of the line.
    pub fn x(&self) -> f32 {
        self.bbox.x0
    }

    /// Mean font size over all characters (0 for an empty line).
    pub fn average_font_size(&self) -> f32 {
        if self.chars.is_empty() {
            return 0.0;
        }
        self.chars.iter().map(|c| c.font_size).sum::<f32>() / self.chars.len() as f32
    }

    /// Whether the line has no visible text.
    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|c| c.text.is_whitespace())
    }
}

/// Reference to an image drawn on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// XObject resource name (e.g., "Im0")
    pub name: String,
    /// Intrinsic width in pixels, when declared
    pub width: Option<u32>,
    /// Intrinsic height in pixels, when declared
    pub height: Option<u32>,
}

/// A content block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Lines of text
    Text {
        /// Bounding box of all lines
        bbox: BBox,
        /// Lines in top-to-bottom order
        lines: Vec<Line>,
    },
    /// A placed image
    Image {
        /// Placement on the page
        bbox: BBox,
        /// The image resource
        image: ImageRef,
    },
}

impl Block {
    /// Create a text block from lines.
    pub fn text(lines: Vec<Line>) -> Self {
        let bbox = lines
            .iter()
            .map(|l| l.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Block::Text { bbox, lines }
    }

    /// Create an image block.
    pub fn image(bbox: BBox, image: ImageRef) -> Self {
        Block::Image { bbox, image }
    }

    /// Bounding box of the block.
    pub fn bbox(&self) -> BBox {
        match self {
            Block::Text { bbox, .. } | Block::Image { bbox, .. } => *bbox,
        }
    }

    /// Lines of a text block (empty for images).
    pub fn lines(&self) -> &[Line] {
        match self {
            Block::Text { lines, .. } => lines,
            Block::Image { .. } => &[],
        }
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image { .. })
    }
}

/// Everything captured from one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageExtraction {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Blocks, not necessarily in reading order
    pub blocks: Vec<Block>,
    /// Page box in top-down space
    pub bbox: BBox,
}

impl PageExtraction {
    /// Create a page extraction.
    pub fn new(page_number: u32, blocks: Vec<Block>, bbox: BBox) -> Self {
        Self {
            page_number,
            blocks,
            bbox,
        }
    }

    /// An empty US Letter page.
    pub fn empty(page_number: u32) -> Self {
        Self::new(page_number, Vec::new(), BBox::new(0.0, 0.0, 612.0, 792.0))
    }

    /// Iterate over every character on the page.
    pub fn chars(&self) -> impl Iterator<Item = &Character> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines())
            .flat_map(|l| l.chars.iter())
    }

    /// Number of non-whitespace characters on the page.
    pub fn text_char_count(&self) -> usize {
        self.chars().filter(|c| !c.text.is_whitespace()).count()
    }

    /// Leftmost x of any block, if the page has blocks.
    pub fn leftmost_block_x(&self) -> Option<f32> {
        self.blocks
            .iter()
            .map(|b| b.bbox().x0)
            .reduce(f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, x: f32, y: f32, size: f32) -> Line {
        let chars = text
            .chars()
            .enumerate()
            .map(|(i, c)| Character::new(c, "Helvetica", size, x + i as f32 * size * 0.5, y))
            .collect();
        Line::from_chars(chars)
    }

    #[test]
    fn test_font_style_cached_on_character() {
        let c = Character::new('A', "Times-BoldItalic", 12.0, 0.0, 0.0);
        assert!(c.is_bold());
        assert!(c.is_italic());

        let c = Character::new('A', "Times-Roman", 12.0, 0.0, 0.0);
        assert_eq!(c.style, FontStyle::REGULAR);
    }

    #[test]
    fn test_line_text_and_bbox() {
        let l = line("Hello", 72.0, 100.0, 10.0);
        assert_eq!(l.text(), "Hello");
        assert_eq!(l.x(), 72.0);
        assert!((l.bbox.y0 - 92.0).abs() < 1e-4);
        assert!((l.bbox.y1 - 102.0).abs() < 1e-4);
        assert!((l.average_font_size() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_blank_line() {
        assert!(line("   ", 0.0, 0.0, 12.0).is_blank());
        assert!(!line(" a ", 0.0, 0.0, 12.0).is_blank());
        assert_eq!(Line::from_chars(vec![]).average_font_size(), 0.0);
    }

    #[test]
    fn test_page_char_count_and_margin() {
        let page = PageExtraction::new(
            1,
            vec![
                Block::text(vec![line("ab c", 90.0, 100.0, 12.0)]),
                Block::image(
                    BBox::new(40.0, 200.0, 140.0, 300.0),
                    ImageRef {
                        name: "Im0".into(),
                        width: None,
                        height: None,
                    },
                ),
            ],
            BBox::new(0.0, 0.0, 612.0, 792.0),
        );
        assert_eq!(page.text_char_count(), 3);
        assert_eq!(page.leftmost_block_x(), Some(40.0));
    }
}
