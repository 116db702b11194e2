//! Word-processor document model.
//!
//! Sizes follow word-processing conventions: spacing and margins are in
//! twips (1/20 pt), run sizes in half-points, image extents in pixels.

use serde::{Deserialize, Serialize};

use crate::model::TextRun;

/// An output document: a single section of body elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordDocument {
    /// Body content in order
    pub body: Vec<BodyElement>,

    /// Page margins
    pub margins: PageMargins,
}

impl WordDocument {
    /// Create an empty document with default margins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body element.
    pub fn push(&mut self, element: BodyElement) {
        self.body.push(element);
    }

    /// Iterate over paragraphs, skipping images.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|e| match e {
            BodyElement::Paragraph(p) => Some(p),
            BodyElement::Image(_) => None,
        })
    }

    /// Iterate over embedded images.
    pub fn images(&self) -> impl Iterator<Item = &EmbeddedImage> {
        self.body.iter().filter_map(|e| match e {
            BodyElement::Image(img) => Some(img),
            BodyElement::Paragraph(_) => None,
        })
    }

    /// Plain text of all paragraphs, separated by blank lines.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the document has no content.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Page margins in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl PageMargins {
    /// The same margin on every side.
    pub fn uniform(twips: u32) -> Self {
        Self {
            top: twips,
            right: twips,
            bottom: twips,
            left: twips,
        }
    }
}

impl Default for PageMargins {
    /// Half an inch on every side.
    fn default() -> Self {
        Self::uniform(720)
    }
}

/// A top-level body element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyElement {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// An image on its own line
    Image(EmbeddedImage),
}

/// A paragraph of styled runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline runs
    pub runs: Vec<Run>,

    /// Paragraph style
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single unstyled run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(Run::new(text));
        p
    }

    /// Create a heading paragraph.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let mut p = Self::with_text(text);
        p.style.heading_level = Some(level.clamp(1, 6));
        p
    }

    /// Set paragraph spacing.
    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.style.spacing = spacing;
        self
    }

    /// Add a run, dropping it if empty.
    pub fn add_run(&mut self, run: Run) {
        if !run.text.is_empty() {
            self.runs.push(run);
        }
    }

    /// Plain text of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        self.style.heading_level.is_some()
    }

    /// Get the heading level or None.
    pub fn heading_level(&self) -> Option<u8> {
        self.style.heading_level
    }

    /// Check if this is a list item.
    pub fn is_list_item(&self) -> bool {
        self.style.list_info.is_some()
    }
}

/// A run of text with uniform properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Character formatting
    pub properties: RunProperties,
}

impl Run {
    /// Create an unstyled run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            properties: RunProperties::default(),
        }
    }

    /// Create a run from an extracted text run.
    pub fn from_text_run(run: &TextRun) -> Self {
        Self {
            text: run.text.clone(),
            properties: RunProperties::from_text_run(run),
        }
    }
}

/// Character formatting of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProperties {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Font size in half-points
    pub size: Option<u32>,
}

impl RunProperties {
    /// Properties of an extracted run; a zero size is left unset.
    pub fn from_text_run(run: &TextRun) -> Self {
        let half_points = (run.font_size * 2.0).round();
        Self {
            bold: run.bold,
            italic: run.italic,
            size: (half_points >= 1.0).then_some(half_points as u32),
        }
    }

    /// Check if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic
    }
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Heading level (1-6) or None for normal paragraph
    pub heading_level: Option<u8>,

    /// List information if this is a list item
    pub list_info: Option<ListInfo>,

    /// Vertical spacing around the paragraph
    pub spacing: Spacing,
}

/// Space before and after a paragraph, in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacing {
    pub before: u32,
    pub after: u32,
}

impl Spacing {
    /// Create spacing.
    pub fn new(before: u32, after: u32) -> Self {
        Self { before, after }
    }
}

/// Information about a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    /// List style
    pub style: ListStyle,

    /// Nesting level (0 = top level)
    pub level: u8,
}

impl ListInfo {
    /// A bulleted list item.
    pub fn bullet(level: u8) -> Self {
        Self {
            style: ListStyle::Bullet,
            level,
        }
    }

    /// A numbered list item.
    pub fn numbered(level: u8) -> Self {
        Self {
            style: ListStyle::Numbered,
            level,
        }
    }
}

/// List style; numbering is supplied by the output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// Unordered list
    Bullet,
    /// Ordered list
    Numbered,
}

/// An image embedded in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Encoded image bytes
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/jpeg")
    pub mime_type: String,

    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Vertical spacing around the image
    pub spacing: Spacing,
}
