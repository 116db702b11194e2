//! The classified content stream handed from analysis to the document builder.

use serde::{Deserialize, Serialize};

/// A minimal span of uniformly styled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Font size in points
    pub font_size: f32,
}

impl TextRun {
    /// Create an unstyled run.
    pub fn plain(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            font_size,
        }
    }

    /// Whether `other` carries the same styling as this run.
    pub fn same_style(&self, other: &TextRun) -> bool {
        self.bold == other.bold && self.italic == other.italic && self.font_size == other.font_size
    }
}

/// Concatenate the text of a run sequence.
pub fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// What a content item is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentKind {
    /// A heading line
    Heading {
        /// Heading level (1-3)
        level: u8,
        /// Heading text
        text: String,
    },
    /// One or more merged body lines
    Paragraph {
        /// Styled runs
        runs: Vec<TextRun>,
    },
    /// A bulleted or numbered line
    ListItem {
        /// Numbered (true) or bulleted (false)
        ordered: bool,
        /// Styled runs, still including the visible marker
        runs: Vec<TextRun>,
    },
    /// A placed image
    Image {
        /// Page the image is drawn on (1-indexed)
        page_number: u32,
        /// Index of the image block within its page
        block_index: usize,
        /// Ordinal among all images in the document
        sequence_index: usize,
    },
}

/// A classified item with the position used to order it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// What the item is
    #[serde(flatten)]
    pub kind: ContentKind,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Top edge in top-down page space
    pub y_position: f32,
    /// Bottom edge in top-down page space
    pub y_bottom: f32,
}

impl ContentItem {
    /// Create an item spanning `y_position..y_bottom` on a page.
    pub fn new(kind: ContentKind, page_number: u32, y_position: f32, y_bottom: f32) -> Self {
        Self {
            kind,
            page_number,
            y_position,
            y_bottom,
        }
    }

    /// Plain text of the item (empty for images).
    pub fn text(&self) -> String {
        match &self.kind {
            ContentKind::Heading { text, .. } => text.clone(),
            ContentKind::Paragraph { runs } | ContentKind::ListItem { runs, .. } => {
                runs_text(runs)
            }
            ContentKind::Image { .. } => String::new(),
        }
    }

    /// Check if this item is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, ContentKind::Paragraph { .. })
    }

    /// Check if this item is an image.
    pub fn is_image(&self) -> bool {
        matches!(self.kind, ContentKind::Image { .. })
    }

    /// Ordering key: page first, then vertical position.
    pub fn cmp_position(&self, other: &ContentItem) -> std::cmp::Ordering {
        self.page_number
            .cmp(&other.page_number)
            .then_with(|| self.y_position.total_cmp(&other.y_position))
    }
}

/// Ordered, flattened sequence of classified content.
///
/// Items can only be appended; once built the stream is exposed read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentStream {
    items: Vec<ContentItem>,
}

impl ContentStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stream from items, stably sorting them into reading order.
    pub fn from_items(mut items: Vec<ContentItem>) -> Self {
        items.sort_by(|a, b| a.cmp_position(b));
        Self { items }
    }

    /// Append an item.
    pub fn push(&mut self, item: ContentItem) {
        self.items.push(item);
    }

    /// Items in order.
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Iterate over items.
    pub fn iter(&self) -> std::slice::Iter<'_, ContentItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the items are sorted by `(page_number, y_position)`.
    pub fn is_ordered(&self) -> bool {
        self.items
            .windows(2)
            .all(|w| w[0].cmp_position(&w[1]) != std::cmp::Ordering::Greater)
    }

    /// Image items in sequence order.
    pub fn images(&self) -> Vec<&ContentItem> {
        let mut images: Vec<&ContentItem> = self.items.iter().filter(|i| i.is_image()).collect();
        images.sort_by_key(|i| match i.kind {
            ContentKind::Image { sequence_index, .. } => sequence_index,
            _ => usize::MAX,
        });
        images
    }

    /// Render the stream as plain text, one item per paragraph.
    pub fn plain_text(&self) -> String {
        self.items
            .iter()
            .map(ContentItem::text)
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Count items by kind, plus words and characters.
    pub fn stats(&self) -> ContentStats {
        let mut stats = ContentStats::default();
        for item in &self.items {
            match &item.kind {
                ContentKind::Heading { .. } => stats.headings += 1,
                ContentKind::Paragraph { .. } => stats.paragraphs += 1,
                ContentKind::ListItem { ordered: true, .. } => stats.numbered += 1,
                ContentKind::ListItem { ordered: false, .. } => stats.bullets += 1,
                ContentKind::Image { .. } => stats.images += 1,
            }
            stats.count_text(&item.text());
        }
        stats
    }
}

impl<'a> IntoIterator for &'a ContentStream {
    type Item = &'a ContentItem;
    type IntoIter = std::slice::Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Per-document content statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    /// Number of headings
    pub headings: u32,
    /// Number of paragraphs
    pub paragraphs: u32,
    /// Number of bulleted list items
    pub bullets: u32,
    /// Number of numbered list items
    pub numbered: u32,
    /// Number of images
    pub images: u32,
    /// Approximate word count (whitespace-separated tokens)
    pub words: u32,
    /// Character count (excluding whitespace)
    pub chars: u32,
}

impl ContentStats {
    /// Total number of items counted.
    pub fn total(&self) -> u32 {
        self.headings + self.paragraphs + self.bullets + self.numbered + self.images
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.words += text.split_whitespace().count() as u32;
        self.chars += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }
}
