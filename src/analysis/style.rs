//! Font-name style inference and document-wide font statistics.

use crate::model::{Block, PageExtraction};

/// Baseline size used when a document has no text at all.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

const BOLD_MARKERS: [&str; 3] = ["bold", "heavy", "black"];
const ITALIC_MARKERS: [&str; 2] = ["italic", "oblique"];

/// Check whether a font name denotes a bold face.
pub fn is_bold(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    BOLD_MARKERS.iter().any(|m| lower.contains(m))
}

/// Check whether a font name denotes an italic face.
pub fn is_italic(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    ITALIC_MARKERS.iter().any(|m| lower.contains(m))
}

/// Median font size over every character of every text block.
///
/// Characters without a positive size are ignored. Returns
/// [`DEFAULT_FONT_SIZE`] when there are no samples.
pub fn median_font_size<'a, I>(blocks: I) -> f32
where
    I: IntoIterator<Item = &'a Block>,
{
    let sizes: Vec<f32> = blocks
        .into_iter()
        .flat_map(|b| b.lines())
        .flat_map(|l| l.chars.iter())
        .map(|c| c.font_size)
        .filter(|s| *s > 0.0)
        .collect();
    median(sizes).unwrap_or(DEFAULT_FONT_SIZE)
}

/// Statistical median (mean of the middle pair for even counts).
fn median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Document-wide measurements, computed once before classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentMetrics {
    median_font_size: f32,
    text_chars: usize,
}

impl DocumentMetrics {
    /// Measure all pages of a document.
    pub fn from_pages(pages: &[PageExtraction]) -> Self {
        let median_font_size = median_font_size(pages.iter().flat_map(|p| p.blocks.iter()));
        let text_chars = pages.iter().map(PageExtraction::text_char_count).sum();
        log::debug!(
            "Document metrics: {} pages, {} text chars, median font size {:.2}",
            pages.len(),
            text_chars,
            median_font_size
        );
        Self {
            median_font_size,
            text_chars,
        }
    }

    /// Metrics with a fixed median, for analysing isolated pages.
    pub fn with_median(median_font_size: f32) -> Self {
        Self {
            median_font_size,
            text_chars: 0,
        }
    }

    /// The document's median font size.
    pub fn median_font_size(&self) -> f32 {
        self.median_font_size
    }

    /// Number of non-whitespace characters across all pages.
    pub fn text_chars(&self) -> usize {
        self.text_chars
    }

    /// Whether the document has any text at all.
    pub fn has_text(&self) -> bool {
        self.text_chars > 0
    }
}
