//! Two-phase assembly of classified lines into a document-wide content stream.
//!
//! Phase 1 works inside one block: lines are classified, and consecutive body
//! lines that sit close together become a single paragraph. Phase 2 sorts the
//! items of every page into reading order and merges paragraphs that were
//! split across blocks but still read as one.

use crate::model::{Block, ContentItem, ContentKind, ContentStream, Line, PageExtraction};
use crate::parser::{ExtractOptions, MarginReference};

use super::line::{LineClassifier, LineKind};
use super::runs::{join_runs, segment_runs};
use super::style::DocumentMetrics;

/// Builds a [`ContentStream`] from page geometry.
#[derive(Debug, Clone)]
pub struct ContentAssembler {
    classifier: LineClassifier,
    metrics: DocumentMetrics,
    margin_reference: MarginReference,
}

impl ContentAssembler {
    /// Create an assembler for a document with the given metrics.
    pub fn new(metrics: DocumentMetrics, options: &ExtractOptions) -> Self {
        Self {
            classifier: LineClassifier::new(options.thresholds),
            metrics,
            margin_reference: options.margin_reference,
        }
    }

    /// Metrics the assembler classifies against.
    pub fn metrics(&self) -> &DocumentMetrics {
        &self.metrics
    }

    /// Vertical gap in points above which paragraphs are split.
    pub fn gap_threshold(&self) -> f32 {
        self.classifier
            .thresholds()
            .paragraph_gap_points(self.metrics.median_font_size())
    }

    /// Run both phases over every page and return the ordered stream.
    pub fn assemble(&self, pages: &[PageExtraction]) -> ContentStream {
        let mut ordered: Vec<&PageExtraction> = pages.iter().collect();
        ordered.sort_by_key(|p| p.page_number);

        let mut image_sequence = 0;
        let mut items = Vec::new();
        for page in ordered {
            items.extend(self.page_items(page, &mut image_sequence));
        }

        items.sort_by(|a, b| a.cmp_position(b));
        let merged = merge_paragraphs(items, self.gap_threshold());

        let mut stream = ContentStream::new();
        for item in merged {
            stream.push(item);
        }

        let stats = stream.stats();
        log::debug!(
            "Assembled {} items: {} headings, {} paragraphs, {} bullets, {} numbered, {} images",
            stats.total(),
            stats.headings,
            stats.paragraphs,
            stats.bullets,
            stats.numbered,
            stats.images
        );
        stream
    }

    /// Phase 1 for one page. `image_sequence` carries the document-wide
    /// image ordinal across pages.
    pub fn page_items(&self, page: &PageExtraction, image_sequence: &mut usize) -> Vec<ContentItem> {
        let left_margin = self.left_margin(page);
        let mut items = Vec::new();

        for (block_index, block) in page.blocks.iter().enumerate() {
            match block {
                Block::Text { lines, .. } => {
                    items.extend(self.block_items(lines, page.page_number, left_margin));
                }
                Block::Image { bbox, .. } => {
                    items.push(ContentItem::new(
                        ContentKind::Image {
                            page_number: page.page_number,
                            block_index,
                            sequence_index: *image_sequence,
                        },
                        page.page_number,
                        bbox.y0,
                        bbox.y1,
                    ));
                    *image_sequence += 1;
                }
            }
        }

        items
    }

    /// Left margin list indentation is measured from.
    pub fn left_margin(&self, page: &PageExtraction) -> f32 {
        match self.margin_reference {
            MarginReference::PageBounds => page.bbox.x0,
            MarginReference::LeftmostBlock => page.leftmost_block_x().unwrap_or(0.0),
        }
    }

    fn block_items(&self, lines: &[Line], page_number: u32, left_margin: f32) -> Vec<ContentItem> {
        let median = self.metrics.median_font_size();
        let threshold = self.gap_threshold();
        let mut items = Vec::new();
        let mut paragraph: Option<ContentItem> = None;

        for line in lines {
            if line.is_blank() {
                continue;
            }

            let kind = self.classifier.classify(line, median, left_margin);
            let (top, bottom) = (line.bbox.y0, line.bbox.y1);

            let kind = match kind {
                LineKind::Paragraph => {
                    let runs = segment_runs(&line.chars);
                    let continues = paragraph
                        .as_ref()
                        .is_some_and(|p| top - p.y_bottom <= threshold);

                    if continues {
                        if let Some(current) = paragraph.as_mut() {
                            if let ContentKind::Paragraph { runs: existing } = &mut current.kind {
                                join_runs(existing, runs);
                            }
                            current.y_bottom = current.y_bottom.max(bottom);
                        }
                    } else {
                        items.extend(paragraph.take());
                        paragraph = Some(ContentItem::new(
                            ContentKind::Paragraph { runs },
                            page_number,
                            top,
                            bottom,
                        ));
                    }
                    continue;
                }
                LineKind::Heading(level) => ContentKind::Heading {
                    level,
                    text: line.text().trim().to_string(),
                },
                LineKind::Bullet => ContentKind::ListItem {
                    ordered: false,
                    runs: segment_runs(&line.chars),
                },
                LineKind::Numbered => ContentKind::ListItem {
                    ordered: true,
                    runs: segment_runs(&line.chars),
                },
            };

            items.extend(paragraph.take());
            items.push(ContentItem::new(kind, page_number, top, bottom));
        }

        items.extend(paragraph);
        items
    }
}

/// Phase 2 merge over items already sorted by `(page_number, y_position)`.
///
/// Adjacent paragraphs on the same page whose vertical gap is below
/// `gap_threshold` are joined with a space. Any other item ends the merge.
pub fn merge_paragraphs(items: Vec<ContentItem>, gap_threshold: f32) -> Vec<ContentItem> {
    let mut merged: Vec<ContentItem> = Vec::with_capacity(items.len());

    for item in items {
        if let Some(prev) = merged.last_mut() {
            let mergeable = prev.is_paragraph()
                && item.is_paragraph()
                && prev.page_number == item.page_number
                && item.y_position - prev.y_bottom < gap_threshold;

            if mergeable {
                if let (
                    ContentKind::Paragraph { runs: prev_runs },
                    ContentKind::Paragraph { runs },
                ) = (&mut prev.kind, item.kind)
                {
                    join_runs(prev_runs, runs);
                }
                prev.y_bottom = prev.y_bottom.max(item.y_bottom);
                continue;
            }
        }
        merged.push(item);
    }

    merged
}
