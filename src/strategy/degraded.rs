//! Fallback extraction from each page's plain text.

use crate::error::{Error, Result};
use crate::model::{ContentItem, ContentKind, ContentStream, TextRun};
use crate::parser::{LopdfBackend, PdfBackend};

use super::ExtractionStrategy;

/// Plain per-line text extraction without structure or styling.
///
/// Every non-empty line becomes an unstyled paragraph. Items are ordered by
/// page and by line index within the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegradedExtractor;

impl DegradedExtractor {
    /// Create a degraded extractor.
    pub fn new() -> Self {
        Self
    }

    /// Items for one page's plain text.
    pub fn page_items(page_number: u32, text: &str) -> Vec<ContentItem> {
        text.lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                let y = i as f32;
                Some(ContentItem::new(
                    ContentKind::Paragraph {
                        runs: vec![TextRun::plain(line, 0.0)],
                    },
                    page_number,
                    y,
                    y,
                ))
            })
            .collect()
    }
}

impl ExtractionStrategy for DegradedExtractor {
    fn name(&self) -> &str {
        "degraded"
    }

    fn extract(&self, data: &[u8]) -> Result<ContentStream> {
        let backend = LopdfBackend::load_bytes(data)?;

        let mut items = Vec::new();
        for page_number in backend.pages().into_keys() {
            match backend.page_text(page_number) {
                Ok(text) => items.extend(Self::page_items(page_number, &text)),
                Err(e) => log::warn!("Page {} has no readable text: {}", page_number, e),
            }
        }

        let stream = ContentStream::from_items(items);
        if stream.stats().chars == 0 {
            return Err(Error::NoExtractableText);
        }
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_items_one_per_line() {
        let items = DegradedExtractor::page_items(2, "Title\n\n  body line  \n\t\nlast");
        let texts: Vec<String> = items.iter().map(ContentItem::text).collect();
        assert_eq!(texts, vec!["Title", "body line", "last"]);
        assert!(items.iter().all(|i| i.is_paragraph() && i.page_number == 2));
        assert_eq!(items[1].y_position, 2.0);
    }

    #[test]
    fn test_degraded_runs_are_unstyled() {
        let items = DegradedExtractor::page_items(1, "text");
        match &items[0].kind {
            ContentKind::Paragraph { runs } => {
                assert!(!runs[0].bold && !runs[0].italic);
                assert_eq!(runs[0].font_size, 0.0);
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_non_pdf_is_fatal() {
        let err = DegradedExtractor.extract(b"nope").unwrap_err();
        assert!(err.is_fatal());
    }
}
