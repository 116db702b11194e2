//! Geometry-based extraction: positioned characters in, classified content out.
//!
//! Every page must extract cleanly. Any page failure is reported as
//! [`Error::RichExtractionFailure`] so the whole document is retried with the
//! degraded strategy.

use crate::analysis::{ContentAssembler, DocumentMetrics};
use crate::error::{Error, Result};
use crate::model::ContentStream;
use crate::parser::{ExtractOptions, GeometryExtractor};

use super::ExtractionStrategy;

/// Geometry-based extraction with full structure classification.
#[derive(Debug, Clone)]
pub struct RichExtractor {
    options: ExtractOptions,
    enabled: bool,
}

impl RichExtractor {
    /// Create a rich extractor.
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            enabled: true,
        }
    }

    /// A rich extractor that reports itself unavailable, forcing the fallback.
    pub fn disabled(options: ExtractOptions) -> Self {
        Self {
            options,
            enabled: false,
        }
    }

    /// Options used for extraction.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }
}

impl Default for RichExtractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl ExtractionStrategy for RichExtractor {
    fn name(&self) -> &str {
        "rich"
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    fn extract(&self, data: &[u8]) -> Result<ContentStream> {
        if !self.enabled {
            return Err(Error::RichExtractionUnavailable(
                "layout analysis is disabled".to_string(),
            ));
        }

        // Page failures must reach the controller, never become empty pages.
        let options = self.options.clone().strict();
        let extractor = GeometryExtractor::from_bytes(data, &options)?;
        let pages = extractor.extract_all().map_err(|e| {
            if e.is_fatal() {
                e
            } else {
                Error::RichExtractionFailure(e.to_string())
            }
        })?;

        // Fixed before any line is classified.
        let metrics = DocumentMetrics::from_pages(&pages);
        if !metrics.has_text() {
            return Err(Error::NoExtractableText);
        }

        Ok(ContentAssembler::new(metrics, &options).assemble(&pages))
    }
}
