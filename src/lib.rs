//! # pdfstruct
//!
//! Structured content extraction from PDF documents.
//!
//! This library reads the positioned characters of a PDF, recovers headings,
//! paragraphs, lists, inline styling and images in reading order, and builds
//! a word-processor-shaped document from them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfstruct::{extract_file, ContentKind};
//!
//! fn main() -> pdfstruct::Result<()> {
//!     let extraction = extract_file("document.pdf")?;
//!     for item in &extraction.stream {
//!         if let ContentKind::Heading { level, text } = &item.kind {
//!             println!("{} {}", "#".repeat(*level as usize), text);
//!         }
//!     }
//!     if let Some(note) = extraction.disclaimer() {
//!         eprintln!("{}", note);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structure recovery**: Headings, paragraphs, bulleted and numbered lists
//! - **Inline styling**: Bold, italic and size runs
//! - **Reading order**: Page-ordered, top-to-bottom content stream
//! - **Graceful degradation**: Plain per-line text when layout analysis fails
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod analysis;
pub mod builder;
pub mod detect;
pub mod error;
pub mod images;
pub mod model;
pub mod parser;
pub mod strategy;

// Re-export commonly used types
pub use analysis::{ContentAssembler, DocumentMetrics, LineClassifier, LineKind};
pub use builder::{
    BuildOptions, DocumentBuilder, DocumentSerializer, JsonFormat, JsonSerializer, WordDocument,
};
pub use detect::{detect_format_from_bytes, is_pdf_bytes, PdfFormat};
pub use error::{Error, Result};
pub use images::{EmbeddedImageRenderer, ImageData, ImageLocator, ImageMap, ImageRenderer, LocatorOptions};
pub use model::{
    BBox, Block, Character, ContentItem, ContentKind, ContentStats, ContentStream, FontStyle,
    ImageRef, Line, PageExtraction, TextRun,
};
pub use parser::{ErrorMode, ExtractOptions, GeometryExtractor, MarginReference, Thresholds};
pub use strategy::{
    ControllerState, DegradeReason, DegradedExtractor, Extraction, ExtractionController,
    ExtractionMode, ExtractionStrategy, RichExtractor,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Extract structured content from PDF bytes.
///
/// Falls back to plain text extraction when layout analysis fails; check
/// [`Extraction::mode`] or [`Extraction::disclaimer`].
///
/// # Example
///
/// ```no_run
/// use pdfstruct::extract_content;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let extraction = extract_content(&data).unwrap();
/// println!("{}", extraction.stream.plain_text());
/// ```
pub fn extract_content(data: &[u8]) -> Result<Extraction> {
    extract_content_with_options(data, &ExtractOptions::default())
}

/// Extract structured content with custom options.
pub fn extract_content_with_options(data: &[u8], options: &ExtractOptions) -> Result<Extraction> {
    ExtractionController::new(options.clone()).run(data)
}

/// Extract structured content from a PDF file.
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    let data = std::fs::read(path)?;
    extract_content(&data)
}

/// Options for a full conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Geometry extraction and classification
    pub extract: ExtractOptions,
    /// Output document construction
    pub build: BuildOptions,
    /// Image retrieval
    pub locator: LocatorOptions,
}

impl ConvertOptions {
    /// Create convert options with defaults.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a full conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Serialized output document
    pub bytes: Vec<u8>,
    /// Strategy that produced the content
    pub mode: ExtractionMode,
    /// Quality note for degraded conversions
    pub disclaimer: Option<&'static str>,
    /// Content statistics
    pub stats: ContentStats,
    /// Number of images embedded in the output
    pub images_embedded: usize,
}

/// Convert PDF bytes into a serialized output document.
///
/// Runs extraction, image retrieval, document building and serialization in
/// order. Fatal errors abort before anything is built, so no partial output
/// is ever produced.
pub fn convert(
    data: &[u8],
    options: &ConvertOptions,
    renderer: Arc<dyn ImageRenderer>,
    serializer: &dyn DocumentSerializer,
) -> Result<Conversion> {
    let extraction = extract_content_with_options(data, &options.extract)?;
    finish(extraction, options, renderer, serializer)
}

fn finish(
    extraction: Extraction,
    options: &ConvertOptions,
    renderer: Arc<dyn ImageRenderer>,
    serializer: &dyn DocumentSerializer,
) -> Result<Conversion> {
    let images = ImageLocator::with_options(renderer, options.locator.clone()).locate(&extraction.stream);
    let doc = DocumentBuilder::new(options.build.clone()).build(&extraction.stream, &images);
    let bytes = serializer.serialize(&doc)?;

    Ok(Conversion {
        bytes,
        disclaimer: extraction.disclaimer(),
        stats: extraction.stream.stats(),
        images_embedded: doc.images().count(),
        mode: extraction.mode,
    })
}

/// Builder for extracting and converting PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{Converter, JsonSerializer};
///
/// let data = std::fs::read("document.pdf")?;
/// let conversion = Converter::new()
///     .sequential()
///     .with_max_image_width(480)
///     .convert_embedded(&data, &JsonSerializer::default())?;
/// std::fs::write("document.json", conversion.bytes)?;
/// # Ok::<(), pdfstruct::Error>(())
/// ```
pub struct Converter {
    options: ConvertOptions,
    rich: bool,
}

impl Converter {
    /// Create a new converter.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            rich: true,
        }
    }

    /// Extract pages in parallel.
    pub fn parallel(mut self) -> Self {
        self.options.extract = self.options.extract.with_parallel(true);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options.extract = self.options.extract.sequential();
        self
    }

    /// Set classification thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.options.extract = self.options.extract.with_thresholds(thresholds);
        self
    }

    /// Set the margin reference for list indentation.
    pub fn with_margin_reference(mut self, reference: MarginReference) -> Self {
        self.options.extract = self.options.extract.with_margin_reference(reference);
        self
    }

    /// Set the maximum embedded image width in pixels.
    pub fn with_max_image_width(mut self, width: u32) -> Self {
        self.options.build = self.options.build.with_max_image_width(width);
        self
    }

    /// Skip missing images instead of emitting a placeholder.
    pub fn without_image_placeholder(mut self) -> Self {
        self.options.build = self.options.build.without_placeholder();
        self
    }

    /// Set the per-page image retrieval timeout.
    pub fn with_image_timeout(mut self, timeout: Duration) -> Self {
        self.options.locator = self.options.locator.with_timeout(timeout);
        self
    }

    /// Use plain text extraction only.
    pub fn text_only(mut self) -> Self {
        self.rich = false;
        self
    }

    /// Current options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    fn controller(&self) -> ExtractionController {
        let rich = if self.rich {
            RichExtractor::new(self.options.extract.clone())
        } else {
            RichExtractor::disabled(self.options.extract.clone())
        };
        ExtractionController::with_strategies(Box::new(rich), Box::new(DegradedExtractor::new()))
    }

    /// Extract structured content.
    pub fn extract(&self, data: &[u8]) -> Result<Extraction> {
        self.controller().run(data)
    }

    /// Convert with a caller-supplied image renderer.
    pub fn convert(
        &self,
        data: &[u8],
        renderer: Arc<dyn ImageRenderer>,
        serializer: &dyn DocumentSerializer,
    ) -> Result<Conversion> {
        let extraction = self.extract(data)?;
        finish(extraction, &self.options, renderer, serializer)
    }

    /// Convert, embedding images stored in the PDF itself.
    pub fn convert_embedded(&self, data: &[u8], serializer: &dyn DocumentSerializer) -> Result<Conversion> {
        let extraction = self.extract(data)?;
        let renderer = Arc::new(EmbeddedImageRenderer::from_bytes(data, &self.options.extract)?);
        finish(extraction, &self.options, renderer, serializer)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_builder() {
        let converter = Converter::new()
            .parallel()
            .with_max_image_width(300)
            .with_image_timeout(Duration::from_millis(250))
            .without_image_placeholder();

        let options = converter.options();
        assert!(options.extract.parallel);
        assert_eq!(options.build.max_image_width, 300);
        assert!(options.build.placeholder_text.is_none());
        assert_eq!(options.locator.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_converter_chained_extract_options() {
        let thresholds = Thresholds {
            indent: 30.0,
            ..Thresholds::default()
        };
        let converter = Converter::new()
            .parallel()
            .sequential()
            .with_thresholds(thresholds)
            .with_margin_reference(MarginReference::LeftmostBlock);

        let options = converter.options();
        assert!(!options.extract.parallel);
        assert_eq!(options.extract.thresholds.indent, 30.0);
        assert_eq!(options.extract.margin_reference, MarginReference::LeftmostBlock);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_extract_empty_data() {
        let result = extract_content(&[]);
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[test]
    fn test_extract_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(extract_content(&data).is_err());
    }

    #[test]
    fn test_extract_header_only() {
        // A header alone is not a loadable document.
        let result = extract_content(b"%PDF-1.7\n%test");
        assert!(result.err().is_some_and(|e| e.is_fatal()));
    }

    #[test]
    fn test_converter_text_only_invalid_bytes() {
        let result = Converter::new().text_only().extract(b"not a pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_file_missing() {
        let result = extract_file("/nonexistent/input.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
