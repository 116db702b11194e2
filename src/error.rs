//! Error types for pdfstruct.

use std::io;
use thiserror::Error;

/// Result type alias for pdfstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and rebuilding a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input bytes cannot be loaded as a PDF document.
    #[error("Failed to load document: {0}")]
    Load(String),

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error reading PDF structure after the document was loaded.
    #[error("PDF parsing error: {0}")]
    Pdf(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The document loaded but contains no text on any page.
    #[error("Document contains no extractable text; it may be a scanned image that needs OCR")]
    NoExtractableText,

    /// The rich layout analyzer could not be initialized.
    #[error("Rich extraction unavailable: {0}")]
    RichExtractionUnavailable(String),

    /// The rich layout analyzer failed part-way through the document.
    #[error("Rich extraction failed: {0}")]
    RichExtractionFailure(String),

    /// A single embedded image could not be retrieved.
    #[error("Image extraction error on page {page}, block {block}: {reason}")]
    ImageExtraction {
        /// Page number (1-indexed)
        page: u32,
        /// Block index within the page
        block: usize,
        /// What went wrong
        reason: String,
    },

    /// Image retrieval for a page did not finish in time.
    #[error("Image retrieval timed out on page {page}")]
    ImageTimeout {
        /// Page number (1-indexed)
        page: u32,
    },

    /// The serializer collaborator failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error must abort the conversion instead of triggering
    /// the degraded extractor.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Load(_)
                | Error::UnsupportedVersion(_)
                | Error::Encrypted
                | Error::NoExtractableText
        )
    }
}
