//! Data model for the extraction pipeline.
//!
//! The geometry types hold what the extractor captures from each page (positioned
//! characters grouped into lines and blocks). The content types hold what analysis
//! produces from it: a flat, ordered stream of classified items that is the
//! only input of the document builder.

mod content;
mod geometry;

pub use content::{runs_text, ContentItem, ContentKind, ContentStats, ContentStream, TextRun};
pub use geometry::{BBox, Block, Character, FontStyle, ImageRef, Line, PageExtraction};
