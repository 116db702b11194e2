//! PDF parsing module.

pub mod backend;
mod geometry;
mod options;
mod scope;

pub use backend::{LopdfBackend, PdfBackend};
pub use geometry::GeometryExtractor;
pub use options::{ErrorMode, ExtractOptions, MarginReference, Thresholds};
pub use scope::{DocumentScope, PageScope};
