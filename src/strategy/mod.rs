//! Extraction strategies and the controller that chooses between them.
//!
//! The rich strategy recovers headings, lists and inline styling from page
//! geometry. When it is unavailable or fails on a document, the controller
//! falls back to a degraded per-line text walk and reports the downgrade so
//! the caller can show a quality disclaimer.

mod controller;
mod degraded;
mod rich;

pub use controller::{ControllerState, DegradeReason, Extraction, ExtractionController, ExtractionMode};
pub use degraded::DegradedExtractor;
pub use rich::RichExtractor;

use crate::error::Result;
use crate::model::ContentStream;

/// A way of turning PDF bytes into a content stream.
pub trait ExtractionStrategy: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Whether the strategy can run in this environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Extract the document's content.
    fn extract(&self, data: &[u8]) -> Result<ContentStream>;
}
