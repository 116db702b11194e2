//! Layout analysis: recovering document structure from page geometry.
//!
//! The median font size is measured once per document ([`DocumentMetrics`]),
//! then every line is classified against it ([`LineClassifier`]), split into
//! styled runs ([`segment_runs`]) and assembled into an ordered
//! [`ContentStream`](crate::model::ContentStream) ([`ContentAssembler`]).

mod assemble;
mod line;
mod runs;
pub mod style;

pub use assemble::{merge_paragraphs, ContentAssembler};
pub use line::{LineClassifier, LineKind, MarkerStripper, BULLET_GLYPHS};
pub use runs::{join_runs, segment_runs};
pub use style::{is_bold, is_italic, median_font_size, DocumentMetrics, DEFAULT_FONT_SIZE};
