//! Output document model, builder and serializers.

mod build;
mod document;
mod serialize;

pub use build::{fit_width, BuildOptions, DocumentBuilder, IMAGE_PLACEHOLDER};
pub use document::{
    BodyElement, EmbeddedImage, ListInfo, ListStyle, PageMargins, Paragraph, ParagraphStyle, Run,
    RunProperties, Spacing, WordDocument,
};
pub use serialize::{DocumentSerializer, JsonFormat, JsonSerializer};
