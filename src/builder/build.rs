//! Mapping of a content stream onto a [`WordDocument`].

use crate::analysis::MarkerStripper;
use crate::images::{ImageData, ImageMap};
use crate::model::{runs_text, ContentItem, ContentKind, ContentStream, TextRun};

use super::document::{BodyElement, EmbeddedImage, ListInfo, Paragraph, Run, Spacing, WordDocument};

const HEADING_SPACING: Spacing = Spacing { before: 240, after: 120 };
const PARAGRAPH_SPACING: Spacing = Spacing { before: 0, after: 200 };
const LIST_SPACING: Spacing = Spacing { before: 0, after: 100 };
const IMAGE_SPACING: Spacing = Spacing { before: 120, after: 120 };
const PLACEHOLDER_SPACING: Spacing = Spacing { before: 0, after: 120 };

/// Default text emitted in place of an image that could not be retrieved.
pub const IMAGE_PLACEHOLDER: &str = "[Image could not be embedded]";

/// Options for building the output document.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Widest an embedded image may be, in pixels
    pub max_image_width: u32,

    /// Text emitted for a missing image; `None` skips it silently
    pub placeholder_text: Option<String>,
}

impl BuildOptions {
    /// Create build options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum image width.
    pub fn with_max_image_width(mut self, width: u32) -> Self {
        self.max_image_width = width;
        self
    }

    /// Set the placeholder for missing images.
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder_text = Some(text.into());
        self
    }

    /// Skip missing images without a placeholder.
    pub fn without_placeholder(mut self) -> Self {
        self.placeholder_text = None;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_image_width: 600,
            placeholder_text: Some(IMAGE_PLACEHOLDER.to_string()),
        }
    }
}

/// Builds a [`WordDocument`] from a content stream and its located images.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    options: BuildOptions,
    markers: MarkerStripper,
}

impl DocumentBuilder {
    /// Create a builder.
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            markers: MarkerStripper::new(),
        }
    }

    /// Map every item of the stream, in order.
    pub fn build(&self, stream: &ContentStream, images: &ImageMap) -> WordDocument {
        let mut doc = WordDocument::new();
        for item in stream {
            if let Some(element) = self.element(item, images) {
                doc.push(element);
            }
        }
        log::debug!("Built document with {} body elements", doc.body.len());
        doc
    }

    fn element(&self, item: &ContentItem, images: &ImageMap) -> Option<BodyElement> {
        let paragraph = match &item.kind {
            ContentKind::Heading { level, text } => {
                Paragraph::heading(text.as_str(), *level).with_spacing(HEADING_SPACING)
            }
            ContentKind::Paragraph { runs } => {
                styled_paragraph(runs.iter()).with_spacing(PARAGRAPH_SPACING)
            }
            ContentKind::ListItem { ordered, runs } => {
                let runs = self.strip_marker(runs, *ordered);
                let mut p = styled_paragraph(runs.iter()).with_spacing(LIST_SPACING);
                p.style.list_info = Some(if *ordered {
                    ListInfo::numbered(0)
                } else {
                    ListInfo::bullet(0)
                });
                p
            }
            ContentKind::Image { sequence_index, .. } => {
                if let Some(data) = images.get(sequence_index) {
                    return Some(BodyElement::Image(self.embed(data)));
                }
                let text = self.options.placeholder_text.as_ref()?;
                Paragraph::with_text(text.as_str()).with_spacing(PLACEHOLDER_SPACING)
            }
        };
        Some(BodyElement::Paragraph(paragraph))
    }

    /// Remove the visible list marker, which may span several runs.
    fn strip_marker(&self, runs: &[TextRun], ordered: bool) -> Vec<TextRun> {
        let mut remaining = self.markers.marker_len(&runs_text(runs), ordered);
        let mut stripped = Vec::with_capacity(runs.len());

        for run in runs {
            if remaining >= run.text.len() {
                remaining -= run.text.len();
                continue;
            }
            let mut run = run.clone();
            run.text.drain(..remaining);
            remaining = 0;
            stripped.push(run);
        }

        stripped
    }

    fn embed(&self, data: &ImageData) -> EmbeddedImage {
        let (width, height) = fit_width(data.width, data.height, self.options.max_image_width);
        EmbeddedImage {
            data: data.bytes.clone(),
            mime_type: data.mime_type.clone(),
            width,
            height,
            spacing: IMAGE_SPACING,
        }
    }
}

fn styled_paragraph<'a>(runs: impl Iterator<Item = &'a TextRun>) -> Paragraph {
    let mut p = Paragraph::new();
    for run in runs {
        p.add_run(Run::from_text_run(run));
    }
    p
}

/// Scale `(width, height)` down to at most `max_width`, preserving aspect ratio.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scale = max_width as f64 / width as f64;
    (max_width, (height as f64 * scale).round() as u32)
}
