//! Image retrieval for the image items of a content stream.
//!
//! Rendering is delegated to an [`ImageRenderer`]. The [`ImageLocator`] asks
//! it for every image in the stream, one worker thread per page, and waits a
//! bounded time for each page. A failed or late image is logged and left out
//! of the resulting [`ImageMap`]; it never fails the conversion.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use image::ImageReader;

use crate::error::{Error, Result};
use crate::model::{Block, ContentKind, ContentStream};
use crate::parser::{ExtractOptions, GeometryExtractor, LopdfBackend, PdfBackend};

/// Images keyed by their document-wide sequence index.
pub type ImageMap = HashMap<usize, ImageData>;

/// Produces the encoded bytes of an image placed on a page.
pub trait ImageRenderer: Send + Sync {
    /// Encoded image bytes for the image block at `block_index` on `page_number`.
    fn render(&self, page_number: u32, block_index: usize) -> Result<Vec<u8>>;
}

/// A retrieved image with probed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Encoded bytes
    pub bytes: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// MIME type (e.g., "image/png")
    pub mime_type: String,
}

impl ImageData {
    /// Probe encoded bytes for their format and dimensions.
    pub fn probe(bytes: Vec<u8>) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| Error::Other("unrecognized image format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            mime_type: format.to_mime_type().to_string(),
            width,
            height,
            bytes,
        })
    }
}

/// Options for image retrieval.
#[derive(Debug, Clone)]
pub struct LocatorOptions {
    /// How long to wait for one page's images
    pub timeout: Duration,
}

impl LocatorOptions {
    /// Create locator options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-page timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Collects the images referenced by a content stream.
pub struct ImageLocator {
    renderer: Arc<dyn ImageRenderer>,
    options: LocatorOptions,
}

impl ImageLocator {
    /// Create a locator over a renderer with default options.
    pub fn new(renderer: Arc<dyn ImageRenderer>) -> Self {
        Self::with_options(renderer, LocatorOptions::default())
    }

    /// Create a locator with explicit options.
    pub fn with_options(renderer: Arc<dyn ImageRenderer>, options: LocatorOptions) -> Self {
        Self { renderer, options }
    }

    /// Retrieve every image in the stream.
    ///
    /// Entries are present only for images that were rendered and probed
    /// successfully.
    pub fn locate(&self, stream: &ContentStream) -> ImageMap {
        let mut by_page: BTreeMap<u32, Vec<(usize, usize)>> = BTreeMap::new();
        for item in stream {
            if let ContentKind::Image {
                page_number,
                block_index,
                sequence_index,
            } = item.kind
            {
                by_page
                    .entry(page_number)
                    .or_default()
                    .push((block_index, sequence_index));
            }
        }

        let mut images = ImageMap::new();
        for (page_number, jobs) in by_page {
            self.locate_page(page_number, jobs, &mut images);
        }

        log::debug!("Located {} of {} images", images.len(), stream.stats().images);
        images
    }

    fn locate_page(&self, page_number: u32, jobs: Vec<(usize, usize)>, images: &mut ImageMap) {
        let expected = jobs.len();
        let (tx, rx) = crossbeam_channel::unbounded();
        let renderer = Arc::clone(&self.renderer);

        // The worker is detached; after a timeout its remaining sends fail and it stops.
        std::thread::spawn(move || {
            for (block_index, sequence_index) in jobs {
                let result = renderer.render(page_number, block_index);
                if tx.send((block_index, sequence_index, result)).is_err() {
                    break;
                }
            }
        });

        let deadline = Instant::now() + self.options.timeout;
        for _ in 0..expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let (block, sequence_index, result) = match rx.recv_timeout(remaining) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("{}", Error::ImageTimeout { page: page_number });
                    return;
                }
                Err(RecvTimeoutError::Disconnected) => return,
            };

            match result.and_then(ImageData::probe) {
                Ok(data) => {
                    images.insert(sequence_index, data);
                }
                Err(e) => {
                    let error = Error::ImageExtraction {
                        page: page_number,
                        block,
                        reason: e.to_string(),
                    };
                    log::warn!("{}", error);
                }
            }
        }
    }
}

/// Renders images embedded in the PDF itself by returning their encoded bytes.
///
/// Only DCT (JPEG) images can be passed through unchanged; other encodings
/// fail with [`Error::ImageExtraction`].
pub struct EmbeddedImageRenderer {
    extractor: GeometryExtractor<LopdfBackend>,
}

impl EmbeddedImageRenderer {
    /// Open a renderer over the given PDF bytes.
    pub fn from_bytes(data: &[u8], options: &ExtractOptions) -> Result<Self> {
        Ok(Self {
            extractor: GeometryExtractor::from_bytes(data, options)?,
        })
    }
}

impl ImageRenderer for EmbeddedImageRenderer {
    fn render(&self, page_number: u32, block_index: usize) -> Result<Vec<u8>> {
        let failure = |reason: String| Error::ImageExtraction {
            page: page_number,
            block: block_index,
            reason,
        };

        let page = self.extractor.extract_page(page_number)?;
        let name = match page.blocks.get(block_index) {
            Some(Block::Image { image, .. }) => image.name.clone(),
            _ => return Err(failure("not an image block".to_string())),
        };

        let page_id = self.extractor.page_id(page_number)?;
        let (info, bytes) = self
            .extractor
            .backend()
            .image_data(page_id, name.as_bytes())?;

        match info.filter.as_str() {
            "DCTDecode" => Ok(bytes),
            "" => Err(failure("unencoded image samples".to_string())),
            other => Err(failure(format!("unsupported image encoding {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentItem, TextRun};
    use image::{ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct StubRenderer;

    impl ImageRenderer for StubRenderer {
        fn render(&self, page_number: u32, block_index: usize) -> Result<Vec<u8>> {
            match (page_number, block_index) {
                (1, 0) => Ok(png(4, 2)),
                (1, 3) => Ok(b"not an image".to_vec()),
                (2, 1) => Ok(png(8, 8)),
                _ => Err(Error::Other("render failed".to_string())),
            }
        }
    }

    struct SlowRenderer;

    impl ImageRenderer for SlowRenderer {
        fn render(&self, _page_number: u32, _block_index: usize) -> Result<Vec<u8>> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(png(1, 1))
        }
    }

    fn image_item(page_number: u32, block_index: usize, sequence_index: usize, y: f32) -> ContentItem {
        ContentItem::new(
            ContentKind::Image {
                page_number,
                block_index,
                sequence_index,
            },
            page_number,
            y,
            y + 50.0,
        )
    }

    fn stream() -> ContentStream {
        ContentStream::from_items(vec![
            image_item(1, 0, 0, 100.0),
            image_item(1, 2, 1, 200.0),
            ContentItem::new(
                ContentKind::Paragraph {
                    runs: vec![TextRun::plain("caption", 12.0)],
                },
                1,
                260.0,
                272.0,
            ),
            image_item(1, 3, 2, 300.0),
            image_item(2, 1, 3, 100.0),
        ])
    }

    #[test]
    fn test_probe_png() {
        let data = ImageData::probe(png(4, 2)).unwrap();
        assert_eq!((data.width, data.height), (4, 2));
        assert_eq!(data.mime_type, "image/png");
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(ImageData::probe(b"garbage".to_vec()).is_err());
    }

    #[test]
    fn test_failures_only_omit_their_index() {
        let locator = ImageLocator::new(Arc::new(StubRenderer));
        let images = locator.locate(&stream());

        let mut keys: Vec<usize> = images.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![0, 3]);
        assert_eq!(images[&3].width, 8);
    }

    #[test]
    fn test_timeout_omits_page() {
        let locator = ImageLocator::with_options(
            Arc::new(SlowRenderer),
            LocatorOptions::new().with_timeout(Duration::from_millis(20)),
        );
        let single = ContentStream::from_items(vec![image_item(1, 0, 0, 100.0)]);
        assert!(locator.locate(&single).is_empty());
    }

    #[test]
    fn test_no_images_no_work() {
        let locator = ImageLocator::new(Arc::new(StubRenderer));
        assert!(locator.locate(&ContentStream::new()).is_empty());
    }
}
