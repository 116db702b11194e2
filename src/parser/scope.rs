//! Scoped ownership of document and per-page parsing resources.
//!
//! A [`DocumentScope`] owns the backend for as long as the extractor lives.
//! A [`PageScope`] owns everything decoded for a single page (operations,
//! fonts, image resources) and is dropped as soon as that page's geometry has
//! been captured, so memory stays proportional to one page at a time.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

use super::backend::{BackendFontInfo, BackendImageInfo, ContentOp, PageId, PdfBackend};

/// Owns an open document for the lifetime of an extraction.
pub struct DocumentScope<B: PdfBackend> {
    backend: B,
    pages: BTreeMap<u32, PageId>,
}

impl<B: PdfBackend> DocumentScope<B> {
    /// Take ownership of an opened backend.
    pub fn open(backend: B) -> Self {
        let pages = backend.pages();
        log::trace!("Opened document scope ({} pages)", pages.len());
        Self { backend, pages }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Page numbers in ascending order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    /// Resolve a 1-based page number.
    pub fn page_id(&self, page_number: u32) -> Result<PageId> {
        self.pages
            .get(&page_number)
            .copied()
            .ok_or(Error::PageOutOfRange(page_number, self.page_count()))
    }
}

impl<B: PdfBackend> Drop for DocumentScope<B> {
    fn drop(&mut self) {
        log::trace!("Released document scope ({} pages)", self.pages.len());
    }
}

/// Resources decoded for one page.
pub struct PageScope<'d, B: PdfBackend> {
    document: &'d DocumentScope<B>,
    page_number: u32,
    page_id: PageId,
    bounds: [f32; 4],
    operations: Vec<ContentOp>,
    fonts: HashMap<Vec<u8>, BackendFontInfo>,
    images: HashMap<Vec<u8>, BackendImageInfo>,
}

impl<'d, B: PdfBackend> PageScope<'d, B> {
    /// Decode a page's content stream and resources.
    pub fn acquire(document: &'d DocumentScope<B>, page_number: u32) -> Result<Self> {
        let backend = document.backend();
        let page_id = document.page_id(page_number)?;
        let bounds = backend.page_bounds(page_id)?;

        let content = backend.page_content(page_id)?;
        let operations = if content.is_empty() {
            Vec::new()
        } else {
            backend.decode_content(&content)?
        };

        // Missing resources only cost fidelity, never the page.
        let fonts = backend
            .page_fonts(page_id)
            .unwrap_or_else(|e| {
                log::warn!("Page {}: font resources unavailable: {}", page_number, e);
                Vec::new()
            })
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();
        let images = backend
            .page_images(page_id)
            .unwrap_or_else(|e| {
                log::warn!("Page {}: image resources unavailable: {}", page_number, e);
                Vec::new()
            })
            .into_iter()
            .map(|i| (i.name.clone(), i))
            .collect();

        Ok(Self {
            document,
            page_number,
            page_id,
            bounds,
            operations,
            fonts,
            images,
        })
    }

    /// 1-based page number.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Page box `[x0, y0, x1, y1]` in PDF user space.
    pub fn bounds(&self) -> [f32; 4] {
        self.bounds
    }

    /// Decoded content stream operations.
    pub fn operations(&self) -> &[ContentOp] {
        &self.operations
    }

    /// Font registered under a resource name.
    pub fn font(&self, resource: &[u8]) -> Option<&BackendFontInfo> {
        self.fonts.get(resource)
    }

    /// Image XObject registered under a resource name.
    pub fn image(&self, resource: &[u8]) -> Option<&BackendImageInfo> {
        self.images.get(resource)
    }

    /// Decode shown text bytes with the page font's encoding.
    pub fn decode_text(&self, font_resource: &[u8], bytes: &[u8]) -> String {
        self.document
            .backend()
            .decode_text(self.page_id, font_resource, bytes)
    }
}

impl<B: PdfBackend> Drop for PageScope<'_, B> {
    fn drop(&mut self) {
        log::trace!(
            "Released page {} scope ({} operations, {} fonts, {} images)",
            self.page_number,
            self.operations.len(),
            self.fonts.len(),
            self.images.len()
        );
    }
}
