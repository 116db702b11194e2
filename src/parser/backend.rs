//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from the geometry extraction logic.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Font information returned by the backend.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// First character code covered by `widths`.
    pub first_char: u32,
    /// Glyph widths in thousandths of an em, indexed from `first_char`.
    pub widths: Vec<f32>,
}

impl BackendFontInfo {
    /// Advance of a single-byte character code in em units, if declared.
    pub fn glyph_width(&self, code: u8) -> Option<f32> {
        let index = (code as u32).checked_sub(self.first_char)? as usize;
        self.widths
            .get(index)
            .copied()
            .filter(|w| *w > 0.0)
            .map(|w| w / 1000.0)
    }
}

/// Image XObject information returned by the backend.
#[derive(Debug, Clone, Default)]
pub struct BackendImageInfo {
    /// XObject resource name (key in the page's XObject dictionary).
    pub name: Vec<u8>,
    /// Width in pixels
    pub width: Option<u32>,
    /// Height in pixels
    pub height: Option<u32>,
    /// Stream filter (e.g., "DCTDecode")
    pub filter: String,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(get_number_from_value)
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font and image info, content
/// stream decoding and text decoding without exposing any concrete PDF
/// library types. Implementations must be shareable across threads so pages
/// can be extracted in parallel.
pub trait PdfBackend: Send + Sync {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Page box `[x0, y0, x1, y1]` in PDF user space.
    fn page_bounds(&self, page: PageId) -> Result<[f32; 4]>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return image XObjects available to a page.
    fn page_images(&self, page: PageId) -> Result<Vec<BackendImageInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Plain text of a page without positions, for degraded extraction.
    fn page_text(&self, page_number: u32) -> Result<String>;

    /// Encoded bytes of an image XObject on a page.
    fn image_data(&self, page: PageId, name: &[u8]) -> Result<(BackendImageInfo, Vec<u8>)>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    ///
    /// Any failure here is a load error: the bytes are not a usable PDF.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Load(e.to_string()),
        })?;
        if doc.get_pages().is_empty() {
            return Err(Error::Load("document has no pages".to_string()));
        }
        Ok(Self { doc })
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Resolve a reference, returning direct objects unchanged.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(r) => self.doc.get_object(*r).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Look up a page attribute, following `/Parent` for inherited keys.
    fn inherited<'a>(&'a self, page: PageId, key: &[u8]) -> Option<&'a Object> {
        let mut dict = self.doc.get_dictionary(page).ok()?;
        // Page trees are shallow; the bound only guards against cycles.
        for _ in 0..32 {
            if let Ok(value) = dict.get(key) {
                return self.resolve(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn xobjects(&self, page: PageId) -> Option<&Dictionary> {
        let resources = self.resolve_dict(self.inherited(page, b"Resources")?)?;
        self.resolve_dict(resources.get(b"XObject").ok()?)
    }

    fn image_info(&self, name: &[u8], dict: &Dictionary) -> Option<BackendImageInfo> {
        match dict.get(b"Subtype").ok().and_then(|s| s.as_name().ok()) {
            Some(b"Image") => {}
            _ => return None,
        }

        let dimension = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|v| v.as_i64().ok())
                .and_then(|v| u32::try_from(v).ok())
        };

        let filter = match dict.get(b"Filter").ok().and_then(|f| self.resolve(f)) {
            Some(Object::Name(n)) => String::from_utf8_lossy(n).to_string(),
            Some(Object::Array(arr)) => arr
                .last()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        };

        Some(BackendImageInfo {
            name: name.to_vec(),
            width: dimension(b"Width"),
            height: dimension(b"Height"),
            filter,
        })
    }

    fn font_widths(&self, font: &Dictionary) -> (u32, Vec<f32>) {
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|v| v.as_i64().ok())
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);

        let widths = match font.get(b"Widths").ok().and_then(|w| self.resolve(w)) {
            Some(Object::Array(arr)) => arr
                .iter()
                .map(|o| get_number(o).unwrap_or(0.0))
                .collect(),
            _ => Vec::new(),
        };

        (first_char, widths)
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_bounds(&self, page: PageId) -> Result<[f32; 4]> {
        let media_box = self
            .inherited(page, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .filter(|arr| arr.len() >= 4);

        match media_box {
            Some(arr) => {
                let v: Vec<f32> = arr.iter().take(4).map(|o| get_number(o).unwrap_or(0.0)).collect();
                Ok([
                    v[0].min(v[2]),
                    v[1].min(v[3]),
                    v[0].max(v[2]),
                    v[1].max(v[3]),
                ])
            }
            // US Letter
            None => Ok([0.0, 0.0, 612.0, 792.0]),
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::Pdf(e.to_string()))?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let (first_char, widths) = self.font_widths(font_dict);
            result.push(BackendFontInfo {
                name: name.clone(),
                base_font,
                first_char,
                widths,
            });
        }
        Ok(result)
    }

    fn page_images(&self, page: PageId) -> Result<Vec<BackendImageInfo>> {
        let Some(xobjects) = self.xobjects(page) else {
            return Ok(Vec::new());
        };

        Ok(xobjects
            .iter()
            .filter_map(|(name, obj)| {
                let dict = self.resolve_dict(obj)?;
                self.image_info(name, dict)
            })
            .collect())
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::Pdf(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without /Contents is blank.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                // Unfiltered streams fail to "decompress"; their content is already plain.
                Ok(Object::Stream(s)) => Ok(s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::Pdf("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::Pdf("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::Pdf(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn page_text(&self, page_number: u32) -> Result<String> {
        self.doc
            .extract_text(&[page_number])
            .map_err(|e| Error::Pdf(format!("Page {}: {}", page_number, e)))
    }

    fn image_data(&self, page: PageId, name: &[u8]) -> Result<(BackendImageInfo, Vec<u8>)> {
        let xobjects = self
            .xobjects(page)
            .ok_or_else(|| Error::Pdf("page has no XObject resources".to_string()))?;
        let obj = xobjects
            .get(name)
            .map_err(|_| Error::Pdf(format!("XObject {} not found", String::from_utf8_lossy(name))))?;

        match self.resolve(obj) {
            Some(Object::Stream(stream)) => {
                let info = self
                    .image_info(name, &stream.dict)
                    .ok_or_else(|| Error::Pdf("XObject is not an image".to_string()))?;
                Ok((info, stream.content.clone()))
            }
            _ => Err(Error::Pdf("Invalid image XObject".to_string())),
        }
    }
}

impl LopdfBackend {
    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in arr {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        }
        content
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}
