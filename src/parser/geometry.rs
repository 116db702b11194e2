//! Character geometry extraction from PDF content streams.
//!
//! Each page's content stream is walked once. Every shown glyph becomes a
//! [`Character`] in top-down page space; glyphs are then grouped into lines by
//! baseline and lines into text blocks by spacing, size and indentation.
//! Image XObjects painted with `Do` become image blocks.

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{BBox, Block, Character, ImageRef, Line, PageExtraction};

use super::backend::{
    get_number_from_value, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
};
use super::options::{ErrorMode, ExtractOptions};
use super::scope::{DocumentScope, PageScope};

/// TJ adjustment (thousandths of an em) treated as a word break.
const SPACE_ADJUSTMENT: f32 = 200.0;

/// Advance used when a font declares no width for a glyph, in ems.
const DEFAULT_GLYPH_WIDTH: f32 = 0.5;

/// Horizontal gap between glyphs, as a fraction of font size, that reads as a space.
const WORD_GAP_FACTOR: f32 = 0.25;

/// Extracts positioned characters and images from every page of a document.
pub struct GeometryExtractor<B: PdfBackend = LopdfBackend> {
    document: DocumentScope<B>,
    options: ExtractOptions,
}

impl GeometryExtractor<LopdfBackend> {
    /// Open a PDF from bytes.
    ///
    /// Fails with [`Error::Load`](crate::Error::Load) if the bytes are not a
    /// readable PDF.
    pub fn from_bytes(data: &[u8], options: &ExtractOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data)?;
        log::debug!("Loaded PDF {} ({} pages)", backend.version(), backend.pages().len());
        Ok(Self::with_backend(backend, options.clone()))
    }
}

impl<B: PdfBackend> GeometryExtractor<B> {
    /// Create an extractor over an already opened backend.
    pub fn with_backend(backend: B, options: ExtractOptions) -> Self {
        Self {
            document: DocumentScope::open(backend),
            options,
        }
    }

    /// Number of pages, available before any page is extracted.
    pub fn page_count(&self) -> u32 {
        self.document.page_count()
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        self.document.backend()
    }

    /// Backend identifier of a 1-based page.
    pub fn page_id(&self, page_number: u32) -> Result<PageId> {
        self.document.page_id(page_number)
    }

    /// Extract one page (1-based).
    pub fn extract_page(&self, page_number: u32) -> Result<PageExtraction> {
        let scope = PageScope::acquire(&self.document, page_number)?;
        let extraction = PageWalker::new(&scope).walk();
        log::debug!(
            "Page {}: {} blocks, {} characters",
            page_number,
            extraction.blocks.len(),
            extraction.text_char_count()
        );
        Ok(extraction)
    }

    /// Extract every page, in page order.
    pub fn extract_all(&self) -> Result<Vec<PageExtraction>> {
        let page_numbers = self.document.page_numbers();

        let mut pages = if self.options.parallel {
            page_numbers
                .par_iter()
                .map(|&n| self.extract_page_checked(n))
                .collect::<Result<Vec<_>>>()?
        } else {
            page_numbers
                .iter()
                .map(|&n| self.extract_page_checked(n))
                .collect::<Result<Vec<_>>>()?
        };

        pages.sort_by_key(|p| p.page_number);
        Ok(pages)
    }

    /// Extract a page, applying the configured error mode.
    fn extract_page_checked(&self, page_number: u32) -> Result<PageExtraction> {
        match self.extract_page(page_number) {
            Ok(page) => Ok(page),
            Err(e) if self.options.error_mode == ErrorMode::Lenient && !e.is_fatal() => {
                log::warn!("Page {} skipped: {}", page_number, e);
                Ok(PageExtraction::empty(page_number))
            }
            Err(e) => Err(e),
        }
    }
}

/// Affine transformation `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(op: &ContentOp) -> Option<Matrix> {
        Some(Matrix {
            a: op.number(0)?,
            b: op.number(1)?,
            c: op.number(2)?,
            d: op.number(3)?,
            e: op.number(4)?,
            f: op.number(5)?,
        })
    }

    fn translation(tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: tx,
            f: ty,
            ..Matrix::IDENTITY
        }
    }

    /// `self × other`
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state parameters; saved and restored with the graphics state.
#[derive(Debug, Clone)]
struct TextState {
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
        }
    }
}

/// Walks one page's operations, collecting glyphs and image placements.
struct PageWalker<'s, 'd, B: PdfBackend> {
    page: &'s PageScope<'d, B>,
    /// Top of the page box; device y is flipped against it.
    page_top: f32,
    ctm: Matrix,
    state: TextState,
    saved: Vec<(Matrix, TextState)>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text: bool,
    chars: Vec<Character>,
    images: Vec<Block>,
}

impl<'s, 'd, B: PdfBackend> PageWalker<'s, 'd, B> {
    fn new(page: &'s PageScope<'d, B>) -> Self {
        Self {
            page,
            page_top: page.bounds()[3],
            ctm: Matrix::IDENTITY,
            state: TextState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text: false,
            chars: Vec::new(),
            images: Vec::new(),
        }
    }

    fn walk(mut self) -> PageExtraction {
        let page = self.page;
        for op in page.operations() {
            self.apply(op);
        }

        let [x0, y0, x1, y1] = self.page.bounds();
        let bbox = BBox::new(x0, 0.0, x1, y1 - y0);

        let lines = group_into_lines(std::mem::take(&mut self.chars));
        let mut blocks = group_into_blocks(lines);
        blocks.append(&mut self.images);

        PageExtraction::new(self.page.page_number(), blocks, bbox)
    }

    fn apply(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            "q" => self.saved.push((self.ctm, self.state.clone())),
            "Q" => {
                if let Some((ctm, state)) = self.saved.pop() {
                    self.ctm = ctm;
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(op) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(resource)) = op.operands.first() {
                    self.state.font_name = self
                        .page
                        .font(resource)
                        .map(|f| f.base_font.clone())
                        .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                    self.state.font_resource = resource.clone();
                }
                if let Some(size) = op.number(1) {
                    self.state.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = op.number(0) {
                    self.state.leading = leading;
                }
            }
            "Tc" => {
                if let Some(spacing) = op.number(0) {
                    self.state.char_spacing = spacing;
                }
            }
            "Tw" => {
                if let Some(spacing) = op.number(0) {
                    self.state.word_spacing = spacing;
                }
            }
            "Tz" => {
                if let Some(scale) = op.number(0) {
                    self.state.horizontal_scaling = scale / 100.0;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.next_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.state.leading = -ty;
                    self.next_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(op) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(0.0, -self.state.leading),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show_text(bytes);
                }
            }
            "'" => {
                self.next_line(0.0, -self.state.leading);
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show_text(bytes);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (op.number(0), op.number(1)) {
                    self.state.word_spacing = aw;
                    self.state.char_spacing = ac;
                }
                self.next_line(0.0, -self.state.leading);
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    self.show_text(bytes);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            PdfValue::Str(bytes) => self.show_text(bytes),
                            other => {
                                if let Some(n) = get_number_from_value(other) {
                                    self.adjust(n);
                                }
                            }
                        }
                    }
                }
            }
            "Do" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.place_image(name);
                }
            }
            _ => {}
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// Move the pen along the baseline by `tx` text-space units.
    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
    }

    /// Apply a TJ positioning adjustment, inserting a space for large gaps.
    fn adjust(&mut self, amount: f32) {
        let tx = -amount / 1000.0 * self.state.font_size * self.state.horizontal_scaling;

        let breaks_word = -amount > SPACE_ADJUSTMENT
            && self
                .chars
                .last()
                .is_some_and(|c| !c.text.is_whitespace() && !is_spaceless_script_char(c.text));
        if breaks_word && self.in_text {
            let space = self.glyph(' ', tx);
            self.chars.push(space);
        }

        self.advance(tx);
    }

    fn show_text(&mut self, bytes: &[u8]) {
        if !self.in_text {
            return;
        }

        let page = self.page;
        let text = page.decode_text(&self.state.font_resource, bytes);
        let font = page.font(&self.state.font_resource);
        // Per-glyph widths only apply when each byte decoded to one character.
        let single_byte = text.chars().count() == bytes.len();

        for (i, ch) in text.chars().enumerate() {
            let code = if single_byte { bytes.get(i).copied() } else { None };
            let w0 = code
                .and_then(|b| font.and_then(|f| f.glyph_width(b)))
                .unwrap_or(DEFAULT_GLYPH_WIDTH);

            let mut tx = w0 * self.state.font_size + self.state.char_spacing;
            if code == Some(b' ') {
                tx += self.state.word_spacing;
            }
            tx *= self.state.horizontal_scaling;

            if !ch.is_control() {
                let glyph = self.glyph(ch, tx);
                self.chars.push(glyph);
            }
            self.advance(tx);
        }
    }

    /// A character at the current pen position spanning `advance` text units.
    fn glyph(&self, ch: char, advance: f32) -> Character {
        let m = self.text_matrix.then(&self.ctm);
        let (x, y) = m.apply(0.0, 0.0);
        let size = self.state.font_size * m.vertical_scale();
        let width = (advance * m.horizontal_scale()).max(0.0);
        Character::new(ch, self.state.font_name.clone(), size, x, self.page_top - y).with_width(width)
    }

    fn place_image(&mut self, name: &[u8]) {
        let Some(info) = self.page.image(name) else {
            return;
        };

        // Images are painted into the unit square mapped by the CTM.
        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].map(|(x, y)| self.ctm.apply(x, y));
        let (mut x0, mut x1) = (f32::MAX, f32::MIN);
        let (mut top, mut bottom) = (f32::MAX, f32::MIN);
        for (x, y) in corners {
            let y = self.page_top - y;
            x0 = x0.min(x);
            x1 = x1.max(x);
            top = top.min(y);
            bottom = bottom.max(y);
        }

        self.images.push(Block::image(
            BBox::new(x0, top, x1, bottom),
            ImageRef {
                name: String::from_utf8_lossy(name).to_string(),
                width: info.width,
                height: info.height,
            },
        ));
    }
}

fn baseline(line: &Line) -> f32 {
    line.chars.first().map(|c| c.y).unwrap_or(line.bbox.y1)
}

/// Group characters sharing a baseline (within 30% of the font size) into
/// lines ordered top to bottom, each sorted left to right.
fn group_into_lines(mut chars: Vec<Character>) -> Vec<Line> {
    chars.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut lines: Vec<Vec<Character>> = Vec::new();
    let mut current_y: Option<f32> = None;

    for c in chars {
        let tolerance = c.font_size * 0.3;
        let same_line = current_y.is_some_and(|y| (c.y - y).abs() <= tolerance);
        if same_line {
            if let Some(line) = lines.last_mut() {
                line.push(c);
                continue;
            }
        }
        current_y = Some(c.y);
        lines.push(vec![c]);
    }

    lines
        .into_iter()
        .map(|mut chars| {
            chars.sort_by(|a, b| a.x.total_cmp(&b.x));
            Line::from_chars(insert_word_gaps(chars))
        })
        .collect()
}

/// Insert a space wherever two glyphs on a line are visibly apart.
fn insert_word_gaps(chars: Vec<Character>) -> Vec<Character> {
    let mut out: Vec<Character> = Vec::with_capacity(chars.len());

    for c in chars {
        if let Some(prev) = out.last() {
            let end = prev.x + prev.width;
            let separated = c.x - end > c.font_size.max(prev.font_size) * WORD_GAP_FACTOR;
            if separated
                && !prev.text.is_whitespace()
                && !c.text.is_whitespace()
                && !is_spaceless_script_char(prev.text)
                && !is_spaceless_script_char(c.text)
            {
                let space = Character::new(' ', prev.font_name.clone(), prev.font_size, end, prev.y)
                    .with_width(c.x - end);
                out.push(space);
            }
        }
        out.push(c);
    }

    out
}

/// Group consecutive lines into text blocks.
///
/// A new block starts when the baseline distance exceeds 1.5× the page's
/// average line spacing, the font size changes by more than 1pt, or the left
/// edge moves by more than 20pt.
fn group_into_blocks(lines: Vec<Line>) -> Vec<Block> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(Block::text(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(Block::text(current));
    }

    blocks
}

fn average_line_spacing(lines: &[Line]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (baseline(&w[1]) - baseline(&w[0])).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &Line, curr: &Line, avg_spacing: f32) -> bool {
    let spacing = (baseline(curr) - baseline(prev)).abs();
    if spacing > avg_spacing * 1.5 {
        return true;
    }

    if (prev.average_font_size() - curr.average_font_size()).abs() > 1.0 {
        return true;
    }

    (prev.x() - curr.x()).abs() > 20.0
}

/// Whether a character belongs to a script written without word spaces
/// (Chinese and Japanese; Korean uses spaces).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::Error;
    use crate::parser::backend::{decode_text_simple, BackendFontInfo, BackendImageInfo};

    /// Backend serving pre-decoded operations, one entry per page.
    struct MockBackend {
        pages: Vec<Vec<ContentOp>>,
        widths: Vec<f32>,
        corrupt_page: Option<u32>,
    }

    impl MockBackend {
        fn new(pages: Vec<Vec<ContentOp>>) -> Self {
            Self {
                pages,
                widths: Vec::new(),
                corrupt_page: None,
            }
        }

        fn ops(&self, page: PageId) -> Result<&Vec<ContentOp>> {
            self.pages
                .get(page.0 as usize - 1)
                .ok_or(Error::PageOutOfRange(page.0, self.pages.len() as u32))
        }
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (1..=self.pages.len() as u32).map(|n| (n, (n, 0))).collect()
        }

        fn page_bounds(&self, _page: PageId) -> Result<[f32; 4]> {
            Ok([0.0, 0.0, 612.0, 792.0])
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![
                BackendFontInfo {
                    name: b"F1".to_vec(),
                    base_font: "Helvetica".into(),
                    first_char: 32,
                    widths: self.widths.clone(),
                },
                BackendFontInfo {
                    name: b"F2".to_vec(),
                    base_font: "Helvetica-Bold".into(),
                    first_char: 0,
                    widths: Vec::new(),
                },
            ])
        }

        fn page_images(&self, _page: PageId) -> Result<Vec<BackendImageInfo>> {
            Ok(vec![BackendImageInfo {
                name: b"Im0".to_vec(),
                width: Some(640),
                height: Some(480),
                filter: "DCTDecode".into(),
            }])
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            if self.corrupt_page == Some(page.0) {
                return Err(Error::Pdf("corrupt content".into()));
            }
            // Non-empty marker; operations come from `decode_content`.
            self.ops(page).map(|_| vec![page.0 as u8])
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
            let page = data.first().copied().unwrap_or(1) as u32;
            self.ops((page, 0)).cloned()
        }

        fn decode_text(&self, _page: PageId, _font_name: &[u8], bytes: &[u8]) -> String {
            decode_text_simple(bytes)
        }

        fn page_text(&self, _page_number: u32) -> Result<String> {
            Ok(String::new())
        }

        fn image_data(&self, _page: PageId, _name: &[u8]) -> Result<(BackendImageInfo, Vec<u8>)> {
            Err(Error::Other("no image data".into()))
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp::new(operator, operands)
    }

    fn num(v: f32) -> PdfValue {
        PdfValue::Real(v)
    }

    fn text_at(font: &str, size: f32, x: f32, y: f32, text: &str) -> Vec<ContentOp> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(font.as_bytes().to_vec()), num(size)]),
            op("Td", vec![num(x), num(y)]),
            op("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())]),
            op("ET", vec![]),
        ]
    }

    fn extractor(pages: Vec<Vec<ContentOp>>) -> GeometryExtractor<MockBackend> {
        GeometryExtractor::with_backend(MockBackend::new(pages), ExtractOptions::default())
    }

    #[test]
    fn test_characters_are_flipped_to_top_down() {
        let ex = extractor(vec![text_at("F1", 12.0, 72.0, 700.0, "Hi")]);
        let page = ex.extract_page(1).unwrap();

        let chars: Vec<&Character> = page.chars().collect();
        assert_eq!(chars.len(), 2);
        assert_eq!(chars[0].text, 'H');
        assert!((chars[0].x - 72.0).abs() < 1e-3);
        assert!((chars[0].y - 92.0).abs() < 1e-3);
        assert!((chars[1].x - 78.0).abs() < 1e-3);
        assert_eq!(chars[0].font_name, "Helvetica");
        assert_eq!(page.bbox, BBox::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_font_widths_drive_advance() {
        let mut backend = MockBackend::new(vec![text_at("F1", 10.0, 0.0, 700.0, "AB")]);
        // 'A' = 65, first_char = 32
        backend.widths = vec![0.0; 40];
        backend.widths[33] = 700.0;
        let ex = GeometryExtractor::with_backend(backend, ExtractOptions::default());
        let page = ex.extract_page(1).unwrap();

        let chars: Vec<&Character> = page.chars().collect();
        assert!((chars[0].width - 7.0).abs() < 1e-3);
        assert!((chars[1].x - 7.0).abs() < 1e-3);
    }

    #[test]
    fn test_bold_font_style_cached() {
        let ex = extractor(vec![text_at("F2", 12.0, 72.0, 700.0, "B")]);
        let page = ex.extract_page(1).unwrap();
        assert!(page.chars().all(|c| c.is_bold()));
    }

    #[test]
    fn test_tj_adjustment_inserts_space() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(12.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"one".to_vec()),
                    PdfValue::Integer(-300),
                    PdfValue::Str(b"two".to_vec()),
                    PdfValue::Integer(-50),
                    PdfValue::Str(b"x".to_vec()),
                ])],
            ),
            op("ET", vec![]),
        ];
        let page = extractor(vec![ops]).extract_page(1).unwrap();
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].lines()[0].text(), "one twox");
    }

    #[test]
    fn test_lines_and_blocks() {
        let mut ops = Vec::new();
        ops.extend(text_at("F1", 24.0, 72.0, 740.0, "Title"));
        ops.extend(text_at("F1", 12.0, 72.0, 700.0, "first line"));
        ops.extend(text_at("F1", 12.0, 72.0, 686.0, "second line"));
        ops.extend(text_at("F1", 12.0, 100.0, 672.0, "- indented"));
        let page = extractor(vec![ops]).extract_page(1).unwrap();

        let texts: Vec<Vec<String>> = page
            .blocks
            .iter()
            .map(|b| b.lines().iter().map(Line::text).collect())
            .collect();
        assert_eq!(
            texts,
            vec![
                vec!["Title".to_string()],
                vec!["first line".to_string(), "second line".to_string()],
                vec!["- indented".to_string()],
            ]
        );
    }

    #[test]
    fn test_leading_and_next_line() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(12.0)]),
            op("TL", vec![num(14.0)]),
            op("Td", vec![num(72.0), num(700.0)]),
            op("Tj", vec![PdfValue::Str(b"a".to_vec())]),
            op("'", vec![PdfValue::Str(b"b".to_vec())]),
            op("ET", vec![]),
        ];
        let page = extractor(vec![ops]).extract_page(1).unwrap();
        let ys: Vec<f32> = page.chars().map(|c| c.y).collect();
        assert!((ys[0] - 92.0).abs() < 1e-3);
        assert!((ys[1] - 106.0).abs() < 1e-3);
    }

    #[test]
    fn test_cm_scales_font_size() {
        let mut ops = vec![op("cm", vec![num(2.0), num(0.0), num(0.0), num(2.0), num(0.0), num(0.0)])];
        ops.extend(text_at("F1", 10.0, 10.0, 300.0, "x"));
        let page = extractor(vec![ops]).extract_page(1).unwrap();
        let c = page.chars().next().unwrap();
        assert!((c.font_size - 20.0).abs() < 1e-3);
        assert!((c.x - 20.0).abs() < 1e-3);
        assert!((c.y - 192.0).abs() < 1e-3);
    }

    #[test]
    fn test_image_placement() {
        let ops = vec![
            op("q", vec![]),
            op("cm", vec![num(200.0), num(0.0), num(0.0), num(100.0), num(72.0), num(500.0)]),
            op("Do", vec![PdfValue::Name(b"Im0".to_vec())]),
            op("Q", vec![]),
            op("Do", vec![PdfValue::Name(b"Fm0".to_vec())]),
        ];
        let page = extractor(vec![ops]).extract_page(1).unwrap();
        assert_eq!(page.blocks.len(), 1);
        match &page.blocks[0] {
            Block::Image { bbox, image } => {
                assert_eq!(*bbox, BBox::new(72.0, 192.0, 272.0, 292.0));
                assert_eq!(image.name, "Im0");
                assert_eq!(image.width, Some(640));
            }
            other => panic!("expected image block, got {:?}", other),
        }
    }

    #[test]
    fn test_text_outside_bt_is_ignored() {
        let ops = vec![op("Tj", vec![PdfValue::Str(b"stray".to_vec())])];
        let page = extractor(vec![ops]).extract_page(1).unwrap();
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_extract_all_sorted_in_parallel() {
        let pages: Vec<Vec<ContentOp>> = (0..6)
            .map(|i| text_at("F1", 12.0, 72.0, 700.0, &format!("page {}", i + 1)))
            .collect();
        let ex = GeometryExtractor::with_backend(
            MockBackend::new(pages),
            ExtractOptions::default().with_parallel(true),
        );
        assert_eq!(ex.page_count(), 6);

        let all = ex.extract_all().unwrap();
        let numbers: Vec<u32> = all.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(all[3].blocks[0].lines()[0].text(), "page 4");
    }

    #[test]
    fn test_error_mode_for_failed_page() {
        let pages = vec![
            text_at("F1", 12.0, 72.0, 700.0, "good"),
            text_at("F1", 12.0, 72.0, 700.0, "bad"),
        ];

        let mut backend = MockBackend::new(pages.clone());
        backend.corrupt_page = Some(2);
        let lenient = GeometryExtractor::with_backend(backend, ExtractOptions::default());
        let all = lenient.extract_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text_char_count(), 4);
        assert!(all[1].blocks.is_empty());

        let mut backend = MockBackend::new(pages);
        backend.corrupt_page = Some(2);
        let strict = GeometryExtractor::with_backend(backend, ExtractOptions::default().strict());
        assert!(matches!(strict.extract_all(), Err(Error::Pdf(_))));
    }

    #[test]
    fn test_page_out_of_range() {
        let ex = extractor(vec![vec![]]);
        assert!(matches!(ex.extract_page(3), Err(Error::PageOutOfRange(3, 1))));
    }

    #[test]
    fn test_word_gaps_become_spaces() {
        let chars = vec![
            Character::new('a', "Helvetica", 10.0, 0.0, 100.0),
            Character::new('b', "Helvetica", 10.0, 5.0, 100.0),
            Character::new('c', "Helvetica", 10.0, 20.0, 100.0),
        ];
        let lines = group_into_lines(chars);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "ab c");
    }

    #[test]
    fn test_spaceless_script() {
        assert!(is_spaceless_script_char('中'));
        assert!(is_spaceless_script_char('あ'));
        assert!(!is_spaceless_script_char('한'));
        assert!(!is_spaceless_script_char('a'));
    }
}
