//! Integration tests for classification and assembly over synthetic page geometry.

use pdfstruct::analysis::{median_font_size, DEFAULT_FONT_SIZE};
use pdfstruct::builder::{BodyElement, ListStyle};
use pdfstruct::{
    BBox, Block, Character, ContentAssembler, ContentKind, DocumentBuilder, DocumentMetrics,
    ExtractOptions, ImageMap, ImageRef, Line, PageExtraction,
};

/// A line of Helvetica text with its baseline at `baseline` (top-down).
fn line(text: &str, x: f32, baseline: f32, size: f32, font: &str) -> Line {
    let chars = text
        .chars()
        .enumerate()
        .map(|(i, c)| Character::new(c, font, size, x + i as f32 * size * 0.5, baseline))
        .collect();
    Line::from_chars(chars)
}

fn page(number: u32, blocks: Vec<Block>) -> PageExtraction {
    PageExtraction::new(number, blocks, BBox::new(0.0, 0.0, 612.0, 792.0))
}

fn two_page_document() -> Vec<PageExtraction> {
    vec![
        page(
            1,
            vec![
                Block::text(vec![line("Annual Report", 72.0, 80.0, 24.0, "Helvetica-Bold")]),
                Block::text(vec![
                    line("Revenue grew across all regions", 72.0, 120.0, 12.0, "Helvetica"),
                    line("during the fiscal year.", 72.0, 134.0, 12.0, "Helvetica"),
                ]),
            ],
        ),
        page(
            2,
            vec![Block::text(vec![
                line("• Expanded into new markets", 100.0, 80.0, 12.0, "Helvetica"),
                line("• Reduced operating costs", 100.0, 94.0, 12.0, "Helvetica"),
                line("• Hired fifty engineers", 100.0, 108.0, 12.0, "Helvetica"),
            ])],
        ),
    ]
}

fn kinds(items: &[pdfstruct::ContentItem]) -> Vec<&'static str> {
    items
        .iter()
        .map(|item| match &item.kind {
            ContentKind::Heading { level: 1, .. } => "h1",
            ContentKind::Heading { .. } => "h",
            ContentKind::Paragraph { .. } => "p",
            ContentKind::ListItem { ordered: false, .. } => "bullet",
            ContentKind::ListItem { ordered: true, .. } => "numbered",
            ContentKind::Image { .. } => "image",
        })
        .collect()
}

#[test]
fn test_two_page_document_structure() {
    let pages = two_page_document();
    let metrics = DocumentMetrics::from_pages(&pages);
    assert_eq!(metrics.median_font_size(), 12.0);

    let stream = ContentAssembler::new(metrics, &ExtractOptions::default()).assemble(&pages);

    assert_eq!(
        kinds(stream.items()),
        vec!["h1", "p", "bullet", "bullet", "bullet"]
    );
    assert!(stream.is_ordered());
    assert_eq!(stream.items()[0].text(), "Annual Report");
    assert_eq!(
        stream.items()[1].text(),
        "Revenue grew across all regions during the fiscal year."
    );
    assert_eq!(stream.items()[3].text(), "• Reduced operating costs");
}

#[test]
fn test_pages_out_of_order_are_sorted() {
    let mut pages = two_page_document();
    pages.reverse();

    let metrics = DocumentMetrics::from_pages(&pages);
    let stream = ContentAssembler::new(metrics, &ExtractOptions::default()).assemble(&pages);
    assert!(stream.is_ordered());
    assert_eq!(stream.items()[0].page_number, 1);
}

#[test]
fn test_blocks_out_of_reading_order() {
    let pages = vec![page(
        1,
        vec![
            Block::text(vec![line("Closing remarks.", 72.0, 400.0, 12.0, "Helvetica")]),
            Block::text(vec![line("Opening remarks.", 72.0, 100.0, 12.0, "Helvetica")]),
        ],
    )];
    let stream = ContentAssembler::new(DocumentMetrics::from_pages(&pages), &ExtractOptions::default())
        .assemble(&pages);

    let texts: Vec<String> = stream.iter().map(|i| i.text()).collect();
    assert_eq!(texts, vec!["Opening remarks.", "Closing remarks."]);
}

#[test]
fn test_inline_styles_survive_merge() {
    let mut bold = line("Note:", 72.0, 100.0, 12.0, "Times-Bold").chars;
    bold.extend(line(" read carefully", 102.0, 100.0, 12.0, "Times-Roman").chars);
    let pages = vec![page(
        1,
        vec![Block::text(vec![
            Line::from_chars(bold),
            line("before signing.", 72.0, 114.0, 12.0, "Times-Italic"),
        ])],
    )];

    let stream = ContentAssembler::new(DocumentMetrics::from_pages(&pages), &ExtractOptions::default())
        .assemble(&pages);
    assert_eq!(stream.len(), 1);
    match &stream.items()[0].kind {
        ContentKind::Paragraph { runs } => {
            assert_eq!(runs.len(), 3);
            assert!(runs[0].bold);
            assert_eq!(runs[0].text, "Note:");
            assert_eq!(runs[1].text, " read carefully ");
            assert!(runs[2].italic);
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
}

#[test]
fn test_median_ignores_image_blocks() {
    let pages = vec![page(
        1,
        vec![
            Block::image(
                BBox::new(0.0, 0.0, 100.0, 100.0),
                ImageRef {
                    name: "Im0".into(),
                    width: Some(10),
                    height: Some(10),
                },
            ),
            Block::text(vec![line("abc", 0.0, 50.0, 10.0, "Arial")]),
        ],
    )];
    assert_eq!(median_font_size(pages.iter().flat_map(|p| p.blocks.iter())), 10.0);

    let images_only = vec![page(1, vec![pages[0].blocks[0].clone()])];
    let metrics = DocumentMetrics::from_pages(&images_only);
    assert!(!metrics.has_text());
    assert_eq!(metrics.median_font_size(), DEFAULT_FONT_SIZE);
}

#[test]
fn test_stream_to_document() {
    let pages = two_page_document();
    let stream = ContentAssembler::new(DocumentMetrics::from_pages(&pages), &ExtractOptions::default())
        .assemble(&pages);
    let doc = DocumentBuilder::default().build(&stream, &ImageMap::new());

    assert_eq!(doc.body.len(), 5);
    let list_texts: Vec<String> = doc
        .paragraphs()
        .filter(|p| p.style.list_info.map(|l| l.style) == Some(ListStyle::Bullet))
        .map(|p| p.plain_text())
        .collect();
    assert_eq!(
        list_texts,
        vec![
            "Expanded into new markets",
            "Reduced operating costs",
            "Hired fifty engineers"
        ]
    );
    match &doc.body[0] {
        BodyElement::Paragraph(p) => assert_eq!(p.heading_level(), Some(1)),
        other => panic!("expected heading, got {:?}", other),
    }
}
