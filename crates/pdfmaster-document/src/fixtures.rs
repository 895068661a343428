// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory test documents. Every page shows its label with a single `Tj`,
// which is how tests identify pages after copying them around.

use std::io::Cursor;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Description of one page in a fixture document.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    pub label: String,
    pub rotate: Option<i64>,
    pub jpeg: Option<Vec<u8>>,
    pub raw_image: bool,
    pub widget: Option<String>,
    pub link: bool,
}

impl FixturePage {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn rotated(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    /// Embed a DCT-encoded image XObject with these JPEG bytes.
    pub fn with_jpeg(mut self, jpeg: Vec<u8>) -> Self {
        self.jpeg = Some(jpeg);
        self
    }

    /// Embed an unfiltered 2x2 RGB image XObject.
    pub fn with_raw_image(mut self) -> Self {
        self.raw_image = true;
        self
    }

    /// Add a text-field widget with an appearance showing `value`.
    pub fn with_widget(mut self, value: impl Into<String>) -> Self {
        self.widget = Some(value.into());
        self
    }

    pub fn with_link(mut self) -> Self {
        self.link = true;
        self
    }
}

/// Build a PDF from page descriptions. All pages share one font object.
pub fn build_pdf(pages: &[FixturePage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::with_capacity(pages.len());
    let mut fields = Vec::new();
    for page in pages {
        let (page_id, widget_id) = add_page(&mut doc, pages_id, font_id, page);
        kids.push(Object::Reference(page_id));
        fields.extend(widget_id.map(Object::Reference));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 595.into(), 842.into()]),
            ),
        ])),
    );

    let mut catalog = Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    if !fields.is_empty() {
        catalog.set(
            "AcroForm",
            Object::Dictionary(Dictionary::from_iter([("Fields", Object::Array(fields))])),
        );
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture saves");
    bytes
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    page: &FixturePage,
) -> (ObjectId, Option<ObjectId>) {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
        Operation::new("Tj", vec![Object::string_literal(page.label.as_str())]),
        Operation::new("ET", vec![]),
    ];

    let mut xobjects = Dictionary::new();
    if let Some(jpeg) = &page.jpeg {
        let (width, height) = ::image::load_from_memory(jpeg)
            .map(|img| (img.width() as i64, img.height() as i64))
            .expect("fixture jpeg decodes");
        let image_id = doc.add_object(image_stream(
            width,
            height,
            Some("DCTDecode"),
            jpeg.clone(),
        ));
        xobjects.set("Im1", Object::Reference(image_id));
    }
    if page.raw_image {
        let image_id = doc.add_object(image_stream(2, 2, None, vec![128; 2 * 2 * 3]));
        xobjects.set("Im2", Object::Reference(image_id));
    }
    for name in xobjects.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>() {
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![100.into(), 0.into(), 0.into(), 100.into(), 72.into(), 500.into()],
        ));
        operations.push(Operation::new("Do", vec![Object::Name(name)]));
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations }.encode().expect("fixture content encodes");
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let mut resources = Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]);
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let page_id = doc.new_object_id();
    let mut annots = Vec::new();
    let mut widget_id = None;
    if let Some(value) = &page.widget {
        let id = add_widget(doc, page_id, font_id, value);
        annots.push(Object::Reference(id));
        widget_id = Some(id);
    }
    if page.link {
        annots.push(Object::Reference(doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Annot".to_vec())),
            ("Subtype", Object::Name(b"Link".to_vec())),
            (
                "Rect",
                Object::Array(vec![72.into(), 600.into(), 200.into(), 620.into()]),
            ),
            (
                "A",
                Object::Dictionary(Dictionary::from_iter([
                    ("S", Object::Name(b"URI".to_vec())),
                    ("URI", Object::string_literal("https://example.org")),
                ])),
            ),
        ]))));
    }

    let mut dict = Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Dictionary(resources)),
    ]);
    if let Some(degrees) = page.rotate {
        dict.set("Rotate", Object::Integer(degrees));
    }
    if !annots.is_empty() {
        dict.set("Annots", Object::Array(annots));
    }
    doc.objects.insert(page_id, Object::Dictionary(dict));
    (page_id, widget_id)
}

fn image_stream(width: i64, height: i64, filter: Option<&str>, data: Vec<u8>) -> Stream {
    let mut dict = Dictionary::from_iter([
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width)),
        ("Height", Object::Integer(height)),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ]);
    if let Some(filter) = filter {
        dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    }
    Stream::new(dict, data).with_compression(false)
}

fn add_widget(doc: &mut Document, page_id: ObjectId, font_id: ObjectId, value: &str) -> ObjectId {
    let appearance = format!("/Tx BMC BT /F1 12 Tf 2 10 Td ({}) Tj ET EMC", value);
    let appearance_id = doc.add_object(
        Stream::new(
            Dictionary::from_iter([
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Form".to_vec())),
                (
                    "BBox",
                    Object::Array(vec![0.into(), 0.into(), 200.into(), 30.into()]),
                ),
                (
                    "Resources",
                    Object::Dictionary(Dictionary::from_iter([(
                        "Font",
                        Object::Dictionary(Dictionary::from_iter([(
                            "F1",
                            Object::Reference(font_id),
                        )])),
                    )])),
                ),
            ]),
            appearance.into_bytes(),
        )
        .with_compression(false),
    );

    doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Widget".to_vec())),
        ("FT", Object::Name(b"Tx".to_vec())),
        ("T", Object::string_literal("name")),
        ("V", Object::string_literal(value)),
        ("F", Object::Integer(4)),
        (
            "Rect",
            Object::Array(vec![100.into(), 100.into(), 300.into(), 130.into()]),
        ),
        ("P", Object::Reference(page_id)),
        (
            "AP",
            Object::Dictionary(Dictionary::from_iter([(
                "N",
                Object::Reference(appearance_id),
            )])),
        ),
    ]))
}

/// `count` pages labeled "Page 1", "Page 2", ...
pub fn labeled_pdf(count: usize) -> Vec<u8> {
    prefixed_pdf("Page", count)
}

/// `count` pages labeled "{prefix} 1", "{prefix} 2", ...
pub fn prefixed_pdf(prefix: &str, count: usize) -> Vec<u8> {
    let pages: Vec<FixturePage> = (1..=count)
        .map(|i| FixturePage::labeled(format!("{prefix} {i}")))
        .collect();
    build_pdf(&pages)
}

/// The label of every page, in document order: the operand of the first `Tj`.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("valid pdf");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).expect("page content");
            let content = Content::decode(&content).expect("decodable content");
            content
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|operand| match operand {
                    Object::String(bytes, _) => String::from_utf8(bytes.clone()).ok(),
                    _ => None,
                })
                .unwrap_or_default()
        })
        .collect()
}

/// A 4x4 solid-colour JPEG.
pub fn tiny_jpeg() -> Vec<u8> {
    encode(4, 4, ::image::ImageFormat::Jpeg)
}

/// A 3x2 PNG.
pub fn tiny_png() -> Vec<u8> {
    encode(3, 2, ::image::ImageFormat::Png)
}

/// A 2x1 PNG: one fully transparent pixel, then an opaque (10, 20, 30) one.
pub fn tiny_translucent_png() -> Vec<u8> {
    let img = ::image::RgbaImage::from_fn(2, 1, |x, _| {
        if x == 0 {
            ::image::Rgba([0, 0, 0, 0])
        } else {
            ::image::Rgba([10, 20, 30, 255])
        }
    });
    let mut bytes = Vec::new();
    ::image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ::image::ImageFormat::Png)
        .expect("fixture image encodes");
    bytes
}

fn encode(width: u32, height: u32, format: ::image::ImageFormat) -> Vec<u8> {
    let img = ::image::RgbImage::from_pixel(width, height, ::image::Rgb([200, 40, 40]));
    let mut bytes = Vec::new();
    ::image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("fixture image encodes");
    bytes
}
