// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — synthesize new PDF documents from text, decoded images or a
// placeholder message using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. The saved bytes get a short lopdf pass afterwards:
// builtin-font text is re-encoded to WinAnsi and JPEG pages get their
// original DCT stream back.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::{PaperSize, ToolkitConfig};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use super::encoding::reencode_builtin_text;
use super::objects::{inherited_attribute, resolve_dict};
use crate::image::{DecodedImage, JpegSource};

/// Millimetres per PostScript point.
const MM_PER_PT: f32 = 0.3528;

/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.50;

/// Position and size of the placeholder message, in points.
const PLACEHOLDER_ORIGIN_PT: (f32, f32) = (50.0, 750.0);
const PLACEHOLDER_FONT_PT: f32 = 24.0;

/// Text layout parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    /// Left, right and bottom margin.
    pub margin_mm: f32,
    /// Distance from the top edge to the first baseline.
    pub top_mm: f32,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            margin_mm: 15.0,
            top_mm: 20.0,
            font_size_pt: 11.0,
            line_height_pt: 14.0,
        }
    }
}

impl TextLayout {
    /// Approximate characters that fit across `page_width_mm`.
    pub fn chars_per_line(&self, page_width_mm: f32) -> usize {
        let usable_width_mm = page_width_mm - 2.0 * self.margin_mm;
        let avg_char_width_mm = AVG_GLYPH_WIDTH_EM * self.font_size_pt * MM_PER_PT;
        ((usable_width_mm / avg_char_width_mm) as usize).max(1)
    }

    /// Lines that fit between the first baseline and the bottom margin.
    pub fn lines_per_page(&self, page_height_mm: f32) -> usize {
        let usable_pt = (page_height_mm - self.top_mm - self.margin_mm) / MM_PER_PT;
        if usable_pt <= 0.0 || self.line_height_pt <= 0.0 {
            return 1;
        }
        (usable_pt / self.line_height_pt) as usize + 1
    }
}

/// Creates new PDF documents from text content or raster images.
pub struct PdfWriter {
    /// Paper size for page creation.
    paper_size: PaperSize,
    layout: TextLayout,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    /// Create a new writer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            layout: TextLayout::default(),
            title: None,
        }
    }

    /// Create a new writer defaulting to A4.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Paper size and text layout taken from the toolkit configuration.
    pub fn from_config(config: &ToolkitConfig) -> Self {
        Self::new(config.paper_size).with_layout(TextLayout {
            margin_mm: config.text_margin_mm,
            top_mm: config.text_top_mm,
            font_size_pt: config.font_size_pt,
            line_height_pt: config.line_height_pt,
        })
    }

    pub fn with_layout(mut self, layout: TextLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    // -- Text to PDF ----------------------------------------------------------

    /// Create a PDF from plain text content.
    ///
    /// The text is laid out top to bottom in built-in Helvetica. Lines are
    /// wrapped at an estimated character width without dropping any
    /// characters, and pages break automatically.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn create_from_text(&self, text: &str) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("PDFMaster Document");

        info!(paper = ?self.paper_size, title, "Creating text PDF");

        let layout = self.layout;
        let margin_pt = Mm(layout.margin_mm).into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let first_baseline_pt = page_h_pt - Mm(layout.top_mm).into_pt().0;

        let wrapped_lines = wrap_text(text, layout.chars_per_line(page_w.0));
        let lines_per_page = layout.lines_per_page(page_h.0);

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = wrapped_lines
            .chunks(lines_per_page)
            .map(|chunk| {
                let mut ops: Vec<Op> = Vec::with_capacity(chunk.len() * 5);
                for (line_idx, line) in chunk.iter().enumerate() {
                    let y_pt = first_baseline_pt - line_idx as f32 * layout.line_height_pt;
                    ops.extend(text_ops(line, margin_pt, y_pt, layout.font_size_pt));
                }
                PdfPage::new(page_w, page_h, ops)
            })
            .collect();

        // If there were no lines at all, add a single blank page.
        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let page_count = pages.len();
        doc.with_pages(pages);

        debug!(
            total_lines = wrapped_lines.len(),
            pages = page_count,
            lines_per_page,
            "Text layout complete"
        );

        reencode_builtin_text(save(&doc))
    }

    // -- Images to PDF --------------------------------------------------------

    /// Create a PDF with one page per image, in the order given.
    ///
    /// Each image is placed at the top-left corner and scaled uniformly so its
    /// limiting dimension fills the page. JPEG sources are embedded with their
    /// original bytes; other formats are embedded as RGB pixels.
    #[instrument(skip_all, fields(images = images.len()))]
    pub fn create_from_images(&self, images: &[DecodedImage]) -> Result<Vec<u8>> {
        if images.is_empty() {
            return Err(PdfMasterError::EmptyInput("images"));
        }

        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("PDFMaster Images");
        info!(paper = ?self.paper_size, title, "Creating image PDF");

        let page_w_pt = page_w.into_pt().0;
        let page_h_pt = page_h.into_pt().0;

        let mut doc = PdfDocument::new(title);
        let mut pages = Vec::with_capacity(images.len());

        for (index, image) in images.iter().enumerate() {
            let raw = RawImage {
                pixels: RawImageData::U8(image.rgb.clone()),
                width: image.width as usize,
                height: image.height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            // At 72 dpi one pixel is one point.
            let img_w_pt = image.width as f32;
            let img_h_pt = image.height as f32;
            let scale = (page_w_pt / img_w_pt).min(page_h_pt / img_h_pt);
            let rendered_h_pt = img_h_pt * scale;

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(page_h_pt - rendered_h_pt)),
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(72.0),
                    rotate: None,
                },
            }];
            pages.push(PdfPage::new(page_w, page_h, ops));

            debug!(
                index,
                width = image.width,
                height = image.height,
                scale,
                "Image placed on page"
            );
        }

        doc.with_pages(pages);
        let bytes = save(&doc);
        if images.iter().any(|image| image.jpeg.is_some()) {
            embed_jpeg_sources(bytes, images)
        } else {
            Ok(bytes)
        }
    }

    // -- Placeholder ----------------------------------------------------------

    /// A single page carrying one line of text, used for simulated results.
    #[instrument(skip(self))]
    pub fn create_placeholder(&self, message: &str) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("PDFMaster Placeholder");
        let mut doc = PdfDocument::new(title);
        let (x, y) = PLACEHOLDER_ORIGIN_PT;
        let ops = Vec::from(text_ops(message, x, y, PLACEHOLDER_FONT_PT));
        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);
        reencode_builtin_text(save(&doc))
    }
}

fn text_ops(line: &str, x_pt: f32, y_pt: f32, size_pt: f32) -> [Op; 5] {
    [
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point {
                x: Pt(x_pt),
                y: Pt(y_pt),
            },
        },
        Op::SetFontSizeBuiltinFont {
            size: Pt(size_pt),
            font: BuiltinFont::Helvetica,
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.to_string())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
    ]
}

fn save(doc: &PdfDocument) -> Vec<u8> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "printpdf reported warnings while saving");
    }
    output
}

/// Swap the pixel XObject printpdf wrote for each JPEG page with the original
/// DCT stream. Page `i` holds image `i`.
fn embed_jpeg_sources(pdf: Vec<u8>, images: &[DecodedImage]) -> Result<Vec<u8>> {
    let mut document = Document::load_mem(&pdf)
        .map_err(|err| PdfMasterError::PdfError(format!("failed to reload PDF: {}", err)))?;

    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    let mut embedded = 0usize;
    for (page_id, image) in page_ids.into_iter().zip(images) {
        let Some(source) = &image.jpeg else {
            continue;
        };
        let Some(stream_id) = drawn_xobject(&document, page_id) else {
            warn!(?page_id, "Image XObject not found; keeping the re-encoded pixels");
            continue;
        };
        document
            .objects
            .insert(stream_id, Object::Stream(dct_stream(image, source)));
        embedded += 1;
    }
    debug!(embedded, "JPEG sources embedded without re-encoding");

    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|err| PdfMasterError::PdfError(format!("failed to serialise PDF: {}", err)))?;
    Ok(output)
}

/// The XObject drawn by the first `Do` on a page.
fn drawn_xobject(document: &Document, page_id: ObjectId) -> Option<ObjectId> {
    let content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&content).ok()?;
    let name = content
        .operations
        .iter()
        .find(|op| op.operator == "Do")
        .and_then(|op| op.operands.first())
        .and_then(|operand| operand.as_name().ok())?;

    let resources = inherited_attribute(document, page_id, b"Resources")?;
    let resources = resolve_dict(document, &resources)?;
    let xobjects = resolve_dict(document, resources.get(b"XObject").ok()?)?;
    match xobjects.get(name).ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    }
}

fn dct_stream(image: &DecodedImage, source: &JpegSource) -> Stream {
    let color_space: &[u8] = if source.components == 1 {
        b"DeviceGray"
    } else {
        b"DeviceRGB"
    };
    let dict = Dictionary::from_iter([
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(image.width))),
        ("Height", Object::Integer(i64::from(image.height))),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"DCTDecode".to_vec())),
    ]);
    Stream::new(dict, source.data.clone()).with_compression(false)
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line is visibly wider than `max_width`
/// characters.
///
/// Splits on existing newlines first, then word-wraps each paragraph. Every
/// character is kept: whitespace stays attached to the word it follows, so
/// the lines of a paragraph concatenate back to the paragraph. Words longer
/// than `max_width` are broken on character boundaries. A trailing `\r` on a
/// paragraph is dropped.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        if paragraph.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0usize;

        for token in tokens(paragraph) {
            let visible = token.trim_end().chars().count();
            let total = token.chars().count();

            if current_len > 0 && current_len + visible <= max_width {
                current_line.push_str(token);
                current_len += total;
                continue;
            }
            if current_len > 0 {
                result.push(std::mem::take(&mut current_line));
                current_len = 0;
            }

            if visible <= max_width {
                current_line.push_str(token);
                current_len = total;
            } else {
                // Force-break the oversized token; the tail starts a new line.
                let chars: Vec<char> = token.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    let piece: String = chunk.iter().collect();
                    if chunks.peek().is_some() {
                        result.push(piece);
                    } else {
                        current_len = chunk.len();
                        current_line = piece;
                    }
                }
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

/// Split a paragraph into words, each carrying its trailing whitespace. Leading
/// whitespace belongs to the first token.
fn tokens(paragraph: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_was_space = false;
    let mut seen_word = false;
    for (offset, ch) in paragraph.char_indices() {
        let is_space = ch.is_whitespace();
        if !is_space && prev_was_space && seen_word {
            tokens.push(&paragraph[start..offset]);
            start = offset;
        }
        if !is_space {
            seen_word = true;
        }
        prev_was_space = is_space;
    }
    tokens.push(&paragraph[start..]);
    tokens
}
