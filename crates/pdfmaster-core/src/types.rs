// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the PDFMaster toolkit.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a file staged in the working set.
///
/// Two files with the same name and bytes are still distinct members; removal
/// is by identity, never by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const PDF_MIME: &str = "application/pdf";
pub const ZIP_MIME: &str = "application/zip";

/// Known input document types, used to declare a media type for files that
/// arrive without one (e.g. paths on the command line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Tiff,
    PlainText,
    Word,
    Excel,
    PowerPoint,
    OpenDocument,
    Epub,
    Dwg,
    /// Anything else; carried through as an opaque blob.
    Other,
}

impl DocumentType {
    /// Declared MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
            Self::Tiff => "image/tiff",
            Self::PlainText => "text/plain",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::PowerPoint => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::OpenDocument => "application/vnd.oasis.opendocument.text",
            Self::Epub => "application/epub+zip",
            Self::Dwg => "image/vnd.dwg",
            Self::Other => "application/octet-stream",
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "bmp" => Self::Bmp,
            "webp" => Self::Webp,
            "tif" | "tiff" => Self::Tiff,
            "txt" => Self::PlainText,
            "doc" | "docx" => Self::Word,
            "xls" | "xlsx" => Self::Excel,
            "ppt" | "pptx" => Self::PowerPoint,
            "odt" | "ods" | "odp" => Self::OpenDocument,
            "epub" | "mobi" => Self::Epub,
            "dwg" => Self::Dwg,
            _ => Self::Other,
        }
    }
}

/// True when `media_type` declares a PDF.
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type == PDF_MIME
}

/// True when `media_type` declares any raster image.
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Grouping used when listing the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCategory {
    Main,
    ConvertToPdf,
    ConvertFromPdf,
    MergeSplit,
    Security,
    Tools,
}

impl ToolCategory {
    /// Listing order for the catalog sections (the main tool is not listed).
    pub const LISTED: [ToolCategory; 5] = [
        Self::ConvertToPdf,
        Self::ConvertFromPdf,
        Self::MergeSplit,
        Self::Security,
        Self::Tools,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::ConvertToPdf => "Convert To PDF",
            Self::ConvertFromPdf => "Convert From PDF",
            Self::MergeSplit => "Merge And Split",
            Self::Security => "PDF Security",
            Self::Tools => "PDF Tools",
        }
    }
}

/// What kind of input a tool consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Free-form text buffer instead of files.
    Text,
    /// Every staged file must be `application/pdf`.
    PdfOnly,
    /// Every staged file must be `image/*`.
    ImagesOnly,
    /// No media-type restriction.
    AnyFile,
}

impl InputKind {
    /// Check a declared media type against this requirement.
    pub fn accepts(&self, media_type: &str) -> bool {
        match self {
            Self::PdfOnly => is_pdf_media_type(media_type),
            Self::ImagesOnly => is_image_media_type(media_type),
            Self::AnyFile | Self::Text => true,
        }
    }

    /// Human description of the accepted files, for rejection messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::PdfOnly => "PDF files",
            Self::ImagesOnly => "image files",
            Self::AnyFile => "any files",
            Self::Text => "text",
        }
    }
}

/// How many staged files a tool works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCardinality {
    None,
    ExactlyOne,
    AtLeastOne,
}
