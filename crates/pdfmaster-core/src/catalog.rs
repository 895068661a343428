// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Static tool catalog. Every operation a user can pick is described here; the
// dispatcher keys its strategy registry on `ToolId`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PdfMasterError;
use crate::types::{FileCardinality, InputKind, ToolCategory};

/// Identifier of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    PdfConverter,
    WordToPdf,
    ExcelToPdf,
    PowerpointToPdf,
    JpgToPdf,
    TextToPdf,
    AutocadToPdf,
    OpenofficeToPdf,
    EbooksToPdf,
    IworkToPdf,
    PdfToWord,
    PdfToExcel,
    PdfToPowerpoint,
    PdfToJpg,
    PdfToPng,
    ExtractPdfImages,
    PdfToPdfa,
    MergePdf,
    SplitPdf,
    ProtectPdf,
    UnlockPdf,
    RedactPdf,
    CompressPdf,
    DeletePdfPages,
    RotatePdf,
    FlattenPdf,
    RepairPdf,
}

impl ToolId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfConverter => "pdf-converter",
            Self::WordToPdf => "word-to-pdf",
            Self::ExcelToPdf => "excel-to-pdf",
            Self::PowerpointToPdf => "powerpoint-to-pdf",
            Self::JpgToPdf => "jpg-to-pdf",
            Self::TextToPdf => "text-to-pdf",
            Self::AutocadToPdf => "autocad-to-pdf",
            Self::OpenofficeToPdf => "openoffice-to-pdf",
            Self::EbooksToPdf => "ebooks-to-pdf",
            Self::IworkToPdf => "iwork-to-pdf",
            Self::PdfToWord => "pdf-to-word",
            Self::PdfToExcel => "pdf-to-excel",
            Self::PdfToPowerpoint => "pdf-to-powerpoint",
            Self::PdfToJpg => "pdf-to-jpg",
            Self::PdfToPng => "pdf-to-png",
            Self::ExtractPdfImages => "extract-pdf-images",
            Self::PdfToPdfa => "pdf-to-pdfa",
            Self::MergePdf => "merge-pdf",
            Self::SplitPdf => "split-pdf",
            Self::ProtectPdf => "protect-pdf",
            Self::UnlockPdf => "unlock-pdf",
            Self::RedactPdf => "redact-pdf",
            Self::CompressPdf => "compress-pdf",
            Self::DeletePdfPages => "delete-pdf-pages",
            Self::RotatePdf => "rotate-pdf",
            Self::FlattenPdf => "flatten-pdf",
            Self::RepairPdf => "repair-pdf",
        }
    }

    /// Media-type gate applied at intake.
    pub fn input_kind(&self) -> InputKind {
        match self {
            Self::TextToPdf => InputKind::Text,
            Self::JpgToPdf => InputKind::ImagesOnly,
            Self::MergePdf
            | Self::SplitPdf
            | Self::RotatePdf
            | Self::DeletePdfPages
            | Self::ProtectPdf
            | Self::ExtractPdfImages
            | Self::FlattenPdf
            | Self::PdfToPdfa => InputKind::PdfOnly,
            _ => InputKind::AnyFile,
        }
    }

    /// Number of staged files the tool works on.
    pub fn cardinality(&self) -> FileCardinality {
        match self {
            Self::TextToPdf => FileCardinality::None,
            Self::SplitPdf
            | Self::DeletePdfPages
            | Self::RotatePdf
            | Self::FlattenPdf
            | Self::ProtectPdf
            | Self::ExtractPdfImages
            | Self::PdfToPdfa => FileCardinality::ExactlyOne,
            _ => FileCardinality::AtLeastOne,
        }
    }

    /// Catalog entry for this identifier.
    pub fn descriptor(&self) -> &'static ToolDescriptor {
        // Every variant has exactly one entry; see `catalog_covers_every_tool`.
        CATALOG
            .iter()
            .find(|tool| tool.id == *self)
            .unwrap_or(&CATALOG[0])
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = PdfMasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .map(|tool| tool.id)
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PdfMasterError::UnknownTool(s.to_string()))
    }
}

/// Static, immutable description of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ToolCategory,
    /// Short glyph shown next to the name.
    pub marker: &'static str,
}

const fn tool(
    id: ToolId,
    name: &'static str,
    description: &'static str,
    category: ToolCategory,
    marker: &'static str,
) -> ToolDescriptor {
    ToolDescriptor {
        id,
        name,
        description,
        category,
        marker,
    }
}

/// The full catalog in display order.
pub static CATALOG: [ToolDescriptor; 27] = [
    tool(
        ToolId::PdfConverter,
        "PDF Converter",
        "Convert files to and from PDF format.",
        ToolCategory::Main,
        "🔄",
    ),
    // Convert to PDF
    tool(
        ToolId::WordToPdf,
        "Word to PDF",
        "Convert DOCX to PDF",
        ToolCategory::ConvertToPdf,
        "W",
    ),
    tool(
        ToolId::ExcelToPdf,
        "Excel to PDF",
        "Convert XLSX to PDF",
        ToolCategory::ConvertToPdf,
        "X",
    ),
    tool(
        ToolId::PowerpointToPdf,
        "PowerPoint to PDF",
        "Convert PPTX to PDF",
        ToolCategory::ConvertToPdf,
        "P",
    ),
    tool(
        ToolId::JpgToPdf,
        "JPG to PDF",
        "Convert JPG to PDF",
        ToolCategory::ConvertToPdf,
        "🏞️",
    ),
    tool(
        ToolId::TextToPdf,
        "Text to PDF",
        "Convert plain text to a PDF document.",
        ToolCategory::ConvertToPdf,
        "✍️",
    ),
    tool(
        ToolId::AutocadToPdf,
        "AutoCAD to PDF",
        "Convert DWG to PDF",
        ToolCategory::ConvertToPdf,
        "A",
    ),
    tool(
        ToolId::OpenofficeToPdf,
        "OpenOffice to PDF",
        "Convert ODT to PDF",
        ToolCategory::ConvertToPdf,
        "📄",
    ),
    tool(
        ToolId::EbooksToPdf,
        "eBooks to PDF",
        "Convert EPUB, MOBI to PDF",
        ToolCategory::ConvertToPdf,
        "📚",
    ),
    tool(
        ToolId::IworkToPdf,
        "iWork to PDF",
        "Convert Pages, Numbers, Keynote to PDF",
        ToolCategory::ConvertToPdf,
        "I",
    ),
    // Convert from PDF
    tool(
        ToolId::PdfToWord,
        "PDF to Word",
        "Convert PDF to DOCX",
        ToolCategory::ConvertFromPdf,
        "W",
    ),
    tool(
        ToolId::PdfToExcel,
        "PDF to Excel",
        "Convert PDF to XLSX",
        ToolCategory::ConvertFromPdf,
        "X",
    ),
    tool(
        ToolId::PdfToPowerpoint,
        "PDF to PowerPoint",
        "Convert PDF to PPTX",
        ToolCategory::ConvertFromPdf,
        "P",
    ),
    tool(
        ToolId::PdfToJpg,
        "PDF to JPG",
        "Convert PDF to JPG",
        ToolCategory::ConvertFromPdf,
        "🏞️",
    ),
    tool(
        ToolId::PdfToPng,
        "PDF to PNG",
        "Convert PDF to PNG",
        ToolCategory::ConvertFromPdf,
        "🖼️",
    ),
    tool(
        ToolId::ExtractPdfImages,
        "Extract PDF Images",
        "Extract images from a PDF",
        ToolCategory::ConvertFromPdf,
        "🌄",
    ),
    tool(
        ToolId::PdfToPdfa,
        "PDF to PDF/A",
        "Convert PDF to PDF/A",
        ToolCategory::ConvertFromPdf,
        "📄",
    ),
    // Merge & split
    tool(
        ToolId::MergePdf,
        "Merge PDF",
        "Combine multiple PDFs into one unified document.",
        ToolCategory::MergeSplit,
        "➕",
    ),
    tool(
        ToolId::SplitPdf,
        "Split PDF",
        "Extract a range of pages or split every page into a separate PDF.",
        ToolCategory::MergeSplit,
        "✂️",
    ),
    // Security
    tool(
        ToolId::ProtectPdf,
        "Protect PDF",
        "Add a password and encrypt your PDF file to secure it.",
        ToolCategory::Security,
        "🔒",
    ),
    tool(
        ToolId::UnlockPdf,
        "Unlock PDF",
        "Remove password from PDF.",
        ToolCategory::Security,
        "🔓",
    ),
    tool(
        ToolId::RedactPdf,
        "Redact PDF",
        "Permanently remove sensitive content.",
        ToolCategory::Security,
        "✒️",
    ),
    // PDF tools
    tool(
        ToolId::CompressPdf,
        "Compress PDF",
        "Reduce the file size of your PDF.",
        ToolCategory::Tools,
        "↘️",
    ),
    tool(
        ToolId::DeletePdfPages,
        "Delete PDF Pages",
        "Remove specific pages from your PDF file.",
        ToolCategory::Tools,
        "🗑️",
    ),
    tool(
        ToolId::RotatePdf,
        "Rotate PDF",
        "Rotate every page clockwise; the angle adds to any rotation a page already has.",
        ToolCategory::Tools,
        "🔄",
    ),
    tool(
        ToolId::FlattenPdf,
        "Flatten PDF",
        "Make annotations and form fields non-editable.",
        ToolCategory::Tools,
        "📉",
    ),
    tool(
        ToolId::RepairPdf,
        "Repair PDF",
        "Try to fix a corrupted PDF file.",
        ToolCategory::Tools,
        "🔧",
    ),
];

/// Look up a descriptor by its identifier string.
pub fn lookup(id: &str) -> Option<&'static ToolDescriptor> {
    CATALOG.iter().find(|tool| tool.id.as_str() == id)
}

/// Tools in one category, in catalog order.
pub fn by_category(category: ToolCategory) -> impl Iterator<Item = &'static ToolDescriptor> {
    CATALOG.iter().filter(move |tool| tool.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_covers_every_tool() {
        let ids: HashSet<ToolId> = CATALOG.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), CATALOG.len(), "duplicate catalog entries");
        for tool in &CATALOG {
            assert_eq!(tool.id.descriptor().id, tool.id);
        }
    }

    #[test]
    fn identifiers_round_trip_through_strings() {
        for tool in &CATALOG {
            let parsed: ToolId = tool.id.as_str().parse().expect("known id");
            assert_eq!(parsed, tool.id);
        }
        assert!("make-coffee".parse::<ToolId>().is_err());
    }

    #[test]
    fn serde_names_match_identifiers() {
        let json = serde_json::to_string(&ToolId::PdfToPdfa).expect("serialize");
        assert_eq!(json, "\"pdf-to-pdfa\"");
        let json = serde_json::to_string(&ToolId::DeletePdfPages).expect("serialize");
        assert_eq!(json, "\"delete-pdf-pages\"");
    }

    #[test]
    fn intake_gates_follow_the_tool() {
        assert_eq!(ToolId::MergePdf.input_kind(), InputKind::PdfOnly);
        assert_eq!(ToolId::JpgToPdf.input_kind(), InputKind::ImagesOnly);
        assert_eq!(ToolId::TextToPdf.input_kind(), InputKind::Text);
        assert_eq!(ToolId::WordToPdf.input_kind(), InputKind::AnyFile);
        assert_eq!(ToolId::SplitPdf.cardinality(), FileCardinality::ExactlyOne);
        assert_eq!(ToolId::MergePdf.cardinality(), FileCardinality::AtLeastOne);
    }

    #[test]
    fn categories_list_in_order() {
        let merge_split: Vec<_> = by_category(ToolCategory::MergeSplit).map(|t| t.id).collect();
        assert_eq!(merge_split, vec![ToolId::MergePdf, ToolId::SplitPdf]);
        assert_eq!(lookup("rotate-pdf").map(|t| t.name), Some("Rotate PDF"));
    }

    #[test]
    fn rotate_says_the_angle_is_added() {
        let rotate = ToolId::RotatePdf.descriptor();
        assert!(rotate.description.contains("adds to any rotation"), "{}", rotate.description);
    }
}
