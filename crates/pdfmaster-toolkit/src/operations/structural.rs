// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-structural strategies: merge, split, delete-pages, rotate, flatten.

use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::options::{PAGES_OPTION, PageSpan};
use pdfmaster_core::{PageSelection, Rotation, ToolOptions};
use pdfmaster_document::PageAssembler;
use tracing::{info, instrument, warn};

use super::{Artifact, Operation, OperationInput, ProcessingResult, load_pdf};

fn page_spans(options: &ToolOptions) -> Result<&[PageSpan]> {
    match options {
        ToolOptions::Pages(spans) => Ok(spans),
        _ => Err(PdfMasterError::MissingOption(PAGES_OPTION)),
    }
}

/// Concatenate every page of every file, in file order then page order.
pub struct MergeDocuments;

impl Operation for MergeDocuments {
    #[instrument(skip_all, fields(files = input.files().len()))]
    fn execute(&self, input: &OperationInput, _options: &ToolOptions) -> Result<ProcessingResult> {
        let files = input.files();
        if files.is_empty() {
            return Err(PdfMasterError::EmptyInput("files"));
        }

        let mut assembler = PageAssembler::new();
        // Each source is loaded and copied before the next one is touched.
        for file in files {
            let source = load_pdf(file)?;
            assembler.append_all(&source)?;
        }

        let pages = assembler.page_count();
        let bytes = assembler.finish().save()?;
        info!(files = files.len(), pages, "Documents merged");
        Ok(Artifact::pdf(bytes, "merged.pdf").into())
    }
}

/// Keep only the selected pages, in the order first requested.
pub struct SplitDocument;

impl Operation for SplitDocument {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, options: &ToolOptions) -> Result<ProcessingResult> {
        let spans = page_spans(options)?;
        let source = load_pdf(input.single_file()?)?;
        let selection = PageSelection::resolve(spans, source.page_count())?;

        let mut assembler = PageAssembler::new();
        assembler.append_pages(&source, selection.indices())?;
        let bytes = assembler.finish().save()?;
        info!(
            source_pages = source.page_count(),
            kept = selection.len(),
            "Pages extracted"
        );
        Ok(Artifact::pdf(bytes, "split.pdf").into())
    }
}

/// Drop the selected pages, keeping the rest in document order.
pub struct DeletePages;

impl Operation for DeletePages {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, options: &ToolOptions) -> Result<ProcessingResult> {
        let spans = page_spans(options)?;
        let source = load_pdf(input.single_file()?)?;
        let page_count = source.page_count();
        let selection = PageSelection::resolve(spans, page_count)?;
        let kept = selection.complement(page_count);
        if kept.is_empty() {
            warn!(page_count, "Every page deleted, result has no pages");
        }

        let mut assembler = PageAssembler::new();
        assembler.append_pages(&source, &kept)?;
        let bytes = assembler.finish().save()?;
        info!(page_count, deleted = selection.len(), kept = kept.len(), "Pages deleted");
        Ok(Artifact::pdf(bytes, "deleted.pdf").into())
    }
}

/// Turn every page clockwise by the same angle.
pub struct RotatePages;

impl Operation for RotatePages {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, options: &ToolOptions) -> Result<ProcessingResult> {
        let rotation = match options {
            ToolOptions::Rotate(rotation) => *rotation,
            _ => Rotation::default(),
        };
        let mut document = load_pdf(input.single_file()?)?;
        document.rotate_all_pages(rotation.degrees())?;
        let bytes = document.save()?;
        Ok(Artifact::pdf(bytes, "rotate-pdf.pdf").into())
    }
}

/// Burn form fields and annotation appearances into the pages.
pub struct FlattenForms;

impl Operation for FlattenForms {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, _options: &ToolOptions) -> Result<ProcessingResult> {
        let mut document = load_pdf(input.single_file()?)?;
        document.flatten()?;
        let bytes = document.save()?;
        Ok(Artifact::pdf(bytes, "flatten-pdf.pdf").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::{files, pdf_file};
    use pdfmaster_core::options::parse_page_range;
    use pdfmaster_document::PdfReader;
    use pdfmaster_document::fixtures::{
        FixturePage, build_pdf, labeled_pdf, page_labels, prefixed_pdf,
    };

    fn pages(expr: &str) -> ToolOptions {
        ToolOptions::Pages(parse_page_range(expr).expect("valid range"))
    }

    #[test]
    fn merge_concatenates_in_arrival_order() {
        let input = files(vec![
            pdf_file("a.pdf", prefixed_pdf("A", 2)),
            pdf_file("b.pdf", prefixed_pdf("B", 1)),
            pdf_file("c.pdf", prefixed_pdf("C", 3)),
        ]);
        let result = MergeDocuments.execute(&input, &ToolOptions::None).expect("merge");

        assert_eq!(result.artifact.filename, "merged.pdf");
        assert_eq!(result.artifact.mime_type, "application/pdf");
        assert_eq!(
            page_labels(&result.artifact.bytes),
            vec!["A 1", "A 2", "B 1", "C 1", "C 2", "C 3"]
        );
    }

    #[test]
    fn merge_names_the_broken_file() {
        let input = files(vec![
            pdf_file("good.pdf", labeled_pdf(1)),
            pdf_file("broken.pdf", b"%PDF-1.7 nonsense".to_vec()),
        ]);
        match MergeDocuments.execute(&input, &ToolOptions::None) {
            Err(PdfMasterError::PdfError(msg)) => assert!(msg.starts_with("broken.pdf:"), "{msg}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn split_and_delete_are_complements() {
        let input = files(vec![pdf_file("doc.pdf", labeled_pdf(6))]);
        let options = pages("5,1-2,2");

        let split = SplitDocument.execute(&input, &options).expect("split");
        let deleted = DeletePages.execute(&input, &options).expect("delete");

        assert_eq!(split.artifact.filename, "split.pdf");
        assert_eq!(deleted.artifact.filename, "deleted.pdf");
        assert_eq!(page_labels(&split.artifact.bytes), vec!["Page 5", "Page 1", "Page 2"]);
        assert_eq!(
            page_labels(&deleted.artifact.bytes),
            vec!["Page 3", "Page 4", "Page 6"]
        );
    }

    #[test]
    fn out_of_range_selection_fails() {
        let input = files(vec![pdf_file("doc.pdf", labeled_pdf(3))]);
        let err = SplitDocument.execute(&input, &pages("2-4")).unwrap_err();
        assert!(matches!(err, PdfMasterError::PageOutOfRange { page: 4, page_count: 3 }));
    }

    #[test]
    fn deleting_every_page_leaves_an_empty_document() {
        let input = files(vec![pdf_file("doc.pdf", labeled_pdf(2))]);
        let result = DeletePages.execute(&input, &pages("1-2")).expect("delete");
        let reader = PdfReader::from_bytes(&result.artifact.bytes).expect("valid pdf");
        assert_eq!(reader.page_count(), 0);
    }

    #[test]
    fn split_without_pages_option_fails() {
        let input = files(vec![pdf_file("doc.pdf", labeled_pdf(2))]);
        let err = SplitDocument.execute(&input, &ToolOptions::None).unwrap_err();
        assert!(matches!(err, PdfMasterError::MissingOption("pages")));
    }

    #[test]
    fn rotate_sets_every_page() {
        let input = files(vec![pdf_file("doc.pdf", labeled_pdf(3))]);
        let result = RotatePages
            .execute(&input, &ToolOptions::Rotate(Rotation::ThreeQuarter))
            .expect("rotate");
        assert_eq!(result.artifact.filename, "rotate-pdf.pdf");

        let reader = PdfReader::from_bytes(&result.artifact.bytes).expect("valid pdf");
        assert_eq!(reader.page_rotations(), vec![270, 270, 270]);
    }

    #[test]
    fn flatten_removes_the_form() {
        let bytes = build_pdf(&[FixturePage::labeled("Form").with_widget("value")]);
        let input = files(vec![pdf_file("form.pdf", bytes)]);
        let result = FlattenForms.execute(&input, &ToolOptions::None).expect("flatten");
        assert_eq!(result.artifact.filename, "flatten-pdf.pdf");

        let document = lopdf::Document::load_mem(&result.artifact.bytes).expect("valid pdf");
        assert!(document.catalog().expect("catalog").get(b"AcroForm").is_err());
        assert_eq!(page_labels(&result.artifact.bytes), vec!["Form"]);
    }
}
