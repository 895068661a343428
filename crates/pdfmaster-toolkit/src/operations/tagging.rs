// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metadata-only strategies: the protect placeholder and best-effort PDF/A.

use chrono::Utc;
use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::options::PASSWORD_OPTION;
use pdfmaster_core::{ToolOptions, ToolkitConfig};
use pdfmaster_document::{DocumentInfo, PDFA_1B_XMP, PageAssembler};
use tracing::{instrument, warn};

use super::{Artifact, Notice, Operation, OperationInput, ProcessingResult, load_pdf};

/// Re-saves the document with new producer/creator strings.
///
/// No encryption is applied. The password is required so the tool behaves
/// like its real counterpart, but it is never written anywhere.
pub struct ProtectPlaceholder {
    producer: String,
    creator: String,
}

impl ProtectPlaceholder {
    pub fn new(config: &ToolkitConfig) -> Self {
        Self {
            producer: config.producer.clone(),
            creator: config.creator.clone(),
        }
    }
}

impl Operation for ProtectPlaceholder {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, options: &ToolOptions) -> Result<ProcessingResult> {
        if !matches!(options, ToolOptions::Password(password) if !password.is_empty()) {
            return Err(PdfMasterError::MissingOption(PASSWORD_OPTION));
        }

        let mut document = load_pdf(input.single_file()?)?;
        document.apply_info(&DocumentInfo {
            producer: Some(self.producer.clone()),
            creator: Some(self.creator.clone()),
            ..DocumentInfo::default()
        })?;
        let bytes = document.save()?;

        warn!("Protect produced an unencrypted placeholder");
        Ok(ProcessingResult {
            artifact: Artifact::pdf(bytes, "protected.pdf"),
            notices: vec![Notice::NotEncrypted],
        })
    }
}

/// Copies all pages into a fresh document, stamps metadata and declares
/// PDF/A-1B in XMP. Fonts are not embedded and nothing is validated.
pub struct PdfAConversion {
    producer: String,
    creator: String,
}

impl PdfAConversion {
    pub fn new(config: &ToolkitConfig) -> Self {
        Self {
            producer: config.producer.clone(),
            creator: config.creator.clone(),
        }
    }
}

impl Operation for PdfAConversion {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, _options: &ToolOptions) -> Result<ProcessingResult> {
        let source = load_pdf(input.single_file()?)?;
        let mut assembler = PageAssembler::new();
        assembler.append_all(&source)?;
        let mut document = assembler.finish();

        let now = Utc::now();
        document.apply_info(&DocumentInfo {
            producer: Some(self.producer.clone()),
            creator: Some(self.creator.clone()),
            creation_date: Some(now),
            modification_date: Some(now),
        })?;
        document.attach_xmp(PDFA_1B_XMP)?;
        let bytes = document.save()?;

        Ok(ProcessingResult {
            artifact: Artifact::pdf(bytes, "converted_to_pdfa.pdf"),
            notices: vec![Notice::BestEffortPdfA],
        })
    }
}
