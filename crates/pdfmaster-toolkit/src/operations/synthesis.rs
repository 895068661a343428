// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthesis strategies: new PDFs built from a text buffer or from images.

use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::{ToolOptions, ToolkitConfig};
use pdfmaster_document::{DecodedImage, PdfWriter};
use tracing::{debug, instrument};

use super::{Artifact, Operation, OperationInput, ProcessingResult};

/// Lay the text buffer out on as many pages as it needs.
pub struct TextToPdf {
    writer: PdfWriter,
}

impl TextToPdf {
    pub fn new(config: &ToolkitConfig) -> Self {
        let mut writer = PdfWriter::from_config(config);
        writer.set_title("Text document");
        Self { writer }
    }
}

impl Operation for TextToPdf {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, _options: &ToolOptions) -> Result<ProcessingResult> {
        let text = input
            .text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(PdfMasterError::EmptyInput("text"))?;
        let bytes = self.writer.create_from_text(text)?;
        Ok(Artifact::pdf(bytes, "text_converted.pdf").into())
    }
}

/// One page per image, in arrival order.
pub struct ImagesToPdf {
    writer: PdfWriter,
}

impl ImagesToPdf {
    pub fn new(config: &ToolkitConfig) -> Self {
        let mut writer = PdfWriter::from_config(config);
        writer.set_title("Images");
        Self { writer }
    }
}

impl Operation for ImagesToPdf {
    #[instrument(skip_all, fields(files = input.files().len()))]
    fn execute(&self, input: &OperationInput, _options: &ToolOptions) -> Result<ProcessingResult> {
        let files = input.files();
        if files.is_empty() {
            return Err(PdfMasterError::EmptyInput("files"));
        }

        // Decode one image at a time so failures name the offending file.
        let mut images = Vec::with_capacity(files.len());
        for file in files {
            let image = DecodedImage::from_bytes(&file.bytes).map_err(|err| match err {
                PdfMasterError::ImageError(msg) => {
                    PdfMasterError::ImageError(format!("{}: {}", file.name, msg))
                }
                other => other,
            })?;
            debug!(name = %file.name, width = image.width, height = image.height, "Image decoded");
            images.push(image);
        }

        let bytes = self.writer.create_from_images(&images)?;
        Ok(Artifact::pdf(bytes, "converted.pdf").into())
    }
}
