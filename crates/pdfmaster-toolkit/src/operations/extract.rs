// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image extraction: every JPEG stream in the document, zipped as
// image_1.jpg, image_2.jpg, ...

use pdfmaster_core::error::{PdfMasterError, Result};
use pdfmaster_core::{ToolOptions, ZIP_MIME};
use pdfmaster_document::ZipPackager;
use tracing::{info, instrument, warn};

use super::{Artifact, Operation, OperationInput, ProcessingResult, load_pdf};

pub struct ExtractImages;

impl Operation for ExtractImages {
    #[instrument(skip_all)]
    fn execute(&self, input: &OperationInput, _options: &ToolOptions) -> Result<ProcessingResult> {
        let source = load_pdf(input.single_file()?)?;
        let scan = source.scan_images();
        if scan.jpegs.is_empty() {
            warn!(skipped = scan.skipped, "No JPEG images to extract");
            return Err(PdfMasterError::NoCompatibleImages);
        }

        let mut packager = ZipPackager::new();
        for (index, image) in scan.jpegs.iter().enumerate() {
            packager.add(&format!("image_{}.jpg", index + 1), &image.bytes)?;
        }
        let extracted = packager.entries();
        let bytes = packager.finish()?;
        info!(extracted, skipped = scan.skipped, "Images extracted");

        Ok(Artifact {
            bytes,
            filename: "extracted_images.zip".to_string(),
            mime_type: ZIP_MIME,
        }
        .into())
    }
}
