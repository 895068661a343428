// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfmaster-document — Document processing for PDFMaster.
//
// Provides structural PDF operations (page copying, rotation, form flattening,
// metadata tagging, JPEG stream extraction), PDF synthesis from text and
// images, raster image decoding, and zip packaging.

pub mod archive;
pub mod image;
pub mod pdf;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

// Re-export the primary structs so callers can use `pdfmaster_document::PdfReader` etc.
pub use archive::ZipPackager;
pub use crate::image::DecodedImage;
pub use pdf::{DocumentInfo, ImageScan, PDFA_1B_XMP, PageAssembler, PdfReader, PdfWriter, wrap_text};
