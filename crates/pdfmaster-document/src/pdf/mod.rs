// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading, assembling, rotating, flattening, tagging and
// creating PDFs.

pub mod assembler;
mod encoding;
pub mod flatten;
pub mod images;
pub mod metadata;
mod objects;
pub mod reader;
pub mod writer;

pub use assembler::PageAssembler;
pub use flatten::FlattenReport;
pub use images::{EmbeddedImage, ImageScan};
pub use metadata::{DocumentInfo, PDFA_1B_XMP};
pub use reader::PdfReader;
pub use writer::{PdfWriter, TextLayout, wrap_text};
