// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — load, inspect, rotate, flatten, re-tag and save existing PDF
// documents using the `lopdf` crate.

use lopdf::{Document, Object, ObjectId};
use pdfmaster_core::error::{PdfMasterError, Result};
use tracing::{debug, info, instrument};

use super::flatten::{FlattenReport, flatten_forms};
use super::images::{ImageScan, scan_images};
use super::metadata::{DocumentInfo, apply_info, attach_xmp};
use super::objects::inherited_attribute;

/// Reads and manipulates an existing PDF document.
///
/// Wraps `lopdf::Document` and provides the page-level operations the toolkit
/// needs: page lookup, rotation, form flattening, metadata, image-stream
/// enumeration and serialisation.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            PdfMasterError::PdfError(format!("failed to load PDF: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    /// Wrap a document built in memory.
    pub(crate) fn from_document(document: Document) -> Self {
        Self { document }
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page object ids in document order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // lopdf keys pages by 1-indexed page number, so values come out in order.
        self.document.get_pages().into_values().collect()
    }

    /// Effective `/Rotate` of each page (inherited values included), in
    /// document order.
    pub fn page_rotations(&self) -> Vec<i64> {
        self.page_ids()
            .into_iter()
            .map(|id| self.rotation_of(id))
            .collect()
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    fn rotation_of(&self, page_id: ObjectId) -> i64 {
        inherited_attribute(&self.document, page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
    }

    // -- Page operations ------------------------------------------------------

    /// Rotate every page clockwise by `degrees` (must be a multiple of 90).
    ///
    /// The angle composes with the page's existing rotation and the result is
    /// normalised to 0..360, so four quarter turns restore the original.
    #[instrument(skip(self), fields(degrees))]
    pub fn rotate_all_pages(&mut self, degrees: i64) -> Result<usize> {
        if degrees % 90 != 0 {
            return Err(PdfMasterError::PdfError(format!(
                "rotation must be a multiple of 90, got {}",
                degrees
            )));
        }

        let page_ids = self.page_ids();
        for &page_id in &page_ids {
            let existing_rotation = self.rotation_of(page_id);
            let new_rotation = (existing_rotation + degrees).rem_euclid(360);

            if let Ok(Object::Dictionary(dict)) = self.document.get_object_mut(page_id) {
                dict.set("Rotate", Object::Integer(new_rotation));
            }
            debug!(?page_id, existing_rotation, new_rotation, "Page rotated");
        }

        info!(pages = page_ids.len(), degrees, "All pages rotated");
        Ok(page_ids.len())
    }

    /// Burn form-field widgets and annotation appearances into page content
    /// and drop the interactive form.
    #[instrument(skip(self))]
    pub fn flatten(&mut self) -> Result<FlattenReport> {
        let report = flatten_forms(&mut self.document)?;
        info!(
            pages = report.pages,
            flattened = report.flattened,
            removed = report.removed,
            "Document flattened"
        );
        Ok(report)
    }

    /// Enumerate image streams, collecting the JPEG-encoded ones verbatim.
    pub fn scan_images(&self) -> ImageScan {
        scan_images(&self.document)
    }

    // -- Metadata -------------------------------------------------------------

    pub fn set_producer(&mut self, producer: &str) -> Result<()> {
        self.apply_info(&DocumentInfo {
            producer: Some(producer.to_string()),
            ..DocumentInfo::default()
        })
    }

    pub fn set_creator(&mut self, creator: &str) -> Result<()> {
        self.apply_info(&DocumentInfo {
            creator: Some(creator.to_string()),
            ..DocumentInfo::default()
        })
    }

    /// Write the given fields into the /Info dictionary, leaving others alone.
    pub fn apply_info(&mut self, info: &DocumentInfo) -> Result<()> {
        apply_info(&mut self.document, info)
    }

    /// Read back an /Info string entry (e.g. `b"Producer"`), if it is ASCII.
    pub fn info_entry(&self, key: &[u8]) -> Option<String> {
        let info = match self.document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.document.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        match info.get(key).ok()? {
            Object::String(bytes, _) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    }

    /// Attach an XMP packet as the catalog's /Metadata stream.
    pub fn attach_xmp(&mut self, xmp: &str) -> Result<ObjectId> {
        attach_xmp(&mut self.document, xmp)
    }

    /// The catalog's XMP packet, if one is attached.
    pub fn xmp(&self) -> Option<String> {
        let catalog = self.document.catalog().ok()?;
        let Ok(Object::Reference(id)) = catalog.get(b"Metadata") else {
            return None;
        };
        match self.document.get_object(*id).ok()? {
            Object::Stream(stream) => String::from_utf8(stream.content.clone()).ok(),
            _ => None,
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Serialise the document.
    pub fn save(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            PdfMasterError::PdfError(format!("failed to serialise PDF: {}", err))
        })?;
        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}
