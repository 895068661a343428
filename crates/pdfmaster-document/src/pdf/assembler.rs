// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page assembler — builds a fresh document by copying pages out of one or
// more loaded sources. Merge, split, delete-pages and PDF/A tagging are all
// "create empty, copy selected pages, save".

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfmaster_core::error::{PdfMasterError, Result};
use tracing::{debug, instrument, warn};

use super::objects::{INHERITABLE, inherited_attribute, is_name};
use super::reader::PdfReader;

/// Accumulates copied pages into a new, initially empty document.
pub struct PageAssembler {
    document: Document,
    /// The /Pages node every copied page is attached to.
    pages_id: ObjectId,
    page_count: usize,
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAssembler {
    /// Start an empty document: a catalog and a page tree with no kids.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(Vec::new())),
                ("Count", Object::Integer(0)),
            ])),
        );
        let catalog_id = document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        document.trailer.set("Root", Object::Reference(catalog_id));

        Self {
            document,
            pages_id,
            page_count: 0,
        }
    }

    /// Pages copied so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Copy every page of `source`, in its original order.
    pub fn append_all(&mut self, source: &PdfReader) -> Result<usize> {
        let indices: Vec<usize> = (0..source.page_count()).collect();
        self.append_pages(source, &indices)
    }

    /// Copy the pages at the given 0-based `indices` of `source`, in the order
    /// given. An index past the end of the source is an error and nothing is
    /// copied.
    #[instrument(skip_all, fields(requested = indices.len()))]
    pub fn append_pages(&mut self, source: &PdfReader, indices: &[usize]) -> Result<usize> {
        let source_pages = source.page_ids();
        let mut page_ids = Vec::with_capacity(indices.len());
        for &index in indices {
            let page_id = source_pages.get(index).copied().ok_or(
                PdfMasterError::PageOutOfRange {
                    page: index + 1,
                    page_count: source_pages.len(),
                },
            )?;
            page_ids.push(page_id);
        }

        let mut importer = ObjectImporter::new(source.document());

        // Reserve target ids for every selected page up front so that links
        // between selected pages resolve to the copies.
        for &page_id in &page_ids {
            if !importer.id_map.contains_key(&page_id) {
                let new_id = self.document.new_object_id();
                importer.id_map.insert(page_id, new_id);
            }
        }

        for &page_id in &page_ids {
            let copied_id = importer.import_page(&mut self.document, page_id)?;
            self.attach_page(copied_id)?;
        }

        debug!(
            copied = page_ids.len(),
            imported_objects = importer.id_map.len(),
            total_pages = self.page_count,
            "Pages appended"
        );
        Ok(page_ids.len())
    }

    /// Hand the finished document over as a reader for metadata and saving.
    pub fn finish(self) -> PdfReader {
        PdfReader::from_document(self.document)
    }

    /// Append `page_id` to /Kids, bump /Count and point the page at its parent.
    fn attach_page(&mut self, page_id: ObjectId) -> Result<()> {
        match self.document.get_object_mut(self.pages_id) {
            Ok(Object::Dictionary(pages_dict)) => {
                if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
                    kids.push(Object::Reference(page_id));
                }
                if let Ok(count_obj) = pages_dict.get_mut(b"Count")
                    && let Object::Integer(count) = count_obj
                {
                    *count += 1;
                }
            }
            _ => {
                return Err(PdfMasterError::PdfError(
                    "output page tree is missing".to_string(),
                ));
            }
        }

        if let Ok(Object::Dictionary(page_dict)) = self.document.get_object_mut(page_id) {
            page_dict.set("Parent", Object::Reference(self.pages_id));
        }
        self.page_count += 1;
        Ok(())
    }
}

/// Copies objects from one source document into a target, following
/// references. Each source object is copied at most once per importer, so
/// resources shared between pages stay shared and reference cycles terminate.
struct ObjectImporter<'a> {
    source: &'a Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectImporter<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            id_map: HashMap::new(),
        }
    }

    /// Copy a page dictionary. Inherited attributes are materialised on the
    /// copy and /Parent is dropped; the caller re-parents the page.
    fn import_page(&mut self, target: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
        let page = self.source.get_dictionary(page_id).map_err(|err| {
            PdfMasterError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let mut page = page.clone();
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited_attribute(self.source, page_id, key)
            {
                page.set(key.to_vec(), value);
            }
        }
        page.remove(b"Parent");

        let new_id = match self.id_map.get(&page_id) {
            Some(id) => *id,
            None => {
                let id = target.new_object_id();
                self.id_map.insert(page_id, id);
                id
            }
        };
        let copied = self.import_dictionary(target, &page);
        target.objects.insert(new_id, Object::Dictionary(copied));
        Ok(new_id)
    }

    fn import_reference(&mut self, target: &mut Document, id: ObjectId) -> Object {
        if let Some(mapped) = self.id_map.get(&id) {
            return Object::Reference(*mapped);
        }

        let source = self.source;
        let object = match source.get_object(id) {
            Ok(object) => object,
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                return Object::Null;
            }
        };

        // Pages that were not selected (reached through annotation /P entries
        // or link destinations) are not pulled in; that would drag the whole
        // source page tree along.
        if let Object::Dictionary(dict) = object
            && let Ok(kind) = dict.get(b"Type")
            && (is_name(kind, b"Page") || is_name(kind, b"Pages"))
        {
            return Object::Null;
        }

        let new_id = target.new_object_id();
        self.id_map.insert(id, new_id);
        let copied = self.import_value(target, object);
        target.objects.insert(new_id, copied);
        Object::Reference(new_id)
    }

    fn import_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            copied.set(key.clone(), self.import_value(target, value));
        }
        copied
    }

    fn import_value(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.import_value(target, item))
                    .collect(),
            ),
            Object::Reference(id) => self.import_reference(target, *id),
            Object::Stream(stream) => {
                let dict = self.import_dictionary(target, &stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()))
            }
            // Boolean, Integer, Real, String, Name and Null copy as-is.
            other => other.clone(),
        }
    }
}
