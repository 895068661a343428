// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small helpers over the lopdf object model shared by the PDF modules.

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfmaster_core::error::{PdfMasterError, Result};

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page-tree depth limit; guards against cyclic /Parent chains.
const MAX_TREE_DEPTH: usize = 64;

/// Follow a single reference; non-references are returned as-is.
pub(crate) fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve `object` to a dictionary, following one reference.
pub(crate) fn resolve_dict<'a>(
    document: &'a Document,
    object: &'a Object,
) -> Option<&'a Dictionary> {
    match resolve(document, object)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// True if `object` is the name `expected`.
pub(crate) fn is_name(object: &Object, expected: &[u8]) -> bool {
    matches!(object, Object::Name(name) if name.as_slice() == expected)
}

/// Numeric value of an Integer or Real.
pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

/// Read a four-number rectangle, normalised so that x0 <= x1 and y0 <= y1.
pub(crate) fn rectangle(document: &Document, object: &Object) -> Option<[f32; 4]> {
    let Some(Object::Array(items)) = resolve(document, object) else {
        return None;
    };
    if items.len() != 4 {
        return None;
    }
    let mut values = [0.0f32; 4];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = number(resolve(document, item)?)?;
    }
    Some([
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ])
}

/// Look up `key` on a page, walking up the /Parent chain for inheritable
/// attributes. Returns an owned copy so callers can mutate the document.
pub(crate) fn inherited_attribute(
    document: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<Object> {
    let mut current = document.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        current = match current.get(b"Parent") {
            Ok(parent) => resolve_dict(document, parent)?,
            Err(_) => return None,
        };
    }
    None
}

/// Object id of the document catalog.
pub(crate) fn catalog_id(document: &Document) -> Result<ObjectId> {
    match document.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => Ok(*id),
        _ => Err(PdfMasterError::PdfError(
            "trailer has no /Root reference".to_string(),
        )),
    }
}

/// Mutable access to the catalog dictionary.
pub(crate) fn catalog_mut(document: &mut Document) -> Result<&mut Dictionary> {
    let id = catalog_id(document)?;
    match document.get_object_mut(id) {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        _ => Err(PdfMasterError::PdfError(
            "catalog is not a dictionary".to_string(),
        )),
    }
}

/// Encode a text string: literal for ASCII, UTF-16BE with BOM otherwise.
pub(crate) fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, lopdf::StringFormat::Hexadecimal)
}
