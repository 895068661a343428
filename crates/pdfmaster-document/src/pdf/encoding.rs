// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-byte text encoding for the standard Type1 fonts.
//
// printpdf writes builtin-font strings as UTF-8 bytes, but the standard fonts
// read one byte per glyph through WinAnsiEncoding. Synthesized documents are
// passed through `reencode_builtin_text` so that every character up to
// U+00FF, plus the Windows-1252 punctuation block, renders as itself.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId, Stream};
use pdfmaster_core::error::{PdfMasterError, Result};
use tracing::debug;

use super::objects::is_name;

/// Glyph used for characters WinAnsiEncoding cannot represent.
const REPLACEMENT: u8 = b'?';

/// Windows-1252 assignments for 0x80..=0x9F; `None` marks unused codes.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
    Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
    None, Some('‘'), Some('’'), Some('“'), Some('”'), Some('•'), Some('–'), Some('—'),
    Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
];

/// Encode `text` one byte per character. Characters outside WinAnsiEncoding
/// become `?`, so the byte count always equals the character count.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(ch: char) -> u8 {
    let code = ch as u32;
    if code < 0x80 || (0xA0..=0xFF).contains(&code) {
        return code as u8;
    }
    CP1252_HIGH
        .iter()
        .position(|slot| *slot == Some(ch))
        .map(|offset| 0x80 + offset as u8)
        .unwrap_or(REPLACEMENT)
}

/// Rewrite a document produced with builtin fonts so that its text operands
/// are WinAnsi bytes and its standard fonts declare WinAnsiEncoding.
pub(crate) fn reencode_builtin_text(pdf: Vec<u8>) -> Result<Vec<u8>> {
    let mut document = Document::load_mem(&pdf)
        .map_err(|err| PdfMasterError::PdfError(format!("failed to reload PDF: {}", err)))?;

    declare_win_ansi(&mut document);

    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    let mut rewritten = 0usize;
    for page_id in page_ids {
        let raw = document.get_page_content(page_id).map_err(|err| {
            PdfMasterError::PdfError(format!("failed to read page content: {}", err))
        })?;
        let mut content = Content::decode(&raw).map_err(|err| {
            PdfMasterError::PdfError(format!("failed to parse page content: {}", err))
        })?;

        let mut changed = false;
        for operation in &mut content.operations {
            if matches!(operation.operator.as_str(), "Tj" | "TJ" | "'" | "\"") {
                for operand in &mut operation.operands {
                    changed |= reencode_operand(operand);
                }
            }
        }
        if !changed {
            continue;
        }

        let encoded = content.encode().map_err(|err| {
            PdfMasterError::PdfError(format!("failed to encode page content: {}", err))
        })?;
        let stream_id = document.add_object(Stream::new(lopdf::Dictionary::new(), encoded));
        if let Ok(Object::Dictionary(page)) = document.get_object_mut(page_id) {
            page.set("Contents", Object::Reference(stream_id));
        }
        rewritten += 1;
    }
    if rewritten > 0 {
        // The replaced content streams are no longer referenced.
        document.prune_objects();
    }
    debug!(pages = rewritten, "Builtin-font text re-encoded");

    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|err| PdfMasterError::PdfError(format!("failed to serialise PDF: {}", err)))?;
    Ok(output)
}

/// Re-encode one string operand (or the strings inside a TJ array). Returns
/// whether anything changed. Operands that are not valid UTF-8 are left alone.
fn reencode_operand(operand: &mut Object) -> bool {
    match operand {
        Object::String(bytes, _) => {
            let Ok(text) = std::str::from_utf8(bytes) else {
                return false;
            };
            let encoded = to_win_ansi(text);
            if encoded == *bytes {
                return false;
            }
            *bytes = encoded;
            true
        }
        Object::Array(items) => items
            .iter_mut()
            .fold(false, |changed, item| reencode_operand(item) | changed),
        _ => false,
    }
}

/// Standard Type1 fonts (no embedded program) get /Encoding /WinAnsiEncoding,
/// whether they are indirect objects or inlined in a resource dictionary.
fn declare_win_ansi(document: &mut Document) {
    for object in document.objects.values_mut() {
        declare_in(object);
    }
}

fn declare_in(object: &mut Object) {
    match object {
        Object::Dictionary(dict) => {
            let is_standard_type1 = dict.get(b"Type").is_ok_and(|t| is_name(t, b"Font"))
                && dict.get(b"Subtype").is_ok_and(|s| is_name(s, b"Type1"))
                && !dict.has(b"FontDescriptor");
            if is_standard_type1 {
                dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
                return;
            }
            for (_, value) in dict.iter_mut() {
                declare_in(value);
            }
        }
        Object::Array(items) => items.iter_mut().for_each(declare_in),
        _ => {}
    }
}
