// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Form flattening. Each visible widget or markup annotation that carries a
// normal appearance stream is drawn into the page content as a form XObject;
// widgets are then removed from /Annots and the catalog's /AcroForm is
// dropped, leaving a document with no interactive fields.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfmaster_core::error::Result;
use tracing::{debug, warn};

use super::objects::{
    catalog_mut, inherited_attribute, is_name, number, rectangle, resolve, resolve_dict,
};

/// Annotation flag bit for "Hidden" (PDF 32000-1, table 165).
const FLAG_HIDDEN: i64 = 1 << 1;

/// Outcome of flattening a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenReport {
    /// Pages visited.
    pub pages: usize,
    /// Appearances burned into page content.
    pub flattened: usize,
    /// Annotations removed from /Annots (flattened ones included).
    pub removed: usize,
}

/// One appearance to draw onto a page.
struct Placement {
    stream_id: ObjectId,
    /// `cm` operands mapping the appearance box onto the annotation rect.
    matrix: [f32; 6],
}

pub(crate) fn flatten_forms(document: &mut Document) -> Result<FlattenReport> {
    let mut report = FlattenReport::default();
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();

    for page_id in page_ids {
        report.pages += 1;
        let annotations = page_annotations(document, page_id);
        if annotations.is_empty() {
            continue;
        }

        let mut keep = Vec::new();
        let mut placements = Vec::new();
        for annotation in annotations {
            let Some(dict) = resolve_dict(document, &annotation) else {
                keep.push(annotation);
                continue;
            };
            let is_widget = dict.get(b"Subtype").is_ok_and(|s| is_name(s, b"Widget"));
            let is_link_or_popup = dict
                .get(b"Subtype")
                .is_ok_and(|s| is_name(s, b"Link") || is_name(s, b"Popup"));
            let hidden = dict
                .get(b"F")
                .ok()
                .and_then(|f| f.as_i64().ok())
                .is_some_and(|flags| flags & FLAG_HIDDEN != 0);

            if is_link_or_popup {
                keep.push(annotation);
                continue;
            }

            match (hidden, placement(document, dict)) {
                (false, Some(placement)) => {
                    placements.push(placement);
                    report.removed += 1;
                }
                _ if is_widget => {
                    // Widgets without a usable appearance have nothing to draw.
                    report.removed += 1;
                }
                _ => keep.push(annotation),
            }
        }

        report.flattened += placements.len();
        draw_placements(document, page_id, &placements)?;
        set_annotations(document, page_id, keep);
    }

    if let Ok(catalog) = catalog_mut(document)
        && catalog.remove(b"AcroForm").is_some()
    {
        debug!("Interactive form removed from catalog");
    }

    Ok(report)
}

/// The page's annotation array, with an indirect /Annots resolved.
fn page_annotations(document: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = document.get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Annots").ok().and_then(|a| resolve(document, a)) {
        Some(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Work out which appearance stream to draw and where.
fn placement(document: &Document, annotation: &Dictionary) -> Option<Placement> {
    let rect = rectangle(document, annotation.get(b"Rect").ok()?)?;
    let appearances = resolve_dict(document, annotation.get(b"AP").ok()?)?;
    let normal = appearances.get(b"N").ok()?;

    // /N is either the stream itself or a dictionary of states keyed by /AS.
    let stream_id = match normal {
        Object::Reference(id) => match document.get_object(*id).ok()? {
            Object::Stream(_) => *id,
            Object::Dictionary(states) => state_stream(annotation, states)?,
            _ => return None,
        },
        Object::Dictionary(states) => state_stream(annotation, states)?,
        _ => return None,
    };

    let Ok(Object::Stream(stream)) = document.get_object(stream_id) else {
        return None;
    };
    let bbox = stream
        .dict
        .get(b"BBox")
        .ok()
        .and_then(|b| rectangle(document, b))
        .unwrap_or([0.0, 0.0, rect[2] - rect[0], rect[3] - rect[1]]);
    let form_matrix = stream
        .dict
        .get(b"Matrix")
        .ok()
        .and_then(|m| matrix(document, m))
        .unwrap_or([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    Some(Placement {
        stream_id,
        matrix: fit_box(transform_box(bbox, form_matrix), rect),
    })
}

fn state_stream(annotation: &Dictionary, states: &Dictionary) -> Option<ObjectId> {
    let chosen = match annotation.get(b"AS") {
        Ok(Object::Name(state)) => states.get(state).ok(),
        _ if states.len() == 1 => states.iter().next().map(|(_, v)| v),
        _ => None,
    };
    match chosen? {
        Object::Reference(id) => Some(*id),
        _ => None,
    }
}

fn matrix(document: &Document, object: &Object) -> Option<[f32; 6]> {
    let Some(Object::Array(items)) = resolve(document, object) else {
        return None;
    };
    if items.len() != 6 {
        return None;
    }
    let mut values = [0.0f32; 6];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = number(item)?;
    }
    Some(values)
}

/// Bounding box of `bbox` after applying `m`.
fn transform_box(bbox: [f32; 4], m: [f32; 6]) -> [f32; 4] {
    let corners = [
        (bbox[0], bbox[1]),
        (bbox[2], bbox[1]),
        (bbox[0], bbox[3]),
        (bbox[2], bbox[3]),
    ];
    let mut out = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
    for (x, y) in corners {
        let tx = m[0] * x + m[2] * y + m[4];
        let ty = m[1] * x + m[3] * y + m[5];
        out[0] = out[0].min(tx);
        out[1] = out[1].min(ty);
        out[2] = out[2].max(tx);
        out[3] = out[3].max(ty);
    }
    out
}

/// Scale-and-translate matrix mapping box `from` onto rect `to`.
fn fit_box(from: [f32; 4], to: [f32; 4]) -> [f32; 6] {
    let from_w = from[2] - from[0];
    let from_h = from[3] - from[1];
    let sx = if from_w.abs() > f32::EPSILON { (to[2] - to[0]) / from_w } else { 1.0 };
    let sy = if from_h.abs() > f32::EPSILON { (to[3] - to[1]) / from_h } else { 1.0 };
    [sx, 0.0, 0.0, sy, to[0] - from[0] * sx, to[1] - from[1] * sy]
}

/// Register each appearance as an XObject on the page and append the drawing
/// operators, with the existing content wrapped in q/Q.
fn draw_placements(
    document: &mut Document,
    page_id: ObjectId,
    placements: &[Placement],
) -> Result<()> {
    if placements.is_empty() {
        return Ok(());
    }

    // Copy the (possibly inherited or shared) resources onto the page so that
    // other pages keep their own resource dictionaries untouched.
    let mut resources = inherited_attribute(document, page_id, b"Resources")
        .and_then(|r| resolve_dict(document, &r).cloned())
        .unwrap_or_default();
    let mut xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|x| resolve_dict(document, x).cloned())
        .unwrap_or_default();

    let mut ops = String::from("Q\n");
    let mut counter = 0usize;
    for placement in placements {
        let name = loop {
            counter += 1;
            let candidate = format!("Flat{counter}");
            if !xobjects.has(candidate.as_bytes()) {
                break candidate;
            }
        };
        mark_as_form(document, placement.stream_id);
        xobjects.set(name.clone(), Object::Reference(placement.stream_id));
        let [a, b, c, d, e, f] = placement.matrix;
        ops.push_str(&format!("q {a} {b} {c} {d} {e} {f} cm /{name} Do Q\n"));
    }
    resources.set("XObject", Object::Dictionary(xobjects));

    let current = document
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Contents").ok());
    let existing = match current {
        Some(Object::Array(items)) => items.clone(),
        Some(Object::Reference(id)) => vec![Object::Reference(*id)],
        _ => Vec::new(),
    };
    let open_id = document.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let draw_id = document.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(draw_id));

    match document.get_object_mut(page_id) {
        Ok(Object::Dictionary(page)) => {
            page.set("Resources", Object::Dictionary(resources));
            page.set("Contents", Object::Array(contents));
            Ok(())
        }
        _ => {
            warn!(?page_id, "Page vanished while flattening");
            Ok(())
        }
    }
}

/// Appearance streams are form XObjects; make sure the dictionary says so.
fn mark_as_form(document: &mut Document, stream_id: ObjectId) {
    if let Ok(Object::Stream(stream)) = document.get_object_mut(stream_id) {
        if !stream.dict.has(b"Type") {
            stream.dict.set("Type", Object::Name(b"XObject".to_vec()));
        }
        if !stream.dict.has(b"Subtype") {
            stream.dict.set("Subtype", Object::Name(b"Form".to_vec()));
        }
    }
}

fn set_annotations(document: &mut Document, page_id: ObjectId, keep: Vec<Object>) {
    if let Ok(Object::Dictionary(page)) = document.get_object_mut(page_id) {
        if keep.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", Object::Array(keep));
        }
    }
}
