// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enumerate image XObjects. DCT-encoded streams are complete JPEG files and
// are returned byte-for-byte; everything else is counted and skipped.

use lopdf::{Document, Object, ObjectId, Stream};
use tracing::debug;

use super::objects::{is_name, resolve};

/// A JPEG image stream lifted out of a PDF unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub object_id: ObjectId,
    pub bytes: Vec<u8>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Result of walking a document's image streams.
#[derive(Debug, Clone, Default)]
pub struct ImageScan {
    /// JPEG images, in object-number order.
    pub jpegs: Vec<EmbeddedImage>,
    /// Image streams with any other encoding.
    pub skipped: usize,
}

pub(crate) fn scan_images(document: &Document) -> ImageScan {
    let mut scan = ImageScan::default();

    // `objects` is a BTreeMap, so iteration order is deterministic.
    for (&object_id, object) in &document.objects {
        let Object::Stream(stream) = object else {
            continue;
        };
        if !stream.dict.get(b"Subtype").is_ok_and(|s| is_name(s, b"Image")) {
            continue;
        }

        if is_dct(document, stream) {
            scan.jpegs.push(EmbeddedImage {
                object_id,
                bytes: stream.content.clone(),
                width: dimension(document, stream, b"Width"),
                height: dimension(document, stream, b"Height"),
            });
        } else {
            debug!(?object_id, "Skipping non-JPEG image stream");
            scan.skipped += 1;
        }
    }

    debug!(jpegs = scan.jpegs.len(), skipped = scan.skipped, "Image scan complete");
    scan
}

/// True when the stream's only filter is DCTDecode. A chain such as
/// [/FlateDecode /DCTDecode] would need decoding first, so it does not count.
fn is_dct(document: &Document, stream: &Stream) -> bool {
    let Some(filter) = stream
        .dict
        .get(b"Filter")
        .ok()
        .and_then(|f| resolve(document, f))
    else {
        return false;
    };
    match filter {
        Object::Name(_) => is_name(filter, b"DCTDecode"),
        Object::Array(items) => {
            items.len() == 1
                && resolve(document, &items[0]).is_some_and(|f| is_name(f, b"DCTDecode"))
        }
        _ => false,
    }
}

fn dimension(document: &Document, stream: &Stream, key: &[u8]) -> Option<i64> {
    stream
        .dict
        .get(key)
        .ok()
        .and_then(|v| resolve(document, v))
        .and_then(|v| v.as_i64().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FixturePage, build_pdf, tiny_jpeg};

    #[test]
    fn jpeg_streams_are_returned_verbatim() {
        let jpeg = tiny_jpeg();
        let bytes = build_pdf(&[
            FixturePage::labeled("one").with_jpeg(jpeg.clone()),
            FixturePage::labeled("two").with_raw_image(),
            FixturePage::labeled("three").with_jpeg(jpeg.clone()),
        ]);
        let document = Document::load_mem(&bytes).expect("load");

        let scan = scan_images(&document);
        assert_eq!(scan.jpegs.len(), 2);
        assert_eq!(scan.skipped, 1);
        assert!(scan.jpegs.iter().all(|img| img.bytes == jpeg));
        assert!(scan.jpegs[0].object_id < scan.jpegs[1].object_id);
        assert_eq!(scan.jpegs[0].width, Some(4));
    }

    #[test]
    fn document_without_images() {
        let document = Document::load_mem(&build_pdf(&[FixturePage::labeled("x")])).expect("load");
        let scan = scan_images(&document);
        assert!(scan.jpegs.is_empty());
        assert_eq!(scan.skipped, 0);
    }
}
