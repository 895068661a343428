// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document information dictionary and XMP metadata.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfmaster_core::error::{PdfMasterError, Result};

use super::objects::{catalog_mut, text_string};

/// XMP packet declaring PDF/A-1B conformance.
///
/// Only the identification schema is written; the rest of the document is
/// not brought into conformance (fonts are not embedded, no output intent).
/// The packet header carries the U+FEFF byte-order mark XMP requires.
pub const PDFA_1B_XMP: &str = concat!(
    "<?xpacket begin=\"\u{FEFF}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n",
    r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/">
      <pdfaid:part>1</pdfaid:part>
      <pdfaid:conformance>B</pdfaid:conformance>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#
);

/// Fields written into the trailer's /Info dictionary. `None` leaves the
/// existing entry alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub producer: Option<String>,
    pub creator: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub modification_date: Option<DateTime<Utc>>,
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub fn pdf_date(date: DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%SZ").to_string()
}

pub(crate) fn apply_info(document: &mut Document, info: &DocumentInfo) -> Result<()> {
    let mut entries: Vec<(&str, Object)> = Vec::new();
    if let Some(producer) = &info.producer {
        entries.push(("Producer", text_string(producer)));
    }
    if let Some(creator) = &info.creator {
        entries.push(("Creator", text_string(creator)));
    }
    if let Some(date) = info.creation_date {
        entries.push(("CreationDate", Object::string_literal(pdf_date(date))));
    }
    if let Some(date) = info.modification_date {
        entries.push(("ModDate", Object::string_literal(pdf_date(date))));
    }
    if entries.is_empty() {
        return Ok(());
    }

    let info_dict = info_dictionary_mut(document)?;
    for (key, value) in entries {
        info_dict.set(key, value);
    }
    Ok(())
}

/// The /Info dictionary, created (as an indirect object) if absent.
fn info_dictionary_mut(document: &mut Document) -> Result<&mut Dictionary> {
    let existing = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    let id = match existing {
        Some(id) if document.get_dictionary(id).is_ok() => id,
        _ => {
            // An inline /Info is legal but unusual; move its entries into a
            // fresh indirect object.
            let inline = match document.trailer.get(b"Info") {
                Ok(Object::Dictionary(dict)) => dict.clone(),
                _ => Dictionary::new(),
            };
            let id = document.add_object(inline);
            document.trailer.set("Info", Object::Reference(id));
            id
        }
    };

    match document.get_object_mut(id) {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        _ => Err(PdfMasterError::PdfError(
            "document information is not a dictionary".to_string(),
        )),
    }
}

pub(crate) fn attach_xmp(document: &mut Document, xmp: &str) -> Result<ObjectId> {
    let stream = Stream::new(
        Dictionary::from_iter([
            ("Type", Object::Name(b"Metadata".to_vec())),
            ("Subtype", Object::Name(b"XML".to_vec())),
        ]),
        xmp.as_bytes().to_vec(),
    )
    // XMP must stay readable by tools that do not decode PDF filters.
    .with_compression(false);
    let id = document.add_object(stream);
    catalog_mut(document)?.set("Metadata", Object::Reference(id));
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::labeled_pdf;
    use crate::pdf::reader::PdfReader;
    use chrono::TimeZone;

    #[test]
    fn pdf_date_format() {
        let date = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).single().expect("date");
        assert_eq!(pdf_date(date), "D:20260307090501Z");
    }

    #[test]
    fn info_is_created_when_missing() {
        let mut document = Document::load_mem(&labeled_pdf(1)).expect("load");
        document.trailer.remove(b"Info");

        apply_info(
            &mut document,
            &DocumentInfo {
                producer: Some("PDFMaster".into()),
                ..DocumentInfo::default()
            },
        )
        .expect("apply");

        let reader = PdfReader::from_document(document);
        assert_eq!(reader.info_entry(b"Producer").as_deref(), Some("PDFMaster"));
        assert_eq!(reader.info_entry(b"Creator"), None);
    }

    #[test]
    fn xmp_is_reachable_from_catalog() {
        let mut reader = PdfReader::from_bytes(&labeled_pdf(1)).expect("load");
        reader.attach_xmp(PDFA_1B_XMP).expect("attach");
        let bytes = reader.save().expect("save");

        let reloaded = PdfReader::from_bytes(&bytes).expect("reload");
        let xmp = reloaded.xmp().expect("xmp present");
        assert!(xmp.contains("<pdfaid:part>1</pdfaid:part>"));
        assert!(xmp.contains("<pdfaid:conformance>B</pdfaid:conformance>"));
        assert!(xmp.starts_with("<?xpacket begin=\"\u{FEFF}\" id="));
    }

    #[test]
    fn packet_header_carries_the_byte_order_mark() {
        let header = PDFA_1B_XMP.lines().next().expect("header line");
        assert_eq!(
            header.as_bytes()[..20],
            *b"<?xpacket begin=\"\xEF\xBB\xBF"
        );
        assert!(PDFA_1B_XMP.ends_with("<?xpacket end=\"w\"?>"));
    }
}
