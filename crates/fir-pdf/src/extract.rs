//! PDF text extraction
//!
//! Pages are read in page-number order. A page that yields no text (for
//! example a scanned image) contributes nothing; the remaining page texts
//! are joined with a newline and the result is trimmed.
//!
//! # Example
//! ```no_run
//! use fir_pdf::{extract_upload, PdfError};
//!
//! fn handle(bytes: &[u8]) -> Result<String, PdfError> {
//!     extract_upload(bytes, &std::env::temp_dir())
//! }
//! ```

use std::io::Write;
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::PdfError;

/// Extract the text of a PDF already on disk
pub fn extract_text_from_path(path: &Path) -> Result<String, PdfError> {
    let doc = Document::load(path).map_err(|e| PdfError::Parse(e.to_string()))?;
    extract_document(&doc)
}

/// Extract the text of an in-memory PDF
pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    extract_document(&doc)
}

/// Stage uploaded bytes in a transient file and extract its text
///
/// The file is named `temp_<random>.pdf` inside `temp_dir` and is removed
/// when this function returns, whether or not extraction succeeded.
pub fn extract_upload(bytes: &[u8], temp_dir: &Path) -> Result<String, PdfError> {
    let mut staged = tempfile::Builder::new()
        .prefix("temp_")
        .suffix(".pdf")
        .tempfile_in(temp_dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    debug!(path = %staged.path().display(), size = bytes.len(), "Staged upload");

    // `staged` is dropped (and unlinked) on every return path below
    extract_text_from_path(staged.path())
}

/// Tail of the placeholder lopdf emits for text in an encoding it cannot decode
const UNDECODED_SUFFIX: &str = " Unimplemented?";

/// Remove lopdf's `?<Encoding> Unimplemented?` placeholders
///
/// A run of glyphs in, say, an Identity-H font without a ToUnicode map is
/// text we could not read, not text on the page.
fn strip_undecoded_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(end) = rest.find(UNDECODED_SUFFIX) {
        let marker_end = end + UNDECODED_SUFFIX.len();
        match rest[..end].rfind('?') {
            Some(start) if !rest[start + 1..end].contains(char::is_whitespace) => {
                out.push_str(&rest[..start]);
            }
            _ => out.push_str(&rest[..marker_end]),
        }
        rest = &rest[marker_end..];
    }
    out.push_str(rest);
    out
}

fn extract_document(doc: &Document) -> Result<String, PdfError> {
    let mut page_texts = Vec::new();

    // get_pages is a BTreeMap keyed by page number, so this is page order
    for page_number in doc.get_pages().keys() {
        let text = doc
            .extract_text(&[*page_number])
            .map_err(|e| PdfError::Parse(format!("page {}: {}", page_number, e)))?;
        let text = strip_undecoded_markers(&text);
        let text = text.trim_end();
        if !text.trim().is_empty() {
            page_texts.push(text.to_string());
        }
    }

    debug!(
        pages = doc.get_pages().len(),
        pages_with_text = page_texts.len(),
        "Extracted PDF text"
    );

    Ok(page_texts.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, DocumentInfo, PageSize};
    use lopdf::{content::Content, content::Operation, dictionary, Dictionary, Object, Stream};

    fn text_pdf(pages: &[&str]) -> Vec<u8> {
        let mut canvas = Canvas::new(PageSize::A4);
        for (i, text) in pages.iter().enumerate() {
            if i > 0 {
                canvas.show_page();
            }
            if !text.is_empty() {
                canvas.draw_string(72.0, 700.0, text);
            }
        }
        canvas.save(&DocumentInfo::default()).unwrap()
    }

    // A page that only paints an image XObject, like a scanned sheet
    fn image_only_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0x80],
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        500.into(),
                        0.into(),
                        0.into(),
                        700.into(),
                        40.into(),
                        40.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im1" => Object::Reference(image_id),
                },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    // Page 1 is Helvetica/WinAnsi; page 2 shows glyph ids through a Type0
    // Identity-H font with no ToUnicode map
    fn readable_then_identity_h_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let helvetica_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "NotoSansDevanagari",
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
        });
        let type0_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NotoSansDevanagari",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        });

        let page = |doc: &mut Document, font_id, text: Vec<u8>| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => Object::Reference(font_id) },
                },
            })
        };
        let first = page(&mut doc, helvetica_id, b"Readable first page".to_vec());
        let second = page(&mut doc, type0_id, vec![0x00, 0x2A, 0x00, 0x31]);

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(first), Object::Reference(second)],
                "Count" => 2,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_single_page_text() {
        let pdf = text_pdf(&["Complaint registered at station"]);
        let text = extract_text_from_mem(&pdf).unwrap();
        assert!(text.contains("Complaint registered at station"));
    }

    #[test]
    fn test_pages_joined_in_order() {
        let pdf = text_pdf(&["alpha page", "beta page"]);
        let text = extract_text_from_mem(&pdf).unwrap();
        let alpha = text.find("alpha page").unwrap();
        let beta = text.find("beta page").unwrap();
        assert!(alpha < beta);
        assert!(text[alpha..beta].contains('\n'));
    }

    #[test]
    fn test_blank_pages_contribute_nothing() {
        let pdf = text_pdf(&["", "only text", ""]);
        let text = extract_text_from_mem(&pdf).unwrap();
        assert_eq!(text, "only text");
    }

    #[test]
    fn test_image_only_pdf_yields_empty_string() {
        let text = extract_text_from_mem(&image_only_pdf()).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_undecodable_page_contributes_nothing() {
        let text = extract_text_from_mem(&readable_then_identity_h_pdf()).unwrap();
        assert_eq!(text, "Readable first page");
    }

    #[test]
    fn test_strip_undecoded_markers() {
        assert_eq!(strip_undecoded_markers("?Identity-H Unimplemented?"), "");
        assert_eq!(
            strip_undecoded_markers("before ?Identity-V Unimplemented? after"),
            "before  after"
        );
        assert_eq!(
            strip_undecoded_markers("Is this Unimplemented?"),
            "Is this Unimplemented?"
        );
        assert_eq!(strip_undecoded_markers("plain text"), "plain text");
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = extract_text_from_mem(b"this is not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_upload_removes_transient_file_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = text_pdf(&["uploaded text"]);

        let text = extract_upload(&pdf, dir.path()).unwrap();
        assert_eq!(text, "uploaded text");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_upload_removes_transient_file_on_failure() {
        let dir = tempfile::tempdir().unwrap();

        let result = extract_upload(b"garbage", dir.path());
        assert!(matches!(result, Err(PdfError::Parse(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
