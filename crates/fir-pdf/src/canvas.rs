//! Minimal drawing surface over lopdf content streams
//!
//! Coordinates are PDF user space: origin bottom-left, units in points.
//! Each page collects its own operation list; `save` assembles the page tree
//! with one shared set of standard-14 font resources.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::PdfError;
use crate::metrics::{encode_win_ansi, Metrics};

/// Points per millimetre
pub const MM: f32 = 72.0 / 25.4;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4, 210 x 297 mm
    pub const A4: PageSize = PageSize {
        width: 210.0 * MM,
        height: 297.0 * MM,
    };
}

/// Standard 14 fonts used by the templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaBoldOblique,
}

impl Font {
    const ALL: [Font; 3] = [
        Font::Helvetica,
        Font::HelveticaBold,
        Font::HelveticaBoldOblique,
    ];

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::HelveticaBoldOblique => "F3",
        }
    }

    fn metrics(self) -> Metrics {
        match self {
            Font::Helvetica => Metrics::Regular,
            Font::HelveticaBold | Font::HelveticaBoldOblique => Metrics::Bold,
        }
    }
}

/// Document information dictionary entries
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: Option<String>,
}

/// A page-at-a-time drawing surface
pub struct Canvas {
    size: PageSize,
    font: Font,
    font_size: f32,
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
}

impl Canvas {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            font: Font::Helvetica,
            font_size: 12.0,
            finished: Vec::new(),
            current: Vec::new(),
        }
    }

    /// Select the font for subsequent `draw_string` calls
    pub fn set_font(&mut self, font: Font, size: f32) {
        self.font = font;
        self.font_size = size;
    }

    /// Width of `text` in points for the given font and size
    pub fn string_width(text: &str, font: Font, size: f32) -> f32 {
        font.metrics().string_width(text, size)
    }

    /// Draw `text` with its baseline starting at (x, y)
    pub fn draw_string(&mut self, x: f32, y: f32, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(self.font.resource_name().as_bytes().to_vec()),
                    Object::Real(self.font_size),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Stroke a straight line
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.current.extend([
            Operation::new("m", vec![Object::Real(x1), Object::Real(y1)]),
            Operation::new("l", vec![Object::Real(x2), Object::Real(y2)]),
            Operation::new("S", vec![]),
        ]);
    }

    /// Stroke an unfilled rectangle with its lower-left corner at (x, y)
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.current.extend([
            Operation::new("RG", vec![0.into(), 0.into(), 0.into()]),
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(y),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("S", vec![]),
        ]);
    }

    /// Close the current page and start a new one
    pub fn show_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.finished.push(page);
    }

    /// Number of pages, counting the open page
    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Assemble the document and serialize it
    pub fn save(mut self, info: &DocumentInfo) -> Result<Vec<u8>, PdfError> {
        self.show_page();

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => Object::Dictionary(fonts),
        });

        let mut page_ids: Vec<ObjectId> = Vec::with_capacity(self.finished.len());
        for operations in self.finished {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| PdfError::Render(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(self.size.width),
                    Object::Real(self.size.height),
                ],
                "Contents" => Object::Reference(content_id),
                "Resources" => Object::Reference(resources_id),
            });
            page_ids.push(page_id);
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => page_ids.len() as i64,
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info_dict = Dictionary::new();
        if let Some(title) = &info.title {
            info_dict.set("Title", Object::string_literal(encode_win_ansi(title)));
        }
        if let Some(producer) = &info.producer {
            info_dict.set("Producer", Object::string_literal(producer.as_bytes()));
        }
        info_dict.set(
            "CreationDate",
            Object::string_literal(format!("D:{}Z", Utc::now().format("%Y%m%d%H%M%S"))),
        );
        let info_id = doc.add_object(info_dict);
        doc.trailer.set("Info", Object::Reference(info_id));

        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::Render(format!("Save failed: {}", e)))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_dimensions() {
        assert!((PageSize::A4.width - 595.2756).abs() < 0.01);
        assert!((PageSize::A4.height - 841.8898).abs() < 0.01);
    }

    #[test]
    fn test_blank_canvas_saves_one_page() {
        let canvas = Canvas::new(PageSize::A4);
        let bytes = canvas.save(&DocumentInfo::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_show_page_adds_pages() {
        let mut canvas = Canvas::new(PageSize::A4);
        canvas.draw_string(50.0, 700.0, "first");
        canvas.show_page();
        canvas.draw_string(50.0, 700.0, "second");
        canvas.show_page();
        canvas.draw_string(50.0, 700.0, "third");
        assert_eq!(canvas.page_count(), 3);

        let bytes = canvas.save(&DocumentInfo::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_drawn_text_is_extractable() {
        let mut canvas = Canvas::new(PageSize::A4);
        canvas.set_font(Font::HelveticaBold, 16.0);
        canvas.draw_string(50.0, 790.0, "Hello FIR");
        canvas.line(50.0, 780.0, 300.0, 780.0);
        canvas.rect(50.0, 500.0, 200.0, 100.0);

        let bytes = canvas.save(&DocumentInfo::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Hello FIR"), "got: {:?}", text);
    }

    #[test]
    fn test_info_dictionary_is_written() {
        let canvas = Canvas::new(PageSize::A4);
        let info = DocumentInfo {
            title: Some("FIR 7".to_string()),
            producer: Some("fir-pdf".to_string()),
        };
        let bytes = canvas.save(&info).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let dict = doc.get_dictionary(info_id).unwrap();
        assert_eq!(dict.get(b"Title").unwrap().as_str().unwrap(), b"FIR 7");
    }
}
