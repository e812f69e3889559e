//! First Information Report layout
//!
//! Two fixed templates share the same complaint pagination:
//! - `Summary`: title, victim, amount and the complaint text
//! - `Detailed`: dated header, section, ruled notes area, a titled flow
//!   chart placeholder box, then the complaint text
//!
//! Field values are rendered verbatim; nothing is validated or reformatted.
//! Complaint lines are never wrapped, so an overlong line runs past the
//! right margin.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{Canvas, DocumentInfo, Font, PageSize, MM};
use crate::error::PdfError;

/// Cursor floor; a row that would start below this goes to a new page
pub const BOTTOM_MARGIN: f32 = 50.0;

/// Vertical advance per complaint row
pub const COMPLAINT_LINE_HEIGHT: f32 = 15.0;

/// Number of ruled lines in the notes area
pub const NOTE_LINES: usize = 7;

/// Form fields accepted by the generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirForm {
    pub fir_no: String,
    #[serde(default)]
    pub fir_date: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    pub victim_name: String,
    pub fraud_amount: String,
    pub complaint_text: String,
}

impl FirForm {
    /// Complaint rows as drawn: split on newlines, each row trimmed
    pub fn complaint_lines(&self) -> impl Iterator<Item = &str> {
        self.complaint_text.split('\n').map(str::trim)
    }
}

/// Which template to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirLayout {
    Summary,
    Detailed,
}

impl FirLayout {
    /// Whether the layout prints the date and section fields
    pub fn uses_date_and_section(self) -> bool {
        matches!(self, FirLayout::Detailed)
    }
}

/// Output of a render
#[derive(Debug, Clone)]
pub struct RenderedFir {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Complaint rows drawn
    pub line_count: usize,
}

/// Draws FIR documents for a given layout
#[derive(Debug, Clone, Copy)]
pub struct FirRenderer {
    layout: FirLayout,
    page: PageSize,
}

impl FirRenderer {
    pub fn new(layout: FirLayout) -> Self {
        Self {
            layout,
            page: PageSize::A4,
        }
    }

    pub fn layout(&self) -> FirLayout {
        self.layout
    }

    pub fn render(&self, form: &FirForm) -> Result<RenderedFir, PdfError> {
        let mut canvas = Canvas::new(self.page);

        let line_count = match self.layout {
            FirLayout::Summary => self.draw_summary(&mut canvas, form),
            FirLayout::Detailed => self.draw_detailed(&mut canvas, form),
        };
        let page_count = canvas.page_count();

        let info = DocumentInfo {
            title: Some(format!("FIR {}", form.fir_no)),
            producer: Some(concat!("fir-pdf ", env!("CARGO_PKG_VERSION")).to_string()),
        };
        let bytes = canvas.save(&info)?;

        debug!(
            layout = ?self.layout,
            page_count,
            line_count,
            size = bytes.len(),
            "Rendered FIR"
        );

        Ok(RenderedFir {
            bytes,
            page_count,
            line_count,
        })
    }

    fn draw_summary(&self, canvas: &mut Canvas, form: &FirForm) -> usize {
        let left = 50.0;
        let top = self.page.height - 50.0;
        let mut y = top;

        canvas.set_font(Font::HelveticaBold, 16.0);
        canvas.draw_string(left, y, &format!("FIR No.: {}", form.fir_no));
        y -= 30.0;

        canvas.set_font(Font::Helvetica, 12.0);
        canvas.draw_string(left, y, &format!("Victim Name: {}", form.victim_name));
        y -= 20.0;
        canvas.draw_string(left, y, &format!("Fraud Amount: {}", form.fraud_amount));
        y -= 40.0;

        canvas.set_font(Font::HelveticaBold, 14.0);
        canvas.draw_string(left, y, "Complaint Details:");
        y -= 20.0;

        draw_complaint(canvas, form, left, y, top)
    }

    fn draw_detailed(&self, canvas: &mut Canvas, form: &FirForm) -> usize {
        let width = self.page.width;
        let left = 30.0 * MM;
        let top = self.page.height - 30.0 * MM;
        let line_height = 14.0;
        let content_width = width - 2.0 * left;

        let fir_date = form.fir_date.as_deref().unwrap_or_default();
        let section = form.section.as_deref().unwrap_or_default();

        // Header block
        canvas.set_font(Font::HelveticaBold, 14.0);
        canvas.draw_string(
            left,
            top,
            &format!("FIR no.: {} dated {}", form.fir_no, fir_date),
        );

        canvas.set_font(Font::HelveticaBold, 12.0);
        canvas.draw_string(
            left,
            top - line_height * 1.5,
            &format!("Under Section: {}", section),
        );
        canvas.draw_string(
            left,
            top - line_height * 3.0,
            &format!("Victim\u{2019}s Name: {}", form.victim_name),
        );
        canvas.draw_string(
            left,
            top - line_height * 4.5,
            &format!("Total Fraud Amount: {} /- INR", form.fraud_amount),
        );

        // Notes area
        let notes_top = top - line_height * 6.5;
        canvas.set_font(Font::Helvetica, 11.0);
        canvas.draw_string(left, notes_top, "Notes:-");

        let first_rule = notes_top - 10.0;
        let rule_spacing = 15.0;
        for i in 0..NOTE_LINES {
            let y = first_rule - i as f32 * rule_spacing;
            canvas.line(left, y, left + content_width, y);
        }

        // Flow chart title, centered and underlined
        let title = "Flow Chart";
        let title_y = first_rule - rule_spacing * 8.0 - 10.0;
        let title_width = Canvas::string_width(title, Font::HelveticaBoldOblique, 14.0);
        canvas.set_font(Font::HelveticaBoldOblique, 14.0);
        canvas.draw_string((width - title_width) / 2.0, title_y, title);
        canvas.line(
            (width - title_width) / 2.0,
            title_y - 2.0,
            (width + title_width) / 2.0,
            title_y - 2.0,
        );

        // Placeholder box
        let box_top = title_y - 20.0;
        let box_height = 200.0;
        canvas.rect(left, box_top - box_height, content_width, box_height);

        let caption = "Flow chart diagram goes here";
        let caption_width = Canvas::string_width(caption, Font::Helvetica, 10.0);
        canvas.set_font(Font::Helvetica, 10.0);
        canvas.draw_string(
            (width - caption_width) / 2.0,
            box_top - box_height / 2.0,
            caption,
        );

        // Complaint text below the box
        let mut y = box_top - box_height - 30.0;
        canvas.set_font(Font::HelveticaBold, 14.0);
        canvas.draw_string(left, y, "Complaint Details:");
        y -= 20.0;

        draw_complaint(canvas, form, left, y, top)
    }
}

/// Draw complaint rows from `y` downward, breaking pages greedily
///
/// Returns the number of rows drawn.
fn draw_complaint(canvas: &mut Canvas, form: &FirForm, left: f32, mut y: f32, top: f32) -> usize {
    canvas.set_font(Font::Helvetica, 11.0);

    let mut drawn = 0;
    for line in form.complaint_lines() {
        if y < BOTTOM_MARGIN {
            canvas.show_page();
            canvas.set_font(Font::Helvetica, 11.0);
            y = top;
        }
        canvas.draw_string(left, y, line);
        y -= COMPLAINT_LINE_HEIGHT;
        drawn += 1;
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_text_from_mem;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn form(complaint: &str) -> FirForm {
        FirForm {
            fir_no: "117/2024".to_string(),
            fir_date: Some("01-02-2024".to_string()),
            section: Some("420 IPC".to_string()),
            victim_name: "Ravi Sharma".to_string(),
            fraud_amount: "25,000".to_string(),
            complaint_text: complaint.to_string(),
        }
    }

    fn numbered_lines(n: usize) -> String {
        (1..=n)
            .map(|i| format!("complaint line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_summary_single_page() {
        let rendered = FirRenderer::new(FirLayout::Summary)
            .render(&form("Caller posed as bank officer.\nAsked for OTP."))
            .unwrap();
        assert_eq!(rendered.page_count, 1);
        assert_eq!(rendered.line_count, 2);
        assert!(rendered.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_summary_text_is_extractable() {
        let rendered = FirRenderer::new(FirLayout::Summary)
            .render(&form("Caller posed as bank officer."))
            .unwrap();
        let text = extract_text_from_mem(&rendered.bytes).unwrap();
        assert!(text.contains("FIR No.: 117/2024"));
        assert!(text.contains("Victim Name: Ravi Sharma"));
        assert!(text.contains("Fraud Amount: 25,000"));
        assert!(text.contains("Complaint Details:"));
        assert!(text.contains("Caller posed as bank officer."));
    }

    #[test]
    fn test_detailed_text_is_extractable() {
        let rendered = FirRenderer::new(FirLayout::Detailed)
            .render(&form("Money moved to unknown wallet."))
            .unwrap();
        let text = extract_text_from_mem(&rendered.bytes).unwrap();
        assert!(text.contains("FIR no.: 117/2024 dated 01-02-2024"));
        assert!(text.contains("Under Section: 420 IPC"));
        assert!(text.contains("Total Fraud Amount: 25,000 /- INR"));
        assert!(text.contains("Notes:-"));
        assert!(text.contains("Flow Chart"));
        assert!(text.contains("Flow chart diagram goes here"));
        assert!(text.contains("Money moved to unknown wallet."));
    }

    #[test]
    fn test_values_rendered_verbatim() {
        let mut f = form("x");
        f.fir_no = String::new();
        f.fraud_amount = "about ten lakh".to_string();
        let rendered = FirRenderer::new(FirLayout::Summary).render(&f).unwrap();
        let text = extract_text_from_mem(&rendered.bytes).unwrap();
        assert!(text.contains("Fraud Amount: about ten lakh"));
    }

    #[test]
    fn test_detailed_tolerates_missing_date_and_section() {
        let mut f = form("x");
        f.fir_date = None;
        f.section = None;
        let rendered = FirRenderer::new(FirLayout::Detailed).render(&f).unwrap();
        assert_eq!(rendered.page_count, 1);
    }

    #[test]
    fn test_long_complaint_paginates() {
        let rendered = FirRenderer::new(FirLayout::Summary)
            .render(&form(&numbered_lines(100)))
            .unwrap();
        assert_eq!(rendered.line_count, 100);
        assert!(rendered.page_count >= 2);

        let text = extract_text_from_mem(&rendered.bytes).unwrap();
        assert!(text.contains("complaint line 1"));
        assert!(text.contains("complaint line 100"));
    }

    #[test]
    fn test_summary_page_break_position() {
        // First page fits rows from y = h - 160 down to the margin
        let first_page = ((PageSize::A4.height - 160.0 - BOTTOM_MARGIN) / COMPLAINT_LINE_HEIGHT)
            .floor() as usize
            + 1;

        let fits = FirRenderer::new(FirLayout::Summary)
            .render(&form(&numbered_lines(first_page)))
            .unwrap();
        assert_eq!(fits.page_count, 1);

        let spills = FirRenderer::new(FirLayout::Summary)
            .render(&form(&numbered_lines(first_page + 1)))
            .unwrap();
        assert_eq!(spills.page_count, 2);
    }

    #[test]
    fn test_detailed_paginates_sooner_than_summary() {
        let text = numbered_lines(30);
        let summary = FirRenderer::new(FirLayout::Summary)
            .render(&form(&text))
            .unwrap();
        let detailed = FirRenderer::new(FirLayout::Detailed)
            .render(&form(&text))
            .unwrap();
        assert_eq!(summary.page_count, 1);
        assert_eq!(detailed.page_count, 2);
    }

    #[test]
    fn test_overlong_line_is_not_wrapped() {
        let long_line = "word ".repeat(200);
        let rendered = FirRenderer::new(FirLayout::Summary)
            .render(&form(&long_line))
            .unwrap();
        assert_eq!(rendered.line_count, 1);
        assert_eq!(rendered.page_count, 1);
    }

    #[test]
    fn test_complaint_lines_trim_carriage_returns() {
        let f = form("first\r\n  second  \r\nthird");
        let lines: Vec<&str> = f.complaint_lines().collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// N embedded newlines always produce N + 1 drawn rows
        #[test]
        fn newline_count_determines_rows(newlines in 0usize..160) {
            let text = numbered_lines(newlines + 1);
            let rendered = FirRenderer::new(FirLayout::Summary).render(&form(&text)).unwrap();
            prop_assert_eq!(rendered.line_count, newlines + 1);
            prop_assert!(rendered.page_count >= 1);
            prop_assert!(rendered.page_count <= 1 + (newlines + 1) / 40);
        }
    }
}
