//! Helvetica font metrics and WinAnsi text encoding
//!
//! The standard 14 fonts are not embedded, so string widths come from the
//! Adobe AFM advance widths (units of 1/1000 em) for the printable ASCII
//! range. Bold and BoldOblique share the same widths.

/// Advance widths for `Helvetica`, code points 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Advance widths for `Helvetica-Bold` and `Helvetica-BoldOblique`, code points 32..=126
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Width used for bytes outside the printable ASCII table
const FALLBACK_WIDTH: u16 = 556;

/// Which width table a font uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metrics {
    Regular,
    Bold,
}

impl Metrics {
    fn table(self) -> &'static [u16; 95] {
        match self {
            Metrics::Regular => &HELVETICA_WIDTHS,
            Metrics::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of a single WinAnsi-encoded byte, in 1/1000 em
    pub fn glyph_width(self, byte: u8) -> u16 {
        match byte {
            32..=126 => self.table()[(byte - 32) as usize],
            // quoteleft / quoteright
            0x91 | 0x92 => match self {
                Metrics::Regular => 222,
                Metrics::Bold => 278,
            },
            _ => FALLBACK_WIDTH,
        }
    }

    /// Width of `text` in points at `size`
    pub fn string_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|b| self.glyph_width(b) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Encode text for a simple font with `/WinAnsiEncoding`
///
/// Latin-1 maps straight through; the typographic quotes and dashes map to
/// their cp1252 slots. Anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(Metrics::Regular.glyph_width(b' '), 278);
        assert_eq!(Metrics::Regular.glyph_width(b'W'), 944);
        assert_eq!(Metrics::Regular.glyph_width(b'i'), 222);
        assert_eq!(Metrics::Bold.glyph_width(b'i'), 278);
        assert_eq!(Metrics::Bold.glyph_width(b'~'), 584);
    }

    #[test]
    fn test_string_width_scales_with_size() {
        // "Flow Chart" in Helvetica-Bold
        let w14 = Metrics::Bold.string_width("Flow Chart", 14.0);
        let w7 = Metrics::Bold.string_width("Flow Chart", 7.0);
        assert!((w14 - 2.0 * w7).abs() < 0.001);
        // F(611) l(278) o(611) w(778) ' '(278) C(722) h(611) a(556) r(389) t(333) = 5167
        assert!((w14 - 5167.0 * 14.0 / 1000.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_string_has_zero_width() {
        assert_eq!(Metrics::Regular.string_width("", 12.0), 0.0);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Ab1"), b"Ab1".to_vec());
        assert_eq!(encode_win_ansi("Victim\u{2019}s"), b"Victim\x92s".to_vec());
        assert_eq!(encode_win_ansi("caf\u{e9}"), b"caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("\u{20b9}"), b"?".to_vec());
    }
}
