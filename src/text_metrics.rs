//! Advance widths for the PDF base-14 Helvetica faces.
//!
//! Report text is set in the standard Helvetica family, which every PDF viewer
//! carries, so widths come from the published AFM tables instead of a font
//! file. Widths are in 1/1000 em.

pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

const DEFAULT_WIDTH: u16 = 556;
const DEGREE_WIDTH: u16 = 400;

// ASCII 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::Regular, FontStyle::Bold, FontStyle::Oblique];

    pub fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Oblique => "Helvetica-Oblique",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Oblique => "F3",
        }
    }

    fn table(self) -> &'static [u16; 95] {
        match self {
            FontStyle::Bold => &HELVETICA_BOLD,
            FontStyle::Regular | FontStyle::Oblique => &HELVETICA,
        }
    }
}

pub fn char_width(ch: char, style: FontStyle) -> u16 {
    match ch {
        ' '..='~' => style.table()[ch as usize - 32],
        '\u{b0}' => DEGREE_WIDTH,
        _ => DEFAULT_WIDTH,
    }
}

pub fn text_width_pt(text: &str, font_size: f32, style: FontStyle) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let units: u32 = text.chars().map(|ch| char_width(ch, style) as u32).sum();
    units as f32 / 1000.0 * font_size
}

pub fn text_width_mm(text: &str, font_size: f32, style: FontStyle) -> f32 {
    text_width_pt(text, font_size, style) / POINTS_PER_MM
}

/// Greedy word wrap at `max_width_mm`, keeping only the first line. A leading
/// word too long for the line is broken between characters.
pub fn fit_to_width(text: &str, max_width_mm: f32, font_size: f32, style: FontStyle) -> String {
    let text = text.trim();
    if text_width_mm(text, font_size, style) <= max_width_mm {
        return text.to_string();
    }

    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if text_width_mm(&candidate, font_size, style) <= max_width_mm {
            line = candidate;
            continue;
        }
        if line.is_empty() {
            return break_word(word, max_width_mm, font_size, style);
        }
        break;
    }
    line
}

fn break_word(word: &str, max_width_mm: f32, font_size: f32, style: FontStyle) -> String {
    let max_pt = max_width_mm * POINTS_PER_MM;
    let mut out = String::new();
    let mut width = 0.0;
    for ch in word.chars() {
        let advance = char_width(ch, style) as f32 / 1000.0 * font_size;
        if width + advance > max_pt && !out.is_empty() {
            break;
        }
        width += advance;
        out.push(ch);
    }
    out
}

/// Encodes text for a WinAnsi simple font. Characters outside the encoding
/// become `?`.
pub fn to_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}
