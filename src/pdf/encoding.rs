// 標準14フォントの解決とWinAnsiEncodingへの文字列変換

use crate::error::StampError;
use crate::style::FontId;

/// PDFの標準14フォント。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

/// (フォント識別子, フォント) の対応表。識別子は小文字で比較する。
const FONT_TABLE: &[(&str, StandardFont)] = &[
    ("helv", StandardFont::Helvetica),
    ("helvb", StandardFont::HelveticaBold),
    ("helvi", StandardFont::HelveticaOblique),
    ("helvbi", StandardFont::HelveticaBoldOblique),
    ("times", StandardFont::TimesRoman),
    ("timesb", StandardFont::TimesBold),
    ("timesi", StandardFont::TimesItalic),
    ("timesbi", StandardFont::TimesBoldItalic),
    ("cour", StandardFont::Courier),
    ("courb", StandardFont::CourierBold),
    ("couri", StandardFont::CourierOblique),
    ("courbi", StandardFont::CourierBoldOblique),
];

const ALL_FONTS: [StandardFont; 14] = [
    StandardFont::Helvetica,
    StandardFont::HelveticaBold,
    StandardFont::HelveticaOblique,
    StandardFont::HelveticaBoldOblique,
    StandardFont::TimesRoman,
    StandardFont::TimesBold,
    StandardFont::TimesItalic,
    StandardFont::TimesBoldItalic,
    StandardFont::Courier,
    StandardFont::CourierBold,
    StandardFont::CourierOblique,
    StandardFont::CourierBoldOblique,
    StandardFont::Symbol,
    StandardFont::ZapfDingbats,
];

impl StandardFont {
    /// フォント識別子を描画可能なフォントに解決する。
    ///
    /// 対応表の12識別子に加え、標準14フォントのPostScript名
    /// (大文字小文字は無視) を受け付ける。それ以外は RenderError。
    pub fn from_font_id(id: &FontId) -> crate::error::Result<Self> {
        let key = id.as_str().to_lowercase();
        FONT_TABLE
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, font)| *font)
            .or_else(|| {
                ALL_FONTS
                    .iter()
                    .copied()
                    .find(|font| font.base_font().eq_ignore_ascii_case(&key))
            })
            .ok_or_else(|| StampError::render(format!("font '{id}' is not available")))
    }

    /// /BaseFont に書く名前。
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbol / ZapfDingbats は組み込みエンコーディングを使う。
    pub fn uses_win_ansi(self) -> bool {
        !matches!(self, StandardFont::Symbol | StandardFont::ZapfDingbats)
    }
}

/// WinAnsiEncoding の 0x80..=0x9F に割り当てられた文字。
const WIN_ANSI_HIGH: &[(char, u8)] = &[
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// WinAnsiEncodingへの変換結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub bytes: Vec<u8>,
    /// 変換できず `?` に置き換えた文字
    pub replaced: Vec<char>,
}

/// 文字列をWinAnsiEncodingのバイト列に変換する。
///
/// 表現できない文字は `?` に置き換え、`replaced` に記録する。
pub fn encode_win_ansi(text: &str) -> EncodedText {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = Vec::new();

    for c in text.chars() {
        let code = c as u32;
        let byte = match code {
            0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|(ch, _)| *ch == c)
                .map(|(_, b)| *b),
        };
        match byte {
            Some(b) => bytes.push(b),
            None => {
                bytes.push(b'?');
                replaced.push(c);
            }
        }
    }

    EncodedText { bytes, replaced }
}
