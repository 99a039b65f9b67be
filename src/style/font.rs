use std::fmt;

use serde::{Deserialize, Serialize};

/// フォントファミリ。既知の3ファミリ以外は名前をそのまま保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    #[default]
    Helv,
    Times,
    Cour,
    Other(String),
}

impl FontFamily {
    /// 空文字列はデフォルトの `helv` として扱う。大文字小文字は区別しない。
    pub fn parse(name: &str) -> Self {
        let lowered = name.trim().to_lowercase();
        match lowered.as_str() {
            "" | "helv" => FontFamily::Helv,
            "times" => FontFamily::Times,
            "cour" => FontFamily::Cour,
            _ => FontFamily::Other(lowered),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FontFamily::Helv => "helv",
            FontFamily::Times => "times",
            FontFamily::Cour => "cour",
            FontFamily::Other(name) => name,
        }
    }
}

impl From<String> for FontFamily {
    fn from(s: String) -> Self {
        FontFamily::parse(&s)
    }
}

impl From<FontFamily> for String {
    fn from(f: FontFamily) -> Self {
        f.as_str().to_string()
    }
}

/// 太字・斜体の組み合わせ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    /// フォント識別子に付与するサフィックス。
    fn suffix(self) -> &'static str {
        match self {
            FontStyle::Regular => "",
            FontStyle::Bold => "B",
            FontStyle::Italic => "I",
            FontStyle::BoldItalic => "BI",
        }
    }
}

/// 解決済みのフォント識別子 (e.g. `"helvB"`, `"timesBI"`, またはパススルー名)。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FontId(String);

impl FontId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ファミリとスタイルからフォント識別子を解決する。
///
/// 既知ファミリ (`helv` / `times` / `cour`) は4スタイルそれぞれ固定の識別子になる。
/// 未知ファミリはファミリ名をそのまま返し、実際に描画できるかは描画側で判断する。
pub fn resolve_font(family: &FontFamily, bold: bool, italic: bool) -> FontId {
    let style = FontStyle::from_flags(bold, italic);
    match family {
        FontFamily::Helv | FontFamily::Times | FontFamily::Cour => {
            FontId(format!("{}{}", family.as_str(), style.suffix()))
        }
        FontFamily::Other(name) => FontId(name.clone()),
    }
}
