use std::path::PathBuf;

use crate::error::StampError;
use crate::layout::{Anchor, LINE_HEIGHT_FACTOR};
use crate::style::{FontFamily, Rgb, parse_color};

pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_COLOR: &str = "#000000";
/// 0.5in
pub const DEFAULT_MARGIN: f64 = 36.0;
pub const DEFAULT_LOGO_WIDTH_CM: f64 = 2.0;
pub const DEFAULT_LOGO_MARGIN_CM: f64 = 0.5;

/// ロゴ設定 (単位: cm)。
#[derive(Debug, Clone, PartialEq)]
pub struct LogoSettings {
    pub path: Option<PathBuf>,
    pub width_cm: f64,
    pub margin_cm: f64,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            path: None,
            width_cm: DEFAULT_LOGO_WIDTH_CM,
            margin_cm: DEFAULT_LOGO_MARGIN_CM,
        }
    }
}

/// 保護設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionSettings {
    pub password: Option<String>,
    pub restrict_editing: bool,
    pub allow_copy: bool,
    pub encrypt_content: bool,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            password: None,
            restrict_editing: false,
            allow_copy: true,
            encrypt_content: false,
        }
    }
}

/// 各行の表示有無。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineToggles {
    pub locality: bool,
    pub date: bool,
}

impl Default for LineToggles {
    fn default() -> Self {
        Self {
            locality: true,
            date: true,
        }
    }
}

/// 1回のスタンプ処理の設定。`builder()` で構築し、構築時に一度だけ検証する。
#[derive(Debug, Clone, PartialEq)]
pub struct StampConfiguration {
    page_index: u32,
    anchor: Option<Anchor>,
    font_size: f64,
    font_family: FontFamily,
    color: Rgb,
    bold: bool,
    italic: bool,
    margin: f64,
    logo: LogoSettings,
    protection: ProtectionSettings,
    lines: LineToggles,
}

impl StampConfiguration {
    pub fn builder() -> StampConfigurationBuilder {
        StampConfigurationBuilder::default()
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    pub fn font_family(&self) -> &FontFamily {
        &self.font_family
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn logo(&self) -> &LogoSettings {
        &self.logo
    }

    pub fn protection(&self) -> &ProtectionSettings {
        &self.protection
    }

    pub fn lines(&self) -> LineToggles {
        self.lines
    }
}

impl Default for StampConfiguration {
    fn default() -> Self {
        Self {
            page_index: 0,
            anchor: None,
            font_size: DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            color: Rgb::BLACK,
            bold: false,
            italic: false,
            margin: DEFAULT_MARGIN,
            logo: LogoSettings::default(),
            protection: ProtectionSettings::default(),
            lines: LineToggles::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StampConfigurationBuilder {
    page_index: u32,
    anchor: Anchor,
    font_size: f64,
    font_family: FontFamily,
    color: String,
    bold: bool,
    italic: bool,
    margin: f64,
    logo: LogoSettings,
    protection: ProtectionSettings,
    lines: LineToggles,
}

impl Default for StampConfigurationBuilder {
    fn default() -> Self {
        Self {
            page_index: 0,
            anchor: Anchor::default(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            color: DEFAULT_COLOR.to_string(),
            bold: false,
            italic: false,
            margin: DEFAULT_MARGIN,
            logo: LogoSettings::default(),
            protection: ProtectionSettings::default(),
            lines: LineToggles::default(),
        }
    }
}

impl StampConfigurationBuilder {
    pub fn page_index(mut self, page_index: u32) -> Self {
        self.page_index = page_index;
        self
    }

    /// 明示アンカー。x, y はそれぞれ省略可能。
    pub fn anchor(mut self, x: Option<f64>, y: Option<f64>) -> Self {
        self.anchor = Anchor { x, y };
        self
    }

    pub fn font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    pub fn color(mut self, hex: impl Into<String>) -> Self {
        self.color = hex.into();
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn logo_path(mut self, path: Option<PathBuf>) -> Self {
        self.logo.path = path;
        self
    }

    pub fn logo_width_cm(mut self, width_cm: f64) -> Self {
        self.logo.width_cm = width_cm;
        self
    }

    pub fn logo_margin_cm(mut self, margin_cm: f64) -> Self {
        self.logo.margin_cm = margin_cm;
        self
    }

    pub fn password(mut self, password: Option<String>) -> Self {
        self.protection.password = password;
        self
    }

    pub fn restrict_editing(mut self, restrict: bool) -> Self {
        self.protection.restrict_editing = restrict;
        self
    }

    pub fn allow_copy(mut self, allow: bool) -> Self {
        self.protection.allow_copy = allow;
        self
    }

    pub fn encrypt_content(mut self, encrypt: bool) -> Self {
        self.protection.encrypt_content = encrypt;
        self
    }

    pub fn show_locality(mut self, show: bool) -> Self {
        self.lines.locality = show;
        self
    }

    pub fn show_date(mut self, show: bool) -> Self {
        self.lines.date = show;
        self
    }

    /// 値を検証して `StampConfiguration` を構築する。
    pub fn build(self) -> crate::error::Result<StampConfiguration> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(StampError::config(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(StampError::config(format!(
                "margin must be non-negative, got {}",
                self.margin
            )));
        }
        if !self.logo.width_cm.is_finite() || self.logo.width_cm <= 0.0 {
            return Err(StampError::config(format!(
                "logo width must be positive, got {}",
                self.logo.width_cm
            )));
        }
        if !self.logo.margin_cm.is_finite() || self.logo.margin_cm < 0.0 {
            return Err(StampError::config(format!(
                "logo margin must be non-negative, got {}",
                self.logo.margin_cm
            )));
        }
        let anchor_coords = [self.anchor.x, self.anchor.y];
        if anchor_coords.iter().flatten().any(|v| !v.is_finite()) {
            return Err(StampError::config("anchor coordinates must be finite"));
        }

        let color = parse_color(&self.color)?;

        Ok(StampConfiguration {
            page_index: self.page_index,
            anchor: self.anchor.is_explicit().then_some(self.anchor),
            font_size: self.font_size,
            font_family: self.font_family,
            color,
            bold: self.bold,
            italic: self.italic,
            margin: self.margin,
            logo: self.logo,
            protection: self.protection,
            lines: self.lines,
        })
    }
}
