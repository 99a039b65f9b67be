// ロゴ画像の探索・正規化・配置計算

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::error::StampError;

/// 1cm あたりのポイント数。
pub const POINTS_PER_CM: f64 = 28.3465;

/// 明示パスがない場合に探すファイル名 (優先順)。
pub const CONVENTIONAL_LOGO_NAMES: [&str; 4] = ["Logo.jpg", "logo.jpg", "Logo.png", "logo.png"];

/// ロゴの配置矩形 (pt, 左上原点)。`y` は上端。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacementRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacementRectangle {
    /// 下端のY座標 (左上原点)。
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// ロゴファイルを探索する。
///
/// 優先順位:
/// 1. 明示パス (存在する場合)
/// 2. 作業ディレクトリの慣例名
/// 3. 入力PDFと同じディレクトリの慣例名
pub fn resolve_logo_file(
    explicit: Option<&Path>,
    working_dir: &Path,
    input_dir: &Path,
) -> Option<PathBuf> {
    let conventional = |dir: &Path| {
        CONVENTIONAL_LOGO_NAMES
            .iter()
            .map(|name| dir.join(name))
            .collect::<Vec<_>>()
    };

    explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(conventional(working_dir))
        .chain(conventional(input_dir))
        .find(|candidate| candidate.is_file())
}

/// 画像のピクセル寸法とcm指定から配置矩形を計算する。
///
/// 幅は `width_cm` から決まり、高さは縦横比を保つ。
/// 左端は `margin_cm`、下端は `page_height - margin_cm` に揃える。
pub fn compute_rect(
    image_width_px: u32,
    image_height_px: u32,
    width_cm: f64,
    margin_cm: f64,
    page_height: f64,
) -> crate::error::Result<PlacementRectangle> {
    if image_width_px == 0 || image_height_px == 0 {
        return Err(StampError::logo(format!(
            "invalid logo dimensions: {image_width_px}x{image_height_px}"
        )));
    }

    let width = width_cm * POINTS_PER_CM;
    let height = width * f64::from(image_height_px) / f64::from(image_width_px);
    let margin = margin_cm * POINTS_PER_CM;
    let bottom = page_height - margin;

    Ok(PlacementRectangle {
        x: margin,
        y: bottom - height,
        width,
        height,
    })
}

/// 埋め込み用に正規化したロゴ画像。
///
/// 8bit RGB・ICCプロファイルなしのピクセル列をzlib圧縮して保持する。
#[derive(Debug, Clone)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    /// FlateDecode 済みの DeviceRGB ピクセルデータ
    pub data: Vec<u8>,
}

impl LogoImage {
    /// 画像ファイルを読み込み、RGBへ正規化する。
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let img = image::ImageReader::open(path)
            .map_err(|e| StampError::logo(format!("{}: {e}", path.display())))?
            .with_guessed_format()
            .map_err(|e| StampError::logo(format!("{}: {e}", path.display())))?
            .decode()?;
        Self::from_dynamic(&img)
    }

    /// デコード済み画像からロゴを作る。アルファは白背景に合成する。
    pub fn from_dynamic(img: &DynamicImage) -> crate::error::Result<Self> {
        let rgb = flatten_alpha_to_white(img);
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(StampError::logo("logo image is empty"));
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(rgb.as_raw())
            .map_err(|e| StampError::logo(format!("FlateDecode error: {e}")))?;
        let data = encoder
            .finish()
            .map_err(|e| StampError::logo(format!("FlateDecode error: {e}")))?;

        Ok(Self {
            width,
            height,
            data,
        })
    }
}

fn flatten_alpha_to_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = ImageBuffer::new(width, height);
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = f32::from(px[3]) / 255.0;
        let blend = |c: u8| ((f32::from(c) * a) + (255.0 * (1.0 - a))).round() as u8;
        out.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }
    out
}
