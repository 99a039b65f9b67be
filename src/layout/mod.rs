// スタンプ行の配置計算
//
// 座標系: 原点はページ左上、Xは右向き、Yは下向き (単位: pt)。
// PDFユーザー空間への変換は描画側 (pdf::content_stream) で行う。

pub mod date;

use serde::{Deserialize, Serialize};

/// 行間係数: line_height = font_size * LINE_HEIGHT_FACTOR
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// アンカー未指定時の既定座標テーブル。
/// 各行は独立した固定位置を持ち、片方が非表示でももう片方は移動しない。
pub const DEFAULT_LOCALITY_POSITION: (f64, f64) = (337.0, 280.0);
pub const DEFAULT_DATE_POSITION: (f64, f64) = (391.0, 307.0);

/// 行の種別。宣言順が上から下への表示順。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Locality,
    Date,
}

impl LineKind {
    pub fn default_position(self) -> (f64, f64) {
        match self {
            LineKind::Locality => DEFAULT_LOCALITY_POSITION,
            LineKind::Date => DEFAULT_DATE_POSITION,
        }
    }
}

/// 呼び出し側が指定するベースライン座標。x/y はそれぞれ省略可能。
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Anchor {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Anchor {
    /// x, y いずれかが指定されていれば明示アンカーとみなす。
    pub fn is_explicit(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

/// ページ寸法 (pt)。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

/// 描画対象の行 (配置前)。
#[derive(Debug, Clone, PartialEq)]
pub struct StampLine {
    pub kind: LineKind,
    pub text: String,
}

impl StampLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// 配置済みの行。`text` は大文字化済み、(x, y) はベースライン。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLine {
    pub kind: LineKind,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// アクティブな行の配置を計算する。
///
/// - アンカーなし: 各行を種別ごとの既定座標に置く。
/// - アンカーあり: x省略時は `margin`、y省略時は `page.height - margin`。
///   アンカーは表示順で最後の行のベースラインで、それより前の行は
///   `line_height` ずつ上に積む。
///
/// 入力の並び順に関係なく、出力は表示順 (所在地 → 日付) に並ぶ。
/// アクティブな行がなければ空を返す。
pub fn compute_layout(
    page: PageGeometry,
    anchor: Option<Anchor>,
    lines: &[StampLine],
    line_height: f64,
    margin: f64,
) -> Vec<ResolvedLine> {
    let mut ordered: Vec<&StampLine> = lines.iter().collect();
    ordered.sort_by_key(|l| l.kind);
    ordered.dedup_by_key(|l| l.kind);

    let anchor = anchor.filter(Anchor::is_explicit);

    match anchor {
        None => ordered
            .into_iter()
            .map(|line| {
                let (x, y) = line.kind.default_position();
                ResolvedLine {
                    kind: line.kind,
                    text: line.text.to_uppercase(),
                    x,
                    y,
                }
            })
            .collect(),
        Some(anchor) => {
            let x = anchor.x.unwrap_or(margin);
            let last_y = anchor.y.unwrap_or(page.height - margin);
            let count = ordered.len();
            ordered
                .into_iter()
                .enumerate()
                .map(|(i, line)| {
                    let steps_above_last = (count - 1 - i) as f64;
                    ResolvedLine {
                        kind: line.kind,
                        text: line.text.to_uppercase(),
                        x,
                        y: last_y - steps_above_last * line_height,
                    }
                })
                .collect()
        }
    }
}
