use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

use crate::error::StampError;
use crate::pdf::reader::PageBox;
use crate::style::Rgb;

/// 6要素アフィン変換行列 [a, b, c, d, e, f]
/// PDF仕様: [ a b 0 ]
///          [ c d 0 ]
///          [ e f 1 ]
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    /// 単位行列を返す。
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// self * other (行列の右乗算)
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn from_operands(operands: &[Object]) -> crate::error::Result<Option<Matrix>> {
        if operands.len() != 6 {
            return Ok(None);
        }
        let vals: Vec<f64> = operands
            .iter()
            .map(operand_to_f64)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Matrix {
            a: vals[0],
            b: vals[1],
            c: vals[2],
            d: vals[3],
            e: vals[4],
            f: vals[5],
        }))
    }
}

/// 左上原点の座標をPDFユーザー空間 (左下原点) に変換する。
pub fn to_user_space(page: &PageBox, x: f64, y_from_top: f64) -> (f64, f64) {
    (page.x0 + x, page.top() - y_from_top)
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

/// テキスト1行分の描画指定 (座標はPDFユーザー空間のベースライン)。
#[derive(Debug, Clone)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    /// フォントのエンコーディングに変換済みのバイト列
    pub bytes: Vec<u8>,
}

/// テキスト描画オペレータ列を生成する。
///
/// 行ごとに `BT /<font> <size> Tf <r> <g> <b> rg 1 0 0 1 <x> <y> Tm (<text>) Tj ET`
pub fn text_operations(
    font_resource: &str,
    font_size: f64,
    color: Rgb,
    runs: &[TextRun],
) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(runs.len() * 5);
    for run in runs {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font_resource.as_bytes().to_vec()), real(font_size)],
        ));
        ops.push(Operation::new(
            "rg",
            vec![real(color.r), real(color.g), real(color.b)],
        ));
        ops.push(Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                real(run.x),
                real(run.y),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(run.bytes.clone(), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// 画像XObject描画オペレータ列を生成する。(x, y) は左下隅。
///
/// `q <w> 0 0 <h> <x> <y> cm /<name> Do Q`
pub fn image_operations(xobject_resource: &str, x: f64, y: f64, w: f64, h: f64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![real(w), 0.into(), 0.into(), real(h), real(x), real(y)],
        ),
        Operation::new(
            "Do",
            vec![Object::Name(xobject_resource.as_bytes().to_vec())],
        ),
        Operation::new("Q", vec![]),
    ]
}

/// オペレータ列をコンテンツストリームのバイト列にエンコードする。
pub fn encode_operations(operations: Vec<Operation>) -> crate::error::Result<Vec<u8>> {
    Content { operations }
        .encode()
        .map_err(|e| StampError::render(format!("content stream encode error: {e}")))
}

/// コンテンツストリーム上のテキスト描画。
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub font: String,
    pub font_size: f64,
    /// テキスト行列の原点 (CTM適用後)
    pub x: f64,
    pub y: f64,
    pub bytes: Vec<u8>,
}

/// コンテンツストリーム上のXObject描画。
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedXObject {
    pub name: String,
    pub ctm: Matrix,
}

/// コンテンツストリームから描画されたテキストとXObjectの配置を抽出する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placements {
    pub texts: Vec<PlacedText>,
    pub xobjects: Vec<PlacedXObject>,
}

/// コンテンツストリームを解析し、Tj と Do の配置を抽出する。
///
/// CTMスタック(q/Q)と cm、テキスト状態の Tf / Tm / Td を追跡する。
pub fn extract_placements(content_bytes: &[u8]) -> crate::error::Result<Placements> {
    // 空バイト列の場合、lopdfのパーサがエラーを返す可能性があるため特別扱い
    if content_bytes.is_empty() {
        return Ok(Placements::default());
    }

    let content = Content::decode(content_bytes)
        .map_err(|e| StampError::pdf_read(format!("content stream decode error: {e}")))?;

    let mut ctm_stack: Vec<Matrix> = vec![Matrix::identity()];
    let mut text_matrix = Matrix::identity();
    let mut line_matrix = Matrix::identity();
    let mut font = String::new();
    let mut font_size = 0.0;
    let mut placements = Placements::default();

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => {
                let current = ctm_stack.last().cloned().unwrap_or_else(Matrix::identity);
                ctm_stack.push(current);
            }
            "Q" => {
                if ctm_stack.len() > 1 {
                    ctm_stack.pop();
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(&op.operands)?
                    && let Some(current) = ctm_stack.last_mut()
                {
                    *current = m.multiply(current);
                }
            }
            "BT" => {
                text_matrix = Matrix::identity();
                line_matrix = Matrix::identity();
            }
            "Tf" => {
                if let [name, size] = op.operands.as_slice() {
                    font = String::from_utf8_lossy(name.as_name().unwrap_or_default()).into_owned();
                    font_size = operand_to_f64(size)?;
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(&op.operands)? {
                    text_matrix = m.clone();
                    line_matrix = m;
                }
            }
            "Td" => {
                if let [tx, ty] = op.operands.as_slice() {
                    let translate = Matrix {
                        e: operand_to_f64(tx)?,
                        f: operand_to_f64(ty)?,
                        ..Matrix::identity()
                    };
                    line_matrix = translate.multiply(&line_matrix);
                    text_matrix = line_matrix.clone();
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    let ctm = ctm_stack.last().cloned().unwrap_or_else(Matrix::identity);
                    let origin = text_matrix.multiply(&ctm);
                    placements.texts.push(PlacedText {
                        font: font.clone(),
                        font_size,
                        x: origin.e,
                        y: origin.f,
                        bytes: bytes.clone(),
                    });
                }
            }
            "Do" => {
                if let Some(operand) = op.operands.first() {
                    let name_bytes = operand
                        .as_name()
                        .map_err(|e| StampError::pdf_read(e.to_string()))?;
                    placements.xobjects.push(PlacedXObject {
                        name: String::from_utf8_lossy(name_bytes).into_owned(),
                        ctm: ctm_stack.last().cloned().unwrap_or_else(Matrix::identity),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(placements)
}

/// lopdfのObjectから数値をf64として取得する。
fn operand_to_f64(obj: &Object) -> crate::error::Result<f64> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(*r as f64),
        _ => Err(StampError::pdf_read(format!(
            "expected numeric operand, got {:?}",
            obj
        ))),
    }
}
