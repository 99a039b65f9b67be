use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::StampError;

/// MediaBox から求めたページの寸法と原点。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    /// 上端のY座標 (PDFユーザー空間)。
    pub fn top(&self) -> f64 {
        self.y0 + self.height
    }
}

pub struct PdfReader {
    doc: Document,
}

impl PdfReader {
    /// PDFファイルを開いてPdfReaderを作成する。
    pub fn open(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        // 読めないファイルは IO エラーのまま返す (終了コードの分類に使う)
        let bytes = std::fs::read(path)
            .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
        let doc = Document::load_mem(&bytes)
            .map_err(|e| StampError::pdf_read(format!("{}: {e}", path.display())))?;
        Ok(Self { doc })
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// ページ数を返す。
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// ページ番号(0-indexed)からObjectIdを取得する。範囲外は PageIndexError。
    pub fn page_id(&self, page_index: u32) -> crate::error::Result<ObjectId> {
        let pages = self.doc.get_pages();
        let page_count = pages.len() as u32;
        page_index
            .checked_add(1)
            .and_then(|page_num| pages.get(&page_num).copied())
            .ok_or_else(|| StampError::page_index(page_index, page_count))
    }

    /// 指定ページ辞書からMediaBoxを取得する（Parent経由の継承も考慮）。
    fn get_media_box(&self, dict: &lopdf::Dictionary) -> crate::error::Result<Object> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            return match obj {
                Object::Reference(id) => Ok(self.doc.get_object(*id)?.clone()),
                other => Ok(other.clone()),
            };
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            let parent_dict = self.doc.get_dictionary(*parent_id)?;
            return self.get_media_box(parent_dict);
        }

        Err(StampError::pdf_read("MediaBox not found"))
    }

    /// 指定ページ(0-indexed)のMediaBoxを返す。
    pub fn page_box(&self, page_index: u32) -> crate::error::Result<PageBox> {
        let page_id = self.page_id(page_index)?;
        let page_dict = self.doc.get_dictionary(page_id)?;

        let media_box = self.get_media_box(page_dict)?;

        let media_box_array = media_box.as_array()?;
        if media_box_array.len() < 4 {
            return Err(StampError::pdf_read("Invalid MediaBox"));
        }

        let to_f64 = |obj: &Object| -> crate::error::Result<f64> {
            match obj {
                Object::Integer(i) => Ok(*i as f64),
                Object::Real(f) => Ok(*f as f64),
                _ => Err(StampError::pdf_read("Invalid MediaBox value")),
            }
        };

        let x0 = to_f64(&media_box_array[0])?;
        let y0 = to_f64(&media_box_array[1])?;
        let x1 = to_f64(&media_box_array[2])?;
        let y1 = to_f64(&media_box_array[3])?;

        let width = (x1 - x0).abs();
        let height = (y1 - y0).abs();

        if width <= 0.0 || height <= 0.0 {
            return Err(StampError::pdf_read(
                "Invalid MediaBox: non-positive page dimensions",
            ));
        }

        // 14,400 pt ≈ 200 in
        const PDF_MAX_DIMENSION_PT: f64 = 14_400.0;
        if width > PDF_MAX_DIMENSION_PT || height > PDF_MAX_DIMENSION_PT {
            return Err(StampError::pdf_read(
                "Invalid MediaBox: page dimensions exceed PDF limits",
            ));
        }

        Ok(PageBox {
            x0: x0.min(x1),
            y0: y0.min(y1),
            width,
            height,
        })
    }
}
