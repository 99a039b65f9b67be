// 既存ページへのリソース追加とコンテンツ追記

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::StampError;
use crate::logo::LogoImage;
use crate::pdf::encoding::StandardFont;

/// 既存ドキュメントの1ページにスタンプを書き込む。
pub struct StampPageWriter<'a> {
    doc: &'a mut Document,
    page_id: ObjectId,
    resources_id: Option<ObjectId>,
    wrapped: bool,
}

impl<'a> StampPageWriter<'a> {
    pub fn new(doc: &'a mut Document, page_id: ObjectId) -> Self {
        Self {
            doc,
            page_id,
            resources_id: None,
            wrapped: false,
        }
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    /// 標準フォントをページの /Font リソースに登録し、リソース名を返す。
    pub fn add_font(&mut self, font: StandardFont) -> crate::error::Result<String> {
        let mut font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
        };
        if font.uses_win_ansi() {
            font_dict.set("Encoding", "WinAnsiEncoding");
        }
        let font_id = self.doc.add_object(font_dict);
        self.register_resource(b"Font", "StampF", font_id)
    }

    /// ロゴ画像XObjectを追加し、ページの /XObject リソース名を返す。
    pub fn add_image(&mut self, logo: &LogoImage) -> crate::error::Result<String> {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => logo.width as i64,
            "Height" => logo.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        let image_id = self
            .doc
            .add_object(Object::Stream(Stream::new(dict, logo.data.clone())));
        self.register_resource(b"XObject", "StampIm", image_id)
    }

    /// ページのコンテンツにスタンプ描画を追記する。
    ///
    /// 初回は既存のコンテンツを `q ... Q` で囲み、元のグラフィックス状態が
    /// スタンプに影響しないようにする。2回目以降は末尾にストリームを足すだけ。
    pub fn append_content(&mut self, stamp: Vec<u8>) -> crate::error::Result<()> {
        let existing: Vec<Object> = match self.page_dict()?.get(b"Contents") {
            // 間接参照された配列は展開する
            Ok(Object::Reference(id)) => match self.doc.get_object(*id)? {
                Object::Array(arr) => arr.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(_) => {
                return Err(StampError::render("unsupported /Contents object"));
            }
            Err(_) => Vec::new(),
        };

        let mut contents = Vec::with_capacity(existing.len() + 2);
        let tail = if self.wrapped {
            contents.extend(existing);
            let mut tail = b"\n".to_vec();
            tail.extend_from_slice(&stamp);
            tail
        } else {
            let head_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
            contents.push(Object::Reference(head_id));
            contents.extend(existing);
            let mut tail = b"\nQ\n".to_vec();
            tail.extend_from_slice(&stamp);
            tail
        };
        let tail_id = self.doc.add_object(Stream::new(dictionary! {}, tail));
        contents.push(Object::Reference(tail_id));

        self.page_dict_mut()?.set("Contents", Object::Array(contents));
        self.wrapped = true;
        Ok(())
    }

    fn page_dict(&self) -> crate::error::Result<&Dictionary> {
        Ok(self.doc.get_dictionary(self.page_id)?)
    }

    fn page_dict_mut(&mut self) -> crate::error::Result<&mut Dictionary> {
        Ok(self.doc.get_dictionary_mut(self.page_id)?)
    }

    /// `category` (/Font, /XObject) に `prefix<n>` の未使用名で登録する。
    fn register_resource(
        &mut self,
        category: &[u8],
        prefix: &str,
        target: ObjectId,
    ) -> crate::error::Result<String> {
        let resources_id = self.ensure_resources_object()?;
        let category_dict = self.category_dict_mut(resources_id, category)?;

        let name = (1..)
            .map(|n| format!("{prefix}{n}"))
            .find(|candidate| !category_dict.has(candidate.as_bytes()))
            .unwrap_or_else(|| prefix.to_string());
        category_dict.set(name.as_bytes().to_vec(), Object::Reference(target));
        Ok(name)
    }

    /// ページの /Resources を間接オブジェクトとして確保し、そのIDを返す。
    ///
    /// 直接辞書や親から継承したリソースは、このページ専用の
    /// 間接オブジェクトにコピーしてから参照に差し替える。
    fn ensure_resources_object(&mut self) -> crate::error::Result<ObjectId> {
        if let Some(id) = self.resources_id {
            return Ok(id);
        }

        let current = self.page_dict()?.get(b"Resources").ok().cloned();
        let resources = match current {
            Some(Object::Reference(id)) => self.doc.get_dictionary(id)?.clone(),
            Some(Object::Dictionary(dict)) => dict,
            Some(_) => return Err(StampError::render("unsupported /Resources object")),
            None => self.inherited_resources()?,
        };

        // 共有リソースを汚さないよう常にページ専用のコピーを作る
        let id = self.doc.add_object(resources);
        self.page_dict_mut()?.set("Resources", Object::Reference(id));
        self.resources_id = Some(id);
        Ok(id)
    }

    fn inherited_resources(&self) -> crate::error::Result<Dictionary> {
        let mut parent = self.page_dict()?.get(b"Parent").ok().cloned();
        while let Some(Object::Reference(parent_id)) = parent {
            let dict = self.doc.get_dictionary(parent_id)?;
            match dict.get(b"Resources") {
                Ok(Object::Reference(id)) => return Ok(self.doc.get_dictionary(*id)?.clone()),
                Ok(Object::Dictionary(d)) => return Ok(d.clone()),
                _ => parent = dict.get(b"Parent").ok().cloned(),
            }
        }
        Ok(Dictionary::new())
    }

    /// リソース辞書内のカテゴリ辞書を直接辞書として取得する (なければ作成)。
    fn category_dict_mut(
        &mut self,
        resources_id: ObjectId,
        category: &[u8],
    ) -> crate::error::Result<&mut Dictionary> {
        let existing = self
            .doc
            .get_dictionary(resources_id)?
            .get(category)
            .ok()
            .cloned();
        let inline = match existing {
            Some(Object::Reference(id)) => self.doc.get_dictionary(id)?.clone(),
            Some(Object::Dictionary(d)) => d,
            _ => Dictionary::new(),
        };

        let resources = self.doc.get_dictionary_mut(resources_id)?;
        resources.set(category.to_vec(), Object::Dictionary(inline));
        match resources.get_mut(category) {
            Ok(Object::Dictionary(d)) => Ok(d),
            _ => Err(StampError::render("failed to prepare resource dictionary")),
        }
    }
}
