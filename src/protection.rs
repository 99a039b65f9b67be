// アクセス制御: 権限ビットマスク・暗号方式の決定とPDFへの適用

use std::collections::BTreeMap;
use std::sync::Arc;

use lopdf::encryption::crypt_filters::{Aes256CryptFilter, CryptFilter};
use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::stamp::ProtectionSettings;
use crate::error::StampError;

/// 標準セキュリティハンドラの権限ビットマスク (/P)。
///
/// 全権限 (-1) から開始し、ビットのクリアのみ行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionMask(i32);

impl PermissionMask {
    pub const PRINT: i32 = 1 << 2;
    pub const MODIFY: i32 = 1 << 3;
    pub const COPY: i32 = 1 << 4;
    pub const ANNOTATE: i32 = 1 << 5;
    pub const FORM: i32 = 1 << 8;
    pub const ACCESSIBILITY: i32 = 1 << 9;
    pub const ASSEMBLE: i32 = 1 << 10;
    pub const PRINT_HQ: i32 = 1 << 11;

    /// 編集制限でクリアされるビット。
    pub const EDITING_BITS: i32 = Self::MODIFY | Self::ANNOTATE | Self::FORM;
    /// コピー禁止でクリアされるビット。
    pub const COPY_BITS: i32 = Self::COPY | Self::ACCESSIBILITY;

    pub fn all() -> Self {
        Self(-1)
    }

    pub fn bits(self) -> i32 {
        self.0
    }

    /// 指定ビットをクリアする。
    #[must_use]
    pub fn clear(self, bits: i32) -> Self {
        Self(self.0 & !bits)
    }

    /// 指定ビットがすべて許可されているか。
    pub fn allows(self, bits: i32) -> bool {
        self.0 & bits == bits
    }

    fn to_lopdf(self) -> Permissions {
        // /P の下位12ビットのみが意味を持つ
        Permissions::from_bits_truncate(((self.0 as u32) & 0x0FFF).into())
    }
}

/// 暗号方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionMethod {
    /// AES-256 (V5 / R6)
    Strong,
    /// RC4 128bit (V2 / R3)
    Standard,
}

/// 編集制限・コピー許可から権限マスクを計算する。
pub fn compute_permissions(restrict_editing: bool, allow_copy: bool) -> PermissionMask {
    let mut mask = PermissionMask::all();
    if restrict_editing {
        mask = mask.clear(PermissionMask::EDITING_BITS);
    }
    if !allow_copy {
        mask = mask.clear(PermissionMask::COPY_BITS);
    }
    mask
}

/// 内容暗号化の指定から暗号方式を選ぶ。
pub fn select_encryption(encrypt_content: bool) -> EncryptionMethod {
    if encrypt_content {
        EncryptionMethod::Strong
    } else {
        EncryptionMethod::Standard
    }
}

/// 適用する保護内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionPolicy {
    pub permissions: PermissionMask,
    pub method: EncryptionMethod,
    pub owner_password: String,
    /// 閲覧用パスワード。常に空 (誰でも開ける)。
    pub user_password: String,
}

impl ProtectionPolicy {
    /// 保護が要求されていなければ `None` を返す。
    pub fn from_settings(settings: &ProtectionSettings) -> Option<Self> {
        let has_password = settings.password.as_deref().is_some_and(|p| !p.is_empty());
        let requested = has_password
            || settings.restrict_editing
            || !settings.allow_copy
            || settings.encrypt_content;
        if !requested {
            return None;
        }

        Some(Self {
            permissions: compute_permissions(settings.restrict_editing, settings.allow_copy),
            method: select_encryption(settings.encrypt_content),
            owner_password: settings.password.clone().unwrap_or_default(),
            user_password: String::new(),
        })
    }

    pub fn summary(&self) -> ProtectionSummary {
        ProtectionSummary {
            permissions: self.permissions,
            method: self.method,
            owner_password_set: !self.owner_password.is_empty(),
        }
    }
}

/// 出力に実際に適用された保護の要約。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtectionSummary {
    pub permissions: PermissionMask,
    pub method: EncryptionMethod,
    pub owner_password_set: bool,
}

/// ドキュメントに保護を適用するバックエンド。
///
/// 入力ドキュメントは変更せず、暗号化済みの新しいドキュメントを返す。
pub trait ProtectionBackend: Send + Sync {
    fn protect(&self, doc: &Document, policy: &ProtectionPolicy) -> crate::error::Result<Document>;
}

/// lopdf の標準セキュリティハンドラによる実装。
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfProtection;

const STD_CRYPT_FILTER: &[u8] = b"StdCF";

impl ProtectionBackend for LopdfProtection {
    fn protect(&self, doc: &Document, policy: &ProtectionPolicy) -> crate::error::Result<Document> {
        let mut protected = doc.clone();
        ensure_document_id(&mut protected);

        let permissions = policy.permissions.to_lopdf();
        let state = match policy.method {
            EncryptionMethod::Standard => {
                let version = EncryptionVersion::V2 {
                    document: &protected,
                    owner_password: &policy.owner_password,
                    user_password: &policy.user_password,
                    key_length: 128,
                    permissions,
                };
                EncryptionState::try_from(version)
                    .map_err(|e| StampError::protection(e.to_string()))?
            }
            EncryptionMethod::Strong => {
                let file_encryption_key: [u8; 32] = rand::random();
                let crypt_filter: Arc<dyn CryptFilter> = Arc::new(Aes256CryptFilter);
                let version = EncryptionVersion::V5 {
                    encrypt_metadata: true,
                    crypt_filters: BTreeMap::from([(STD_CRYPT_FILTER.to_vec(), crypt_filter)]),
                    file_encryption_key: &file_encryption_key,
                    stream_filter: STD_CRYPT_FILTER.to_vec(),
                    string_filter: STD_CRYPT_FILTER.to_vec(),
                    owner_password: &policy.owner_password,
                    user_password: &policy.user_password,
                    permissions,
                };
                EncryptionState::try_from(version)
                    .map_err(|e| StampError::protection(e.to_string()))?
            }
        };

        protected
            .encrypt(&state)
            .map_err(|e| StampError::protection(e.to_string()))?;
        Ok(protected)
    }
}

/// トレーラに /ID がなければ生成する (RC4系の鍵導出に必要)。
fn ensure_document_id(doc: &mut Document) {
    if doc.trailer.get(b"ID").is_ok() {
        return;
    }

    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", doc.trailer.get(b"Root").ok()));
    hasher.update(doc.objects.len().to_le_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    let digest = hasher.finalize();
    let id = digest[..16].to_vec();

    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn id_halves(doc: &Document) -> (Vec<u8>, Vec<u8>) {
        let id = doc
            .trailer
            .get(b"ID")
            .and_then(Object::as_array)
            .expect("ID array");
        assert_eq!(id.len(), 2);
        let first = id[0].as_str().expect("string").to_vec();
        let second = id[1].as_str().expect("string").to_vec();
        (first, second)
    }

    #[test]
    fn test_ensure_document_id_keeps_existing() {
        let mut doc = Document::with_version("1.5");
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(vec![1, 2, 3], StringFormat::Hexadecimal),
                Object::String(vec![4, 5, 6], StringFormat::Hexadecimal),
            ]),
        );
        ensure_document_id(&mut doc);
        assert_eq!(id_halves(&doc), (vec![1, 2, 3], vec![4, 5, 6]));
    }

    #[test]
    fn test_ensure_document_id_generates_two_equal_halves() {
        let mut doc = Document::with_version("1.5");
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog" });
        doc.trailer.set("Root", catalog_id);
        ensure_document_id(&mut doc);

        let (first, second) = id_halves(&doc);
        assert_eq!(first.len(), 16);
        assert_eq!(first, second);
    }
}
