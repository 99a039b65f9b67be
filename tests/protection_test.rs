// 権限マスク・暗号方式・保護の適用

use carimbo::config::stamp::ProtectionSettings;
use carimbo::protection::{
    EncryptionMethod, LopdfProtection, PermissionMask, ProtectionBackend, ProtectionPolicy,
    compute_permissions, select_encryption,
};
use lopdf::{Document, Object, Stream, dictionary};

fn single_page_doc() -> Document {
    let mut doc = Document::with_version("1.5");
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

// ============================================================
// compute_permissions
// ============================================================

#[test]
fn test_no_restrictions_keeps_all_bits() {
    assert_eq!(compute_permissions(false, true), PermissionMask::all());
    assert_eq!(compute_permissions(false, true).bits(), -1);
}

#[test]
fn test_restrict_editing_clears_exactly_editing_bits() {
    let mask = compute_permissions(true, true);
    assert_eq!(mask.bits(), -1 & !PermissionMask::EDITING_BITS);
    assert!(!mask.allows(PermissionMask::MODIFY));
    assert!(!mask.allows(PermissionMask::ANNOTATE));
    assert!(!mask.allows(PermissionMask::FORM));
    assert!(mask.allows(PermissionMask::COPY));
    assert!(mask.allows(PermissionMask::ACCESSIBILITY));
    assert!(mask.allows(PermissionMask::PRINT | PermissionMask::PRINT_HQ));
}

#[test]
fn test_disallow_copy_clears_exactly_copy_bits() {
    let mask = compute_permissions(false, false);
    assert_eq!(mask.bits(), -1 & !PermissionMask::COPY_BITS);
    assert!(!mask.allows(PermissionMask::COPY));
    assert!(!mask.allows(PermissionMask::ACCESSIBILITY));
    assert!(mask.allows(PermissionMask::MODIFY));
    assert!(mask.allows(PermissionMask::ASSEMBLE));
}

#[test]
fn test_clearing_is_monotonic() {
    let once = PermissionMask::all().clear(PermissionMask::COPY);
    let twice = once.clear(PermissionMask::COPY).clear(PermissionMask::MODIFY);
    assert!(!twice.allows(PermissionMask::COPY));
    assert_eq!(twice.bits() & once.bits(), twice.bits());
}

// ============================================================
// select_encryption / ProtectionPolicy
// ============================================================

#[test]
fn test_select_encryption() {
    assert_eq!(select_encryption(true), EncryptionMethod::Strong);
    assert_eq!(select_encryption(false), EncryptionMethod::Standard);
}

#[test]
fn test_no_protection_requested() {
    assert!(ProtectionPolicy::from_settings(&ProtectionSettings::default()).is_none());

    let empty_password = ProtectionSettings {
        password: Some(String::new()),
        ..ProtectionSettings::default()
    };
    assert!(ProtectionPolicy::from_settings(&empty_password).is_none());
}

#[test]
fn test_each_intent_triggers_protection() {
    let variants = [
        ProtectionSettings {
            password: Some("x".to_string()),
            ..ProtectionSettings::default()
        },
        ProtectionSettings {
            restrict_editing: true,
            ..ProtectionSettings::default()
        },
        ProtectionSettings {
            allow_copy: false,
            ..ProtectionSettings::default()
        },
        ProtectionSettings {
            encrypt_content: true,
            ..ProtectionSettings::default()
        },
    ];
    for settings in &variants {
        assert!(
            ProtectionPolicy::from_settings(settings).is_some(),
            "{settings:?}"
        );
    }
}

#[test]
fn test_policy_passwords() {
    let policy = ProtectionPolicy::from_settings(&ProtectionSettings {
        password: Some("segredo".to_string()),
        ..ProtectionSettings::default()
    })
    .expect("policy");
    assert_eq!(policy.owner_password, "segredo");
    assert_eq!(policy.user_password, "");
    assert!(policy.summary().owner_password_set);

    let policy = ProtectionPolicy::from_settings(&ProtectionSettings {
        restrict_editing: true,
        ..ProtectionSettings::default()
    })
    .expect("policy");
    assert_eq!(policy.owner_password, "");
    assert!(!policy.summary().owner_password_set);
}

// ============================================================
// LopdfProtection
// ============================================================

fn protect_and_save(policy: &ProtectionPolicy) -> Vec<u8> {
    let doc = single_page_doc();
    let mut protected = LopdfProtection.protect(&doc, policy).expect("protect");

    // 元のドキュメントは変更されない
    assert!(doc.trailer.get(b"Encrypt").is_err());

    let mut bytes = Vec::new();
    protected.save_to(&mut bytes).expect("save");
    bytes
}

/// 保存したバイト列を読み直し、/Encrypt の V, R, P を返す。
fn written_encryption(bytes: &[u8]) -> (i64, i64, u64) {
    let doc = Document::load_mem(bytes).expect("reload protected document");
    let state = doc.encryption_state.expect("document is encrypted");
    (state.version(), state.revision(), state.permissions().bits())
}

fn assert_cleared(p: u64, bits: i32) {
    assert_eq!(p & bits as u64, 0, "/P = {p:#x}");
}

fn assert_granted(p: u64, bits: i32) {
    assert_eq!(p & bits as u64, bits as u64, "/P = {p:#x}");
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn test_standard_protection_writes_encrypt_dictionary() {
    let policy = ProtectionPolicy::from_settings(&ProtectionSettings {
        restrict_editing: true,
        ..ProtectionSettings::default()
    })
    .expect("policy");
    let bytes = protect_and_save(&policy);
    assert!(contains(&bytes, b"/Encrypt"));
    assert!(contains(&bytes, b"/ID"));

    let (v, r, p) = written_encryption(&bytes);
    assert_eq!((v, r), (2, 3));
    assert_cleared(p, PermissionMask::EDITING_BITS);
    assert_granted(p, PermissionMask::PRINT | PermissionMask::COPY);
}

#[test]
fn test_strong_protection_uses_aes_v5() {
    let policy = ProtectionPolicy::from_settings(&ProtectionSettings {
        password: Some("x".to_string()),
        restrict_editing: true,
        allow_copy: false,
        encrypt_content: true,
    })
    .expect("policy");
    assert_eq!(policy.method, EncryptionMethod::Strong);

    let bytes = protect_and_save(&policy);
    assert!(contains(&bytes, b"/Encrypt"));
    assert!(contains(&bytes, b"/AESV3"));

    let (v, r, p) = written_encryption(&bytes);
    assert_eq!((v, r), (5, 6));
    assert_cleared(p, PermissionMask::EDITING_BITS | PermissionMask::COPY_BITS);
    assert_granted(p, PermissionMask::PRINT | PermissionMask::ASSEMBLE);
}
