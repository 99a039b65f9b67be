// ロゴの探索・配置矩形・画像の正規化

use std::fs;

use carimbo::logo::{LogoImage, POINTS_PER_CM, compute_rect, resolve_logo_file};
use image::{DynamicImage, Rgba, RgbaImage};

// ============================================================
// resolve_logo_file
// ============================================================

#[test]
fn test_explicit_path_wins() {
    let work = tempfile::tempdir().expect("tempdir");
    let input_dir = tempfile::tempdir().expect("tempdir");
    let explicit = work.path().join("brand.png");
    fs::write(&explicit, b"x").expect("write");
    fs::write(work.path().join("Logo.jpg"), b"x").expect("write");

    let found = resolve_logo_file(Some(&explicit), work.path(), input_dir.path());
    assert_eq!(found, Some(explicit));
}

#[test]
fn test_working_dir_before_input_dir() {
    let work = tempfile::tempdir().expect("tempdir");
    let input_dir = tempfile::tempdir().expect("tempdir");
    fs::write(work.path().join("logo.png"), b"x").expect("write");
    fs::write(input_dir.path().join("Logo.jpg"), b"x").expect("write");

    let found = resolve_logo_file(None, work.path(), input_dir.path());
    assert_eq!(found, Some(work.path().join("logo.png")));
}

#[test]
fn test_conventional_name_priority_within_directory() {
    let work = tempfile::tempdir().expect("tempdir");
    let input_dir = tempfile::tempdir().expect("tempdir");
    fs::write(input_dir.path().join("logo.png"), b"x").expect("write");
    fs::write(input_dir.path().join("Logo.png"), b"x").expect("write");

    let found = resolve_logo_file(None, work.path(), input_dir.path())
        .expect("found in input dir");
    // 大文字小文字を区別しないファイルシステムでは同一ファイルになる
    assert!(found.starts_with(input_dir.path()));
    assert!(
        found.file_name().is_some_and(|n| n == "Logo.png"),
        "{}",
        found.display()
    );
}

#[test]
fn test_missing_explicit_falls_through_to_conventional() {
    let work = tempfile::tempdir().expect("tempdir");
    let input_dir = tempfile::tempdir().expect("tempdir");
    fs::write(input_dir.path().join("logo.jpg"), b"x").expect("write");

    let missing = work.path().join("missing.png");
    let found = resolve_logo_file(Some(&missing), work.path(), input_dir.path());
    assert_eq!(found, Some(input_dir.path().join("logo.jpg")));
}

#[test]
fn test_nothing_found() {
    let work = tempfile::tempdir().expect("tempdir");
    let input_dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(resolve_logo_file(None, work.path(), input_dir.path()), None);
}

// ============================================================
// compute_rect
// ============================================================

#[test]
fn test_rect_preserves_aspect_ratio_and_margins() {
    let rect = compute_rect(200, 100, 2.0, 0.5, 842.0).expect("rect");
    let margin = 0.5 * POINTS_PER_CM;

    assert!((rect.width - 2.0 * POINTS_PER_CM).abs() < 1e-9);
    assert!((rect.height - rect.width / 2.0).abs() < 1e-9);
    assert!((rect.x - margin).abs() < 1e-9);
    assert!((rect.bottom() - (842.0 - margin)).abs() < 1e-9);
}

#[test]
fn test_rect_rejects_zero_sized_image() {
    assert!(compute_rect(0, 10, 2.0, 0.5, 842.0).is_err());
    assert!(compute_rect(10, 0, 2.0, 0.5, 842.0).is_err());
}

// ============================================================
// LogoImage
// ============================================================

#[test]
fn test_load_png_with_alpha() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("logo.png");
    let mut img = RgbaImage::new(4, 2);
    for px in img.pixels_mut() {
        *px = Rgba([200, 0, 0, 128]);
    }
    img.save(&path).expect("save png");

    let logo = LogoImage::load(&path).expect("load");
    assert_eq!((logo.width, logo.height), (4, 2));
    assert!(!logo.data.is_empty());
}

#[test]
fn test_load_corrupt_image_is_logo_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("logo.png");
    fs::write(&path, b"not an image").expect("write");

    let err = LogoImage::load(&path).expect_err("corrupt");
    assert_eq!(err.code(), "logo");
}

#[test]
fn test_from_dynamic_rgb_data_is_zlib() {
    let img = DynamicImage::new_rgb8(3, 3);
    let logo = LogoImage::from_dynamic(&img).expect("logo");
    // zlib ヘッダ (CMF = 0x78)
    assert_eq!(logo.data[0], 0x78);
}
