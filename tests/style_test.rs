// 色のパースとフォント解決

use carimbo::error::StampError;
use carimbo::pdf::encoding::StandardFont;
use carimbo::style::{FontFamily, parse_color, resolve_font};

// ============================================================
// parse_color
// ============================================================

#[test]
fn test_parse_color_six_digits() {
    let c = parse_color("#FF8000").expect("valid color");
    assert_eq!(c.components(), (1.0, 128.0 / 255.0, 0.0));
}

#[test]
fn test_parse_color_three_digits_expands() {
    assert_eq!(
        parse_color("#fff").expect("short form"),
        parse_color("#ffffff").expect("long form")
    );
}

#[test]
fn test_parse_color_without_hash_and_with_whitespace() {
    let c = parse_color("  00ff00 ").expect("valid color");
    assert_eq!(c.components(), (0.0, 1.0, 0.0));
}

#[test]
fn test_parse_color_rejects_bad_input() {
    for bad in ["", "#", "#12", "#1234", "#GGGGGG", "##000000", "#0000000"] {
        let err = parse_color(bad).expect_err(bad);
        assert!(
            matches!(err, StampError::InvalidColorError(_)),
            "{bad}: {err:?}"
        );
    }
}

// ============================================================
// resolve_font
// ============================================================

#[test]
fn test_font_table_covers_all_twelve_ids() {
    let cases = [
        ("helv", false, false, "helv", StandardFont::Helvetica),
        ("helv", true, false, "helvB", StandardFont::HelveticaBold),
        ("helv", false, true, "helvI", StandardFont::HelveticaOblique),
        ("helv", true, true, "helvBI", StandardFont::HelveticaBoldOblique),
        ("times", false, false, "times", StandardFont::TimesRoman),
        ("times", true, false, "timesB", StandardFont::TimesBold),
        ("times", false, true, "timesI", StandardFont::TimesItalic),
        ("times", true, true, "timesBI", StandardFont::TimesBoldItalic),
        ("cour", false, false, "cour", StandardFont::Courier),
        ("cour", true, false, "courB", StandardFont::CourierBold),
        ("cour", false, true, "courI", StandardFont::CourierOblique),
        ("cour", true, true, "courBI", StandardFont::CourierBoldOblique),
    ];

    for (family, bold, italic, expected_id, expected_font) in cases {
        let id = resolve_font(&FontFamily::parse(family), bold, italic);
        assert_eq!(id.as_str(), expected_id);
        assert_eq!(
            StandardFont::from_font_id(&id).expect("drawable"),
            expected_font
        );
    }
}

#[test]
fn test_family_name_is_case_insensitive() {
    let id = resolve_font(&FontFamily::parse("TIMES"), true, false);
    assert_eq!(id.as_str(), "timesB");
}

#[test]
fn test_unknown_family_passes_through_unchanged() {
    let id = resolve_font(&FontFamily::parse("garamond"), true, true);
    assert_eq!(id.as_str(), "garamond");
    assert!(StandardFont::from_font_id(&id).is_err());
}

#[test]
fn test_passthrough_standard_font_name_is_drawable() {
    let id = resolve_font(&FontFamily::parse("ZapfDingbats"), false, false);
    assert_eq!(
        StandardFont::from_font_id(&id).expect("drawable"),
        StandardFont::ZapfDingbats
    );
}
