// 行配置の計算

use carimbo::layout::date::date_in_words;
use carimbo::layout::{
    Anchor, DEFAULT_DATE_POSITION, DEFAULT_LOCALITY_POSITION, LineKind, PageGeometry, StampLine,
    compute_layout,
};
use chrono::NaiveDate;

const A4: PageGeometry = PageGeometry {
    width: 595.0,
    height: 842.0,
};

fn both_lines() -> Vec<StampLine> {
    vec![
        StampLine::new(LineKind::Locality, "Lages/SC."),
        StampLine::new(LineKind::Date, "5 de março de 2024."),
    ]
}

// ============================================================
// Default positions
// ============================================================

#[test]
fn test_default_positions_without_anchor() {
    let lines = compute_layout(A4, None, &both_lines(), 14.4, 36.0);
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0].kind, LineKind::Locality);
    assert_eq!(lines[0].text, "LAGES/SC.");
    assert_eq!((lines[0].x, lines[0].y), DEFAULT_LOCALITY_POSITION);

    assert_eq!(lines[1].kind, LineKind::Date);
    assert_eq!(lines[1].text, "5 DE MARÇO DE 2024.");
    assert_eq!((lines[1].x, lines[1].y), DEFAULT_DATE_POSITION);
}

#[test]
fn test_skipped_line_does_not_shift_the_other() {
    let only_date = vec![StampLine::new(LineKind::Date, "1 de maio de 2020.")];
    let lines = compute_layout(A4, None, &only_date, 14.4, 36.0);
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].x, lines[0].y), DEFAULT_DATE_POSITION);
}

#[test]
fn test_empty_anchor_behaves_like_no_anchor() {
    let lines = compute_layout(A4, Some(Anchor::default()), &both_lines(), 14.4, 36.0);
    assert_eq!((lines[0].x, lines[0].y), DEFAULT_LOCALITY_POSITION);
}

// ============================================================
// Explicit anchor
// ============================================================

#[test]
fn test_anchor_is_baseline_of_last_line() {
    let anchor = Anchor {
        x: Some(100.0),
        y: Some(500.0),
    };
    let lines = compute_layout(A4, Some(anchor), &both_lines(), 14.4, 36.0);
    assert_eq!((lines[1].x, lines[1].y), (100.0, 500.0));
    assert_eq!(lines[0].x, 100.0);
    assert!((lines[0].y - (500.0 - 14.4)).abs() < 1e-9);
}

#[test]
fn test_anchor_with_single_line_lands_exactly_on_anchor() {
    let only_locality = vec![StampLine::new(LineKind::Locality, "Lages/SC.")];
    let anchor = Anchor {
        x: Some(120.0),
        y: Some(700.0),
    };
    let lines = compute_layout(A4, Some(anchor), &only_locality, 14.4, 36.0);
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].x, lines[0].y), (120.0, 700.0));
}

#[test]
fn test_partial_anchor_defaults_from_margin() {
    let anchor = Anchor {
        x: None,
        y: Some(400.0),
    };
    let lines = compute_layout(A4, Some(anchor), &both_lines(), 12.0, 50.0);
    assert_eq!(lines[1].x, 50.0);

    let anchor = Anchor {
        x: Some(10.0),
        y: None,
    };
    let lines = compute_layout(A4, Some(anchor), &both_lines(), 12.0, 50.0);
    assert_eq!(lines[1].y, 842.0 - 50.0);
    assert_eq!(lines[0].y, 842.0 - 50.0 - 12.0);
}

#[test]
fn test_presentation_order_ignores_input_order() {
    let reversed: Vec<StampLine> = both_lines().into_iter().rev().collect();
    let anchor = Some(Anchor {
        x: Some(0.0),
        y: Some(300.0),
    });
    assert_eq!(
        compute_layout(A4, anchor, &reversed, 14.4, 36.0),
        compute_layout(A4, anchor, &both_lines(), 14.4, 36.0)
    );
}

// ============================================================
// Purity and edge cases
// ============================================================

#[test]
fn test_layout_is_deterministic() {
    let anchor = Some(Anchor {
        x: Some(42.0),
        y: None,
    });
    let first = compute_layout(A4, anchor, &both_lines(), 14.4, 36.0);
    let second = compute_layout(A4, anchor, &both_lines(), 14.4, 36.0);
    assert_eq!(first, second);
}

#[test]
fn test_no_active_lines_gives_empty_layout() {
    assert!(compute_layout(A4, None, &[], 14.4, 36.0).is_empty());
    let anchor = Some(Anchor {
        x: Some(1.0),
        y: Some(1.0),
    });
    assert!(compute_layout(A4, anchor, &[], 14.4, 36.0).is_empty());
}

#[test]
fn test_date_in_words_every_month() {
    let expected = [
        "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
        "outubro", "novembro", "dezembro",
    ];
    for (i, month) in expected.iter().enumerate() {
        let date = NaiveDate::from_ymd_opt(2023, i as u32 + 1, 15).expect("valid date");
        assert_eq!(date_in_words(date), format!("15 de {month} de 2023"));
    }
}
