use chrono::{Datelike, NaiveDate};

const MONTH_NAMES_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// 月番号(1-12)のポルトガル語名を返す。
pub fn month_name_pt(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES_PT.get(idx).copied()
}

/// 日付を `"5 de março de 2024"` 形式の文字列にする。
pub fn date_in_words(date: NaiveDate) -> String {
    // NaiveDate::month() は常に 1..=12
    let month = month_name_pt(date.month()).unwrap_or_default();
    format!("{} de {} de {}", date.day(), month, date.year())
}
