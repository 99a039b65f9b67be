use serde::Serialize;

use crate::error::StampError;

/// 正規化済みRGB色。各成分は [0, 1]。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// `(r, g, b)` タプルとして返す。
    pub fn components(&self) -> (f64, f64, f64) {
        (self.r, self.g, self.b)
    }
}

/// HEX色文字列をパースする。
///
/// 形式:
/// - 6桁: `"#1A2B3C"` / `"1a2b3c"`
/// - 3桁: `"#FFF"` (各桁を複製して `"FFFFFF"` として扱う)
///
/// 前後の空白と先頭の `#` 1つは無視する。
pub fn parse_color(hex_color: &str) -> crate::error::Result<Rgb> {
    let trimmed = hex_color.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => {
            return Err(StampError::invalid_color(format!(
                "'{hex_color}': expected 3 or 6 hex digits"
            )));
        }
    };

    let bytes = hex::decode(&expanded)
        .map_err(|e| StampError::invalid_color(format!("'{hex_color}': {e}")))?;

    Ok(Rgb {
        r: f64::from(bytes[0]) / 255.0,
        g: f64::from(bytes[1]) / 255.0,
        b: f64::from(bytes[2]) / 255.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_expands_each_digit() {
        let rgb = parse_color("#f80").expect("valid");
        assert_eq!(rgb, parse_color("#ff8800").expect("valid"));
    }

    #[test]
    fn test_rejects_multibyte_input_of_valid_length() {
        // バイト長は6だがASCII16進数ではない
        assert!(parse_color("#ççç").is_err());
    }
}
