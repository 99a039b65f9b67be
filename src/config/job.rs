use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::StampError;
use crate::style::FontFamily;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml)
            .map_err(|e| StampError::config(format!("Failed to parse job YAML: {e}")))
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// 1件のスタンプ指示。Option の項目は settings.yaml の値で補われる。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Job {
    pub input: String,
    pub output: Option<String>,
    /// true なら入力ファイルを置き換える
    #[serde(default)]
    pub in_place: bool,
    pub locality: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDate>,
    /// 0始まりのページ番号
    #[serde(default)]
    pub page: u32,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub font: Option<FontFamily>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub margin: Option<f64>,
    pub logo_path: Option<String>,
    pub logo_width_cm: Option<f64>,
    pub logo_margin_cm: Option<f64>,
    pub password: Option<String>,
    pub allow_copy: Option<bool>,
    pub restrict_editing: Option<bool>,
    pub encrypt_content: Option<bool>,
    pub show_locality: Option<bool>,
    pub show_date: Option<bool>,
}

impl Job {
    /// 出力先を決める。`in_place` なら入力と同じパス。
    pub fn output_target(&self) -> crate::error::Result<&str> {
        match (&self.output, self.in_place) {
            (Some(_), true) => Err(StampError::config(format!(
                "job '{}': 'output' and 'in_place' are mutually exclusive",
                self.input
            ))),
            (Some(output), false) => Ok(output),
            (None, true) => Ok(&self.input),
            (None, false) => Err(StampError::config(format!(
                "job '{}': either 'output' or 'in_place: true' is required",
                self.input
            ))),
        }
    }
}

/// `YYYY-MM-DD` 形式の日付をパースする。
pub fn parse_date(s: &str) -> crate::error::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| StampError::config(format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}")))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    s.map(|s| parse_date(&s).map_err(serde::de::Error::custom))
        .transpose()
}
