use std::path::Path;

use serde::Deserialize;

use crate::config::stamp::{
    DEFAULT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_LOGO_MARGIN_CM, DEFAULT_LOGO_WIDTH_CM,
    DEFAULT_MARGIN,
};
use crate::style::FontFamily;

/// ジョブファイルと同じディレクトリで探す設定ファイル名。
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// settings.yaml の内容。全項目省略可能。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub font: FontFamily,
    pub font_size: f64,
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub margin: f64,
    pub logo_width_cm: f64,
    pub logo_margin_cm: f64,
    pub allow_copy: bool,
    pub restrict_editing: bool,
    pub encrypt_content: bool,
    pub default_locality: Option<String>,
    /// 0 = rayon のデフォルト、1 = 逐次
    pub parallel_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            font: FontFamily::default(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_COLOR.to_string(),
            bold: false,
            italic: false,
            margin: DEFAULT_MARGIN,
            logo_width_cm: DEFAULT_LOGO_WIDTH_CM,
            logo_margin_cm: DEFAULT_LOGO_MARGIN_CM,
            allow_copy: true,
            restrict_editing: false,
            encrypt_content: false,
            default_locality: None,
            parallel_workers: 0,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        // 空ファイルは null になるのでデフォルト扱い
        if yaml.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::StampError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// ジョブファイルの隣にある settings.yaml を読む。無ければ既定値。
    pub fn for_job_file(job_file: &Path) -> crate::error::Result<Self> {
        let settings_path = match job_file.parent() {
            Some(dir) => dir.join(SETTINGS_FILE_NAME),
            None => {
                return Err(crate::error::StampError::config(format!(
                    "no directory for job file {}",
                    job_file.display()
                )));
            }
        };

        if settings_path.is_file() {
            Self::from_file(&settings_path)
        } else {
            Ok(Settings::default())
        }
    }
}
