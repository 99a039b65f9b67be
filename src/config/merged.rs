use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::job::Job;
use super::settings::Settings;
use super::stamp::StampConfiguration;
use crate::error::StampError;
use crate::style::FontFamily;

/// 所在地が設定にない場合に参照する環境変数。
pub const LOCALITY_ENV_VAR: &str = "CIDADE_PADRAO";

#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub page: u32,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub font: FontFamily,
    pub font_size: f64,
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub margin: f64,
    pub logo_path: Option<PathBuf>,
    pub logo_width_cm: f64,
    pub logo_margin_cm: f64,
    pub password: Option<String>,
    pub allow_copy: bool,
    pub restrict_editing: bool,
    pub encrypt_content: bool,
    pub show_locality: bool,
    pub show_date: bool,
    pub locality: Option<String>,
    pub date: Option<NaiveDate>,
}

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    pub fn new(settings: &Settings, job: &Job) -> Self {
        MergedConfig {
            page: job.page,
            x: job.x,
            y: job.y,
            font: job.font.clone().unwrap_or_else(|| settings.font.clone()),
            font_size: job.font_size.unwrap_or(settings.font_size),
            color: job.color.clone().unwrap_or_else(|| settings.color.clone()),
            bold: job.bold.unwrap_or(settings.bold),
            italic: job.italic.unwrap_or(settings.italic),
            margin: job.margin.unwrap_or(settings.margin),
            logo_path: job.logo_path.as_ref().map(PathBuf::from),
            logo_width_cm: job.logo_width_cm.unwrap_or(settings.logo_width_cm),
            logo_margin_cm: job.logo_margin_cm.unwrap_or(settings.logo_margin_cm),
            password: job.password.clone().filter(|p| !p.is_empty()),
            allow_copy: job.allow_copy.unwrap_or(settings.allow_copy),
            restrict_editing: job.restrict_editing.unwrap_or(settings.restrict_editing),
            encrypt_content: job.encrypt_content.unwrap_or(settings.encrypt_content),
            show_locality: job.show_locality.unwrap_or(true),
            show_date: job.show_date.unwrap_or(true),
            locality: job
                .locality
                .clone()
                .or_else(|| settings.default_locality.clone())
                .filter(|l| !l.trim().is_empty()),
            date: job.date,
        }
    }

    /// 相対ロゴパスをジョブファイルのディレクトリ基準に解決する。
    pub fn with_base_dir(mut self, base_dir: &Path) -> Self {
        self.logo_path = self
            .logo_path
            .map(|p| if p.is_absolute() { p } else { base_dir.join(p) });
        self
    }

    /// 所在地を決定する: ジョブ → settings の default_locality → 環境変数。
    pub fn resolve_locality(&self) -> crate::error::Result<String> {
        self.locality_with_env(std::env::var(LOCALITY_ENV_VAR).ok())
    }

    fn locality_with_env(&self, env_value: Option<String>) -> crate::error::Result<String> {
        self.locality
            .clone()
            .or_else(|| env_value.filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                StampError::config(format!(
                    "locality is not set (job 'locality', settings 'default_locality' or {LOCALITY_ENV_VAR})"
                ))
            })
    }

    /// 日付未指定なら今日 (ローカル時刻)。
    pub fn resolve_date(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// 検証済みの `StampConfiguration` を構築する。
    pub fn to_stamp_configuration(&self) -> crate::error::Result<StampConfiguration> {
        StampConfiguration::builder()
            .page_index(self.page)
            .anchor(self.x, self.y)
            .font_family(self.font.clone())
            .font_size(self.font_size)
            .color(self.color.clone())
            .bold(self.bold)
            .italic(self.italic)
            .margin(self.margin)
            .logo_path(self.logo_path.clone())
            .logo_width_cm(self.logo_width_cm)
            .logo_margin_cm(self.logo_margin_cm)
            .password(self.password.clone())
            .allow_copy(self.allow_copy)
            .restrict_editing(self.restrict_editing)
            .encrypt_content(self.encrypt_content)
            .show_locality(self.show_locality)
            .show_date(self.show_date)
            .build()
    }
}
