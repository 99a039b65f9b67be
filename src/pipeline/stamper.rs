// 1ページへのスタンプ処理: 開く -> 検証 -> 書式 -> 配置 -> 文字 -> ロゴ -> 保護 -> 保存

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lopdf::Document;
use lopdf::content::Operation;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::stamp::StampConfiguration;
use crate::error::StampError;
use crate::layout::date::date_in_words;
use crate::layout::{LineKind, PageGeometry, ResolvedLine, StampLine, compute_layout};
use crate::logo::{LogoImage, PlacementRectangle, compute_rect, resolve_logo_file};
use crate::pdf::atomic::write_atomically;
use crate::pdf::content_stream::{
    TextRun, encode_operations, image_operations, text_operations, to_user_space,
};
use crate::pdf::encoding::{StandardFont, encode_win_ansi};
use crate::pdf::reader::{PageBox, PdfReader};
use crate::pdf::writer::StampPageWriter;
use crate::protection::{LopdfProtection, ProtectionBackend, ProtectionPolicy, ProtectionSummary};
use crate::style::{FontFamily, FontId, resolve_font};

/// スタンプ処理の段階。宣言順に進む。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StampStage {
    Opened,
    Validated,
    Styled,
    LaidOut,
    TextDrawn,
    LogoAttempted,
    ProtectionApplied,
    Written,
    Closed,
}

impl fmt::Display for StampStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 出力は書けたが、要求どおりにはならなかった点。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StampWarning {
    LogoSkipped { reason: String },
    /// 指定ロゴが見つからず、慣例名のロゴを代わりに使った。
    LogoSubstituted { requested: PathBuf, used: PathBuf },
    ProtectionDegraded { reason: String },
    FontFallback { requested: FontId, used: FontId },
    NoActiveLines,
}

impl fmt::Display for StampWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StampWarning::LogoSkipped { reason } => write!(f, "logo skipped: {reason}"),
            StampWarning::LogoSubstituted { requested, used } => write!(
                f,
                "logo '{}' not found, used '{}'",
                requested.display(),
                used.display()
            ),
            StampWarning::ProtectionDegraded { reason } => {
                write!(f, "saved without protection: {reason}")
            }
            StampWarning::FontFallback { requested, used } => {
                write!(f, "font '{requested}' unavailable, used '{used}'")
            }
            StampWarning::NoActiveLines => write!(f, "no active lines, nothing drawn"),
        }
    }
}

/// 配置したロゴ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoPlacement {
    pub path: PathBuf,
    pub rect: PlacementRectangle,
}

/// スタンプ処理の結果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StampReport {
    pub output_path: PathBuf,
    pub page_index: u32,
    pub lines: Vec<ResolvedLine>,
    /// 実際に使ったフォント
    pub font: FontId,
    pub logo: Option<LogoPlacement>,
    pub protection: Option<ProtectionSummary>,
    pub warnings: Vec<StampWarning>,
}

impl StampReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// 既定の設定でスタンプする。
pub fn stamp_pdf(
    input: &Path,
    output: &Path,
    locality: &str,
    date: NaiveDate,
    config: &StampConfiguration,
) -> crate::error::Result<StampReport> {
    Stamper::new().stamp(input, output, locality, date, config)
}

/// スタンプ処理本体。保護の実装とロゴ探索の作業ディレクトリを差し替えられる。
pub struct Stamper {
    protection: Box<dyn ProtectionBackend>,
    working_dir: Option<PathBuf>,
}

impl Default for Stamper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stamper {
    pub fn new() -> Self {
        Self {
            protection: Box::new(LopdfProtection),
            working_dir: None,
        }
    }

    pub fn with_protection_backend(mut self, backend: Box<dyn ProtectionBackend>) -> Self {
        self.protection = backend;
        self
    }

    /// ロゴの慣例名を探す作業ディレクトリ (未指定ならカレントディレクトリ)。
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn stamp(
        &self,
        input: &Path,
        output: &Path,
        locality: &str,
        date: NaiveDate,
        config: &StampConfiguration,
    ) -> crate::error::Result<StampReport> {
        let mut tracker = StageTracker::new(input);
        let mut warnings = Vec::new();

        // Opened
        let reader = PdfReader::open(input)?;
        debug!(input = %input.display(), pages = reader.page_count(), "opened");
        tracker.advance(StampStage::Opened);

        // Validated
        let page_index = config.page_index();
        let page_id = reader.page_id(page_index)?;
        let page_box = reader.page_box(page_index)?;
        tracker.advance(StampStage::Validated);

        // Styled
        let (font, font_id) = resolve_drawable_font(config, &mut warnings)?;
        info!(font = %font_id, base_font = font.base_font(), "effective font");
        tracker.advance(StampStage::Styled);

        // LaidOut
        let lines = compute_layout(
            PageGeometry {
                width: page_box.width,
                height: page_box.height,
            },
            config.anchor(),
            &active_lines(config, locality, date),
            config.line_height(),
            config.margin(),
        );
        tracker.advance(StampStage::LaidOut);

        let mut doc = reader.into_document();

        // TextDrawn
        let mut writer = StampPageWriter::new(&mut doc, page_id);
        if lines.is_empty() {
            warn!(input = %input.display(), "no active lines; document is written unchanged");
            warnings.push(StampWarning::NoActiveLines);
        } else {
            draw_text(&mut writer, font, &page_box, &lines, config).map_err(as_render_error)?;
        }
        tracker.advance(StampStage::TextDrawn);

        // LogoAttempted
        let logo = match self.place_logo(&mut writer, &page_box, input, config, &mut warnings) {
            Ok(placed) => placed,
            Err(e) => {
                warn!(error = %e, "logo skipped");
                warnings.push(StampWarning::LogoSkipped {
                    reason: e.to_string(),
                });
                None
            }
        };
        tracker.advance(StampStage::LogoAttempted);

        // ProtectionApplied
        let policy = ProtectionPolicy::from_settings(config.protection());
        let protected = policy.and_then(|policy| {
            match self.protection.protect(writer.document(), &policy) {
                Ok(protected) => Some((protected, policy.summary())),
                Err(e) => {
                    warn!(error = %e, "protection failed; saving unprotected");
                    warnings.push(StampWarning::ProtectionDegraded {
                        reason: e.to_string(),
                    });
                    None
                }
            }
        });
        tracker.advance(StampStage::ProtectionApplied);

        // Written
        let protection = write_atomically(input, output, |path| {
            save_with_fallback(&mut doc, protected, path, &mut warnings)
        })?;
        info!(output = %output.display(), "stamped document written");
        tracker.advance(StampStage::Written);

        tracker.finish();
        Ok(StampReport {
            output_path: output.to_path_buf(),
            page_index,
            lines,
            font: font_id,
            logo,
            protection,
            warnings,
        })
    }

    fn place_logo(
        &self,
        writer: &mut StampPageWriter<'_>,
        page_box: &PageBox,
        input: &Path,
        config: &StampConfiguration,
        warnings: &mut Vec<StampWarning>,
    ) -> crate::error::Result<Option<LogoPlacement>> {
        let settings = config.logo();
        let explicit = settings.path.as_deref();
        let input_dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let working_dir =
            logo_search_dir(self.working_dir.as_deref(), std::env::current_dir(), input_dir);

        let Some(path) = resolve_logo_file(explicit, &working_dir, input_dir) else {
            return match explicit {
                Some(p) => Err(StampError::logo(format!("{} not found", p.display()))),
                None => {
                    debug!("no logo found");
                    Ok(None)
                }
            };
        };
        let substituted = explicit.filter(|requested| *requested != path);
        if let Some(requested) = substituted {
            warn!(
                requested = %requested.display(),
                used = %path.display(),
                "requested logo not found; using conventional logo file"
            );
        }

        let image = LogoImage::load(&path)?;
        let rect = compute_rect(
            image.width,
            image.height,
            settings.width_cm,
            settings.margin_cm,
            page_box.height,
        )?;
        let name = writer.add_image(&image)?;
        let (x, y) = to_user_space(page_box, rect.x, rect.bottom());
        let ops = image_operations(&name, x, y, rect.width, rect.height);
        writer.append_content(encode_operations(ops)?)?;

        debug!(path = %path.display(), ?rect, "logo placed");
        // 配置できたときだけ差し替えを報告する
        if let Some(requested) = substituted {
            warnings.push(StampWarning::LogoSubstituted {
                requested: requested.to_path_buf(),
                used: path.clone(),
            });
        }
        Ok(Some(LogoPlacement { path, rect }))
    }
}

/// 慣例名ロゴを探す作業ディレクトリ。
///
/// カレントディレクトリが取れない場合は入力ファイルのディレクトリで代用する。
fn logo_search_dir(
    configured: Option<&Path>,
    current_dir: std::io::Result<PathBuf>,
    input_dir: &Path,
) -> PathBuf {
    match (configured, current_dir) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Ok(cwd)) => cwd,
        (None, Err(e)) => {
            debug!(error = %e, "current directory unavailable; searching input directory");
            input_dir.to_path_buf()
        }
    }
}

/// 要求フォントを解決し、描画できなければ既定ファミリーで1度だけ再試行する。
fn resolve_drawable_font(
    config: &StampConfiguration,
    warnings: &mut Vec<StampWarning>,
) -> crate::error::Result<(StandardFont, FontId)> {
    let requested = resolve_font(config.font_family(), config.bold(), config.italic());
    match StandardFont::from_font_id(&requested) {
        Ok(font) => Ok((font, requested)),
        Err(e) => {
            let fallback = resolve_font(&FontFamily::default(), config.bold(), config.italic());
            warn!(requested = %requested, fallback = %fallback, error = %e, "font fallback");
            let font = StandardFont::from_font_id(&fallback)?;
            warnings.push(StampWarning::FontFallback {
                requested,
                used: fallback.clone(),
            });
            Ok((font, fallback))
        }
    }
}

fn active_lines(config: &StampConfiguration, locality: &str, date: NaiveDate) -> Vec<StampLine> {
    let toggles = config.lines();
    let mut lines = Vec::with_capacity(2);
    if toggles.locality {
        lines.push(StampLine::new(LineKind::Locality, locality));
    }
    if toggles.date {
        lines.push(StampLine::new(
            LineKind::Date,
            format!("{}.", date_in_words(date)),
        ));
    }
    lines
}

fn draw_text(
    writer: &mut StampPageWriter<'_>,
    font: StandardFont,
    page_box: &PageBox,
    lines: &[ResolvedLine],
    config: &StampConfiguration,
) -> crate::error::Result<()> {
    let resource = writer.add_font(font)?;
    let runs: Vec<TextRun> = lines
        .iter()
        .map(|line| {
            let encoded = encode_win_ansi(&line.text);
            if !encoded.replaced.is_empty() {
                warn!(line = ?line.kind, replaced = ?encoded.replaced, "characters not representable in WinAnsiEncoding");
            }
            let (x, y) = to_user_space(page_box, line.x, line.y);
            TextRun {
                x,
                y,
                bytes: encoded.bytes,
            }
        })
        .collect();

    let ops: Vec<Operation> = text_operations(&resource, config.font_size(), config.color(), &runs);
    writer.append_content(encode_operations(ops)?)
}

/// 文字描画中の失敗はすべて RenderError として扱う。
fn as_render_error(e: StampError) -> StampError {
    match e {
        StampError::RenderError(_) => e,
        other => StampError::render(other.to_string()),
    }
}

/// 保護済み文書の保存に失敗したら、保護なしで保存し直す。
fn save_with_fallback(
    doc: &mut Document,
    protected: Option<(Document, ProtectionSummary)>,
    path: &Path,
    warnings: &mut Vec<StampWarning>,
) -> crate::error::Result<Option<ProtectionSummary>> {
    if let Some((mut protected_doc, summary)) = protected {
        match protected_doc.save(path) {
            Ok(_) => return Ok(Some(summary)),
            Err(e) => {
                warn!(error = %e, "saving protected document failed; saving unprotected");
                warnings.push(StampWarning::ProtectionDegraded {
                    reason: format!("failed to write protected document: {e}"),
                });
            }
        }
    }
    doc.save(path)
        .map_err(|e| StampError::pdf_write(format!("{}: {e}", path.display())))?;
    Ok(None)
}

/// 段階遷移をログに残し、途中で抜けた場合はその段階を記録する。
struct StageTracker {
    input: PathBuf,
    stage: Option<StampStage>,
    finished: bool,
}

impl StageTracker {
    fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            stage: None,
            finished: false,
        }
    }

    fn advance(&mut self, next: StampStage) {
        debug!(input = %self.input.display(), from = ?self.stage, to = %next, "stage");
        self.stage = Some(next);
    }

    fn finish(mut self) {
        self.advance(StampStage::Closed);
        self.finished = true;
    }
}

impl Drop for StageTracker {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                input = %self.input.display(),
                last_stage = ?self.stage,
                "stamping aborted; document released"
            );
        }
    }
}
