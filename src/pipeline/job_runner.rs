// ジョブ単位: 設定の統合 -> スタンプ処理

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::config::job::Job;
use crate::config::merged::MergedConfig;
use crate::config::settings::Settings;
use crate::config::stamp::StampConfiguration;
use crate::pipeline::stamper::{StampReport, Stamper};

/// Configuration for a single job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub locality: String,
    pub date: NaiveDate,
    pub stamp: StampConfiguration,
}

impl JobConfig {
    /// settings.yaml とジョブ定義を統合する。相対パスは `job_dir` 基準。
    pub fn from_job(settings: &Settings, job: &Job, job_dir: &Path) -> crate::error::Result<Self> {
        let output = job.output_target()?;
        let merged = MergedConfig::new(settings, job).with_base_dir(job_dir);
        Ok(JobConfig {
            input_path: resolve_path(job_dir, &job.input),
            output_path: resolve_path(job_dir, output),
            locality: merged.resolve_locality()?,
            date: merged.resolve_date(),
            stamp: merged.to_stamp_configuration()?,
        })
    }

    pub fn is_in_place(&self) -> bool {
        self.input_path == self.output_path
    }
}

/// Result of processing a single job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub report: StampReport,
}

/// Run a single stamping job.
pub fn run_job(config: &JobConfig) -> crate::error::Result<JobResult> {
    run_job_with(&Stamper::new(), config)
}

pub fn run_job_with(stamper: &Stamper, config: &JobConfig) -> crate::error::Result<JobResult> {
    debug!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        in_place = config.is_in_place(),
        "running job"
    );
    let report = stamper.stamp(
        &config.input_path,
        &config.output_path,
        &config.locality,
        config.date,
        &config.stamp,
    )?;
    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        report,
    })
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
