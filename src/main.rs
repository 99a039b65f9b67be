use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use carimbo::config::job::JobFile;
use carimbo::config::settings::Settings;
use carimbo::error::{EXIT_INVALID_ARGS, StampError};
use carimbo::pipeline::job_runner::{JobConfig, JobResult};
use carimbo::pipeline::orchestrator::run_all_jobs;

/// `--json` で標準出力に書くジョブ単位の結果。
#[derive(Debug, Serialize)]
struct JsonResult {
    success: bool,
    message: String,
    error_code: Option<&'static str>,
    file_path: Option<String>,
    warnings: Vec<String>,
}

impl JsonResult {
    fn ok(result: &JobResult) -> Self {
        let warnings: Vec<String> = result.report.warnings.iter().map(|w| w.to_string()).collect();
        JsonResult {
            success: true,
            message: if warnings.is_empty() {
                "stamped".to_string()
            } else {
                "stamped with warnings".to_string()
            },
            error_code: None,
            file_path: Some(result.output_path.display().to_string()),
            warnings,
        }
    }

    fn error(err: &StampError, file_path: Option<&Path>) -> Self {
        JsonResult {
            success: false,
            message: err.to_string(),
            error_code: Some(err.code()),
            file_path: file_path.map(|p| p.display().to_string()),
            warnings: Vec::new(),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: carimbo [--json] <jobs.yaml>...");
        eprintln!("  Stamp locality, date and logo onto PDF files according to job specifications.");
        return if args.is_empty() {
            ExitCode::from(EXIT_INVALID_ARGS)
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("carimbo {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing();

    let json = args.iter().any(|a| a == "--json");
    let job_files: Vec<&String> = args.iter().filter(|a| *a != "--json").collect();
    if job_files.is_empty() {
        eprintln!("Usage: carimbo [--json] <jobs.yaml>...");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut job_configs: Vec<JobConfig> = Vec::new();
    let mut parallel_workers = 0;
    // 最初に失敗したジョブのエラー分類で終了する
    let mut failure: Option<u8> = None;

    for job_file_arg in job_files {
        let job_file_path = Path::new(job_file_arg);

        let settings = match Settings::for_job_file(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                emit_json(json, &JsonResult::error(&e, Some(job_file_path)));
                failure.get_or_insert(e.exit_code());
                continue;
            }
        };
        parallel_workers = parallel_workers.max(settings.parallel_workers);

        let job_file = match JobFile::from_file(job_file_path) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to load job file {job_file_arg}: {e}");
                emit_json(json, &JsonResult::error(&e, Some(job_file_path)));
                failure.get_or_insert(e.exit_code());
                continue;
            }
        };

        // Resolve job file directory for relative paths.
        let job_dir = job_file_path.parent().unwrap_or_else(|| Path::new("."));

        for job in &job_file.jobs {
            match JobConfig::from_job(&settings, job, job_dir) {
                Ok(cfg) => job_configs.push(cfg),
                Err(e) => {
                    eprintln!("ERROR: {}: {e}", job.input);
                    emit_json(json, &JsonResult::error(&e, Some(Path::new(&job.input))));
                    failure.get_or_insert(e.exit_code());
                }
            }
        }
    }

    let results = run_all_jobs(&job_configs, parallel_workers);

    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(job_result) => {
                eprintln!(
                    "OK: {} -> {}",
                    job_result.input_path.display(),
                    job_result.output_path.display(),
                );
                for warning in &job_result.report.warnings {
                    eprintln!("WARN: {}: {warning}", job_result.output_path.display());
                }
                emit_json(json, &JsonResult::ok(job_result));
            }
            Err(e) => {
                eprintln!(
                    "ERROR: {} -> {}: {e}",
                    job_configs[i].input_path.display(),
                    job_configs[i].output_path.display()
                );
                emit_json(
                    json,
                    &JsonResult::error(e, Some(&job_configs[i].input_path)),
                );
                failure.get_or_insert(e.exit_code());
            }
        }
    }

    match failure {
        Some(code) => ExitCode::from(code),
        None => ExitCode::SUCCESS,
    }
}

fn emit_json(enabled: bool, result: &JsonResult) {
    if !enabled {
        return;
    }
    match serde_json::to_string(result) {
        Ok(line) => println!("{line}"),
        Err(e) => eprintln!("ERROR: Failed to serialize result: {e}"),
    }
}
