// 全ジョブ実行

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::pipeline::job_runner::{JobConfig, JobResult, run_job};

/// Run multiple jobs, collecting results in input order.
/// One job failure does NOT prevent other jobs from running.
///
/// `parallel_workers`: 0 = rayon default, 1 = sequential.
/// ジョブ間で入出力パスが重なる場合は全体を逐次実行する。
pub fn run_all_jobs(
    jobs: &[JobConfig],
    parallel_workers: usize,
) -> Vec<crate::error::Result<JobResult>> {
    if parallel_workers == 1 || jobs.len() < 2 {
        return jobs.iter().map(run_job).collect();
    }
    if jobs_share_paths(jobs) {
        warn!("jobs share input/output paths; running sequentially");
        return jobs.iter().map(run_job).collect();
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if parallel_workers > 0 {
        builder = builder.num_threads(parallel_workers);
    }
    match builder.build() {
        Ok(pool) => {
            debug!(threads = pool.current_num_threads(), "running jobs in parallel");
            pool.install(|| jobs.par_iter().map(run_job).collect())
        }
        Err(e) => {
            warn!(error = %e, "failed to build thread pool; running sequentially");
            jobs.iter().map(run_job).collect()
        }
    }
}

/// 2つ以上のジョブが同じファイルを読み書きするか。
pub fn jobs_share_paths(jobs: &[JobConfig]) -> bool {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    jobs.iter().any(|job| {
        let mut paths = vec![normalize(&job.input_path)];
        let output = normalize(&job.output_path);
        if output != paths[0] {
            paths.push(output);
        }
        paths.into_iter().any(|p| !seen.insert(p))
    })
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::stamp::StampConfiguration;
    use chrono::NaiveDate;

    fn job(input: &str, output: &str) -> JobConfig {
        JobConfig {
            input_path: PathBuf::from(input),
            output_path: PathBuf::from(output),
            locality: "Lages/SC.".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).expect("date"),
            stamp: StampConfiguration::default(),
        }
    }

    #[test]
    fn test_in_place_job_alone_does_not_share() {
        assert!(!jobs_share_paths(&[
            job("/x/a.pdf", "/x/a.pdf"),
            job("/x/b.pdf", "/x/c.pdf"),
        ]));
    }

    #[test]
    fn test_output_of_one_job_is_input_of_another() {
        assert!(jobs_share_paths(&[
            job("/x/a.pdf", "/x/b.pdf"),
            job("/x/b.pdf", "/x/c.pdf"),
        ]));
    }

    #[test]
    fn test_same_output_twice() {
        assert!(jobs_share_paths(&[
            job("/x/a.pdf", "/x/out.pdf"),
            job("/x/b.pdf", "/x/out.pdf"),
        ]));
    }
}
