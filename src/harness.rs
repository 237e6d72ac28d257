//! Performance harness.
//!
//! Runs an explicit [`Plan`] of jobs, each a (mode, input, output, execution
//! path) tuple, and times the kernel of every job. Sequential and parallel
//! runs of the same input can then be paired with [`compare_reports`].
//!
//! Plans are usually written in TOML:
//!
//! ```toml
//! [options]
//! blur_radius = 3
//!
//! [[job]]
//! mode = "blur"
//! input = "samples/lena.png"
//! output = "export/lena_blur.png"
//! path = "parallel"
//! ```

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;

use crate::codec;
use crate::error::{FilterError, Result};
use crate::filters::{apply_with, ExecutionPath, FilterMode, FilterOptions};

/// One unit of work.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Job {
    pub mode: FilterMode,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub path: ExecutionPath,
}

/// Jobs plus the kernel options they share.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Plan {
    #[serde(default, rename = "job")]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub options: FilterOptions,
}

impl Plan {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FilterError::Plan(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| FilterError::Plan(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Sequential and parallel jobs for every (input, mode) pair.
    ///
    /// Outputs are named `perf_<mode>_<path>_<file name>` inside `output_dir`.
    pub fn compare(modes: &[FilterMode], inputs: &[PathBuf], output_dir: &Path) -> Self {
        let mut jobs = Vec::with_capacity(inputs.len() * modes.len() * 2);
        for input in inputs {
            let file_name = input
                .file_name()
                .unwrap_or_else(|| OsStr::new("image.png"))
                .to_string_lossy();
            for &mode in modes {
                for path in [ExecutionPath::Sequential, ExecutionPath::Parallel] {
                    jobs.push(Job {
                        mode,
                        input: input.clone(),
                        output: output_dir.join(format!("perf_{}_{}_{}", mode, path, file_name)),
                        path,
                    });
                }
            }
        }
        Self {
            jobs,
            options: FilterOptions::default(),
        }
    }
}

/// How the harness runs a plan.
#[derive(Clone, Debug, Default)]
pub struct HarnessConfig {
    /// Size of a dedicated worker pool; the global rayon pool when `None`.
    pub threads: Option<usize>,
    /// Abort the run at the first failing job.
    pub fail_fast: bool,
}

/// Outcome of one job.
#[derive(Clone, Debug)]
pub struct JobReport {
    pub job: Job,
    /// Kernel time, excluding decode and encode.
    pub elapsed: Option<Duration>,
    pub error: Option<String>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Sequential vs parallel timing of one (mode, input) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub mode: FilterMode,
    pub input: PathBuf,
    pub sequential: Duration,
    pub parallel: Duration,
}

impl Comparison {
    /// Sequential time divided by parallel time.
    pub fn speedup(&self) -> f64 {
        let parallel = self.parallel.as_secs_f64();
        if parallel > 0.0 {
            self.sequential.as_secs_f64() / parallel
        } else {
            f64::INFINITY
        }
    }
}

/// Build a fixed-size rayon pool.
pub fn build_pool(threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("image-modifier-{}", i))
        .build()
        .map_err(|e| FilterError::InvalidOptions(format!("cannot build thread pool: {}", e)))
}

/// Run one job and return the kernel time.
pub fn run_job(job: &Job, options: &FilterOptions, pool: Option<&ThreadPool>) -> Result<Duration> {
    let input = codec::decode(&job.input)?;

    let start = Instant::now();
    let output = match pool {
        Some(pool) => pool.install(|| apply_with(job.mode, job.path, &input, options))?,
        None => apply_with(job.mode, job.path, &input, options)?,
    };
    let elapsed = start.elapsed();

    codec::encode(&output, &job.output)?;
    Ok(elapsed)
}

/// Run every job of `plan` in order.
///
/// Failed jobs are reported and skipped unless `config.fail_fast` is set.
pub fn run_plan(plan: &Plan, config: &HarnessConfig) -> Result<Vec<JobReport>> {
    plan.options.validate()?;

    let pool = config.threads.map(build_pool).transpose()?;
    let total = plan.jobs.len();
    let mut reports = Vec::with_capacity(total);

    for (i, job) in plan.jobs.iter().enumerate() {
        info!(
            "[{}/{}] {} {} ({})",
            i + 1,
            total,
            job.mode,
            job.input.display(),
            job.path
        );

        match run_job(job, &plan.options, pool.as_ref()) {
            Ok(elapsed) => {
                info!(
                    "[{}/{}] completed in {:.3} ms -> {}",
                    i + 1,
                    total,
                    elapsed.as_secs_f64() * 1000.0,
                    job.output.display()
                );
                reports.push(JobReport {
                    job: job.clone(),
                    elapsed: Some(elapsed),
                    error: None,
                });
            }
            Err(err) if config.fail_fast => return Err(err),
            Err(err) => {
                warn!("[{}/{}] failed: {}", i + 1, total, err);
                reports.push(JobReport {
                    job: job.clone(),
                    elapsed: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok(reports)
}

/// Pair successful sequential and parallel reports of the same mode and input.
///
/// Pairs are returned in the order their sequential report appears.
pub fn compare_reports(reports: &[JobReport]) -> Vec<Comparison> {
    reports
        .iter()
        .filter(|r| r.job.path == ExecutionPath::Sequential)
        .filter_map(|seq| {
            let sequential = seq.elapsed?;
            let parallel = reports
                .iter()
                .filter(|r| {
                    r.job.path == ExecutionPath::Parallel
                        && r.job.mode == seq.job.mode
                        && r.job.input == seq.job.input
                })
                .find_map(|r| r.elapsed)?;
            Some(Comparison {
                mode: seq.job.mode,
                input: seq.job.input.clone(),
                sequential,
                parallel,
            })
        })
        .collect()
}
