//! Compare sequential and parallel filter performance.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::ImageFormat;
use log::info;

use image_modifier::harness::{compare_reports, run_plan, HarnessConfig, Plan};
use image_modifier::FilterMode;

/// Run filters over sample images with both execution paths and report the
/// speedup of the parallel path.
///
/// Either pass a TOML plan with `--plan`, or a directory of images with
/// `--input-dir` to run every selected mode on every image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    /// TOML plan listing the jobs to run.
    #[arg(long, conflicts_with = "input_dir")]
    plan: Option<PathBuf>,
    /// Directory of sample images.
    #[arg(long, required_unless_present = "plan")]
    input_dir: Option<PathBuf>,
    /// Directory receiving the filtered images.
    #[arg(long, default_value = "export")]
    output_dir: PathBuf,
    /// Modes to run for every sample image.
    #[arg(long, value_delimiter = ',', default_value = "grey,blur,hsv")]
    modes: Vec<String>,
    /// Worker threads for the parallel path. Defaults to one per core.
    #[arg(long)]
    threads: Option<usize>,
    /// Stop at the first failing job.
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let plan = match (&args.plan, &args.input_dir) {
        (Some(plan), _) => Plan::load(plan)?,
        (None, Some(input_dir)) => {
            let modes = args
                .modes
                .iter()
                .map(|m| m.parse::<FilterMode>())
                .collect::<Result<Vec<_>, _>>()?;
            let inputs = sample_images(input_dir)?;
            fs::create_dir_all(&args.output_dir)
                .with_context(|| format!("creating {}", args.output_dir.display()))?;
            Plan::compare(&modes, &inputs, &args.output_dir)
        }
        (None, None) => bail!("either --plan or --input-dir is required"),
    };

    info!("Running {} jobs", plan.jobs.len());

    let config = HarnessConfig {
        threads: args.threads,
        fail_fast: args.fail_fast,
    };
    let reports = run_plan(&plan, &config)?;

    println!(
        "{:<8} {:<32} {:>14} {:>14} {:>8}",
        "mode", "input", "sequential ms", "parallel ms", "speedup"
    );
    for cmp in compare_reports(&reports) {
        let name = cmp
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "{:<8} {:<32} {:>14.3} {:>14.3} {:>7.2}x",
            cmp.mode,
            name,
            cmp.sequential.as_secs_f64() * 1000.0,
            cmp.parallel.as_secs_f64() * 1000.0,
            cmp.speedup()
        );
    }

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    if failed > 0 {
        bail!("{} of {} jobs failed", failed, reports.len());
    }
    Ok(())
}

/// Image files in `dir` whose extension maps to a known format, sorted.
fn sample_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && ImageFormat::from_path(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        bail!("no images found in {}", dir.display());
    }
    Ok(files)
}
