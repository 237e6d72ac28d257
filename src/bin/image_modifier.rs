//! Apply one filter to one image.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use image_modifier::harness::build_pool;
use image_modifier::{apply_with, codec, ExecutionPath, FilterMode, FilterOptions};

/// Convert image colors or apply a filter.
///
/// Modes: `grey` converts to greyscale, `hsv` adjusts hue, saturation and
/// value, `blur` applies a Gaussian blur, `emboss` applies an emboss filter.
///
/// Use the `RUST_LOG` environment variable to configure logging.
#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    /// Filter to apply: grey, blur, hsv or emboss.
    mode: String,
    /// Image to read.
    input: PathBuf,
    /// Where to write the result. The format follows the extension.
    output: PathBuf,

    /// Execution path: sequential or parallel.
    #[arg(long, default_value = "parallel")]
    path: String,
    /// Blur kernel radius in pixels.
    #[arg(long)]
    blur_radius: Option<usize>,
    /// Worker threads for the parallel path. Defaults to one per core.
    #[arg(long)]
    threads: Option<usize>,
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
    let mode: FilterMode = args.mode.parse()?;
    let path: ExecutionPath = args.path.parse()?;

    let mut options = FilterOptions::default();
    if let Some(radius) = args.blur_radius {
        options.blur_radius = radius;
    }
    options.validate()?;

    let input = codec::decode(&args.input)?;
    info!(
        "Loaded file {} with {} rows and {} columns",
        args.input.display(),
        input.height(),
        input.width()
    );

    let pool = args.threads.map(build_pool).transpose()?;

    let start = Instant::now();
    let output = match &pool {
        Some(pool) => pool.install(|| apply_with(mode, path, &input, &options)),
        None => apply_with(mode, path, &input, &options),
    }
    .with_context(|| format!("{} failed", mode))?;
    info!(
        "The operation {} ({}) completed in {:.3} ms",
        mode,
        path,
        start.elapsed().as_secs_f64() * 1000.0
    );

    codec::encode(&output, &args.output)?;
    info!("Exported the result to {}", args.output.display());

    Ok(())
}
