//! Write the pixel difference of two images.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::info;

use image_modifier::{codec, diff, DiffStats};

/// Compute |first - second| per pixel and channel and save it as an image.
///
/// Both images are converted to RGB first and must have the same size.
#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    first: PathBuf,
    second: PathBuf,
    output: PathBuf,
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
    let result = diff(&args.first, &args.second)?;

    let stats = DiffStats::from_buffer(&result);
    if stats.identical() {
        info!("Images are identical");
    } else {
        info!(
            "{} differing pixels, max channel difference {}, mean {:.3}",
            stats.differing_pixels, stats.max, stats.mean
        );
    }

    codec::encode(&result, &args.output)?;
    info!("Exported the difference to {}", args.output.display());
    Ok(())
}
