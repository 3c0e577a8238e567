// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use coverage_data::CoverageData;
use lcov_exporter::LcovExporter;

/// Export a JSON coverage tree as an LCOV tracefile.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Coverage data, as written by `CoverageData::to_json`.
    coverage: PathBuf,

    /// Output file. Defaults to `lcov.info` in the current directory.
    #[arg(short, long)]
    output: Option<String>,

    /// Directory to search for `.covlcov` from. Defaults to the current
    /// directory.
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let text = std::fs::read_to_string(&args.coverage)
        .with_context(|| format!("unable to read coverage: {}", args.coverage.display()))?;
    let coverage = CoverageData::from_json(&text)?;

    let mut exporter = LcovExporter::new();
    if let Some(dir) = args.config_dir {
        exporter = exporter.with_start_dir(dir);
    }

    let outcome = exporter.export(&coverage, args.output.as_deref())?;

    match outcome.records {
        Some(records) => {
            println!("{} ({} records)", outcome.output_path.display(), records);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("{} (not written)", outcome.output_path.display());
            Ok(ExitCode::FAILURE)
        }
    }
}
