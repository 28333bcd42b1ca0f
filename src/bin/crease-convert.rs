use anyhow::{Context, Result, anyhow};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use crease::convert;
use crease::output;
use crease::parallelism;
use std::path::PathBuf;
use std::{fs, process};

/// Convert Cricsheet YAML match files into one CSV table per match
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Match file, or directory of match files (YAML)
    source: PathBuf,
    /// Output directory (CSV)
    dest: PathBuf,
    /// Number of worker threads [default: number of CPUs]
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Create the output directory if it does not exist
    #[arg(long)]
    create: bool,
    /// Fail if any match file could not be converted
    #[arg(long)]
    strict: bool,
    /// Report errors as a JSON file
    #[arg(long)]
    error_file: Option<PathBuf>,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn process(args: &Args) -> Result<()> {
    if args.create {
        fs::create_dir_all(&args.dest)
            .with_context(|| format!("cannot create {}", args.dest.display()))?;
    }
    let jobs = args.jobs.unwrap_or_else(parallelism::default_threads);
    let summary = convert::convert_dir(&args.source, &args.dest, jobs)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("cannot convert {}", args.source.display()))?;
    for (path, e) in &summary.failed {
        println!("failed: {}: {e}", path.display());
    }
    if args.strict && !summary.failed.is_empty() {
        anyhow::bail!(
            "{} of {} match files could not be converted",
            summary.failed.len(),
            summary.failed.len() + summary.converted.len()
        );
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    if let Err(e) = process(&args) {
        output::report_error(args.error_file.as_deref(), &format!("{e:#}"));
        process::exit(1);
    }
}
