use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use crease::collect;
use crease::information;
use crease::output;
use crease::parallelism;
use crease::table;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process;

/// Combine per-match CSV tables into multi-match tables
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Directory of per-match tables (CSV)
    dir: PathBuf,
    #[command(subcommand)]
    command: Command,
    /// Report errors as a JSON file
    #[arg(long)]
    error_file: Option<PathBuf>,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand)]
enum Command {
    /// All matches between two teams
    Between {
        team1: String,
        team2: String,
        /// Output file (CSV)
        outfile: PathBuf,
    },
    /// All matches of one team against anyone
    AgainstAll {
        team: String,
        /// Output file (CSV)
        outfile: PathBuf,
    },
    /// One combined table for each pair of teams in the roster
    Roster {
        /// Output directory
        dest: PathBuf,
        /// Teams of the competition
        #[arg(required = true, num_args = 2..)]
        teams: Vec<String>,
        /// Number of worker threads [default: number of CPUs]
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

fn save(outfile: &Path, rows: Option<Vec<table::Delivery>>, what: &str) -> Result<()> {
    match rows {
        None => {
            warn!(target: "crease", "no matches found: {what}");
            println!("no matches found: {what}");
        }
        Some(rows) => {
            information::table_statistics(&rows);
            table::write_file(outfile, &rows)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("cannot write {}", outfile.display()))?;
            info!(target: "crease", "{what}: {} rows written to {}", rows.len(), outfile.display());
        }
    }
    Ok(())
}

fn process(args: &Args) -> Result<()> {
    match &args.command {
        Command::Between {
            team1,
            team2,
            outfile,
        } => {
            let rows = collect::matches_between(&args.dir, team1, team2)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("cannot combine {team1} vs {team2}"))?;
            save(outfile, rows, &format!("{team1} vs {team2}"))
        }
        Command::AgainstAll { team, outfile } => {
            let rows = collect::matches_against_all(&args.dir, team)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("cannot combine {team} vs all"))?;
            save(outfile, rows, &format!("{team} vs all"))
        }
        Command::Roster { dest, teams, jobs } => {
            let jobs = jobs.unwrap_or_else(parallelism::default_threads);
            let summary = collect::save_roster(&args.dir, dest, teams, jobs)
                .map_err(|e| anyhow!(e))
                .context("cannot combine roster")?;
            for path in &summary.written {
                println!("written: {}", path.display());
            }
            for (t1, t2, e) in &summary.failed {
                println!("failed: {t1} vs {t2}: {e}");
            }
            Ok(())
        }
    }
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
