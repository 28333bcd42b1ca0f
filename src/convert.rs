//! Main entry point for converting match files in bulk.

use crate::errors::{self, Result};
use crate::normalize;
use crate::parallelism;
use itertools::Itertools;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to each input file.
#[derive(Debug, Default)]
pub struct ConvertSummary {
    /// Tables written, in the order of the input files.
    pub converted: Vec<PathBuf>,
    /// Input files that could not be converted, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

fn is_match_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Match files to convert: `source` itself if it is a file, otherwise the
/// YAML files directly in it, sorted by name.
pub fn match_files(source: &Path) -> Result<Vec<PathBuf>> {
    if source.is_file() {
        return Ok(vec![source.to_owned()]);
    }
    if !source.is_dir() {
        return Err(errors::invalid_argument(format!(
            "no such file or directory: {}",
            source.display()
        )));
    }
    let mut files = vec![];
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if is_match_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Normalize every match file in `source` and write the tables into `dest`.
///
/// A file that fails is logged and recorded, and does not stop the others.
pub fn convert_dir(source: &Path, dest: &Path, nthreads: usize) -> Result<ConvertSummary> {
    if !dest.is_dir() {
        return Err(errors::invalid_argument(format!(
            "not a directory: {}",
            dest.display()
        )));
    }
    let files = match_files(source)?;
    if files.is_empty() {
        warn!(target: "crease", "no match files in {}", source.display());
    }
    info!(target: "crease", "convert: {} match files", files.len());
    let results = parallelism::run_jobs(files.clone(), nthreads, |path| {
        normalize::write_match(&path, dest)
    });
    let mut summary = ConvertSummary::default();
    for (path, result) in files.into_iter().zip(results) {
        match result {
            Ok(outfile) => {
                debug!(target: "crease", "{} -> {}", path.display(), outfile.display());
                summary.converted.push(outfile);
            }
            Err(e) => {
                warn!(target: "crease", "{e}");
                summary.failed.push((path, e.to_string()));
            }
        }
    }
    for (outfile, n) in summary.converted.iter().counts() {
        if n > 1 {
            warn!(
                target: "crease",
                "{} was written by {n} match files, only one of them is kept",
                outfile.display()
            );
        }
    }
    info!(
        target: "crease",
        "converted {} of {} match files",
        summary.converted.len(),
        summary.converted.len() + summary.failed.len()
    );
    Ok(summary)
}
