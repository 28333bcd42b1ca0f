//! Combining normalized match files into multi-match tables.
//!
//! Normalized files are named `{team1}-{team2}-{date}.csv`. Combined tables
//! are written as `{team1}-{team2}-allMatches.csv` and are never picked up
//! again as match files.

use crate::errors::{self, Result};
use crate::information;
use crate::parallelism;
use crate::table::{self, Delivery};
use glob::Pattern;
use itertools::Itertools;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const COMBINED_SUFFIX: &str = "-allMatches.csv";

/// Outcome of saving the combined tables of a roster of teams.
#[derive(Debug, Default)]
pub struct RosterSummary {
    pub written: Vec<PathBuf>,
    /// Pairs of teams that never met.
    pub skipped: Vec<(String, String)>,
    pub failed: Vec<(String, String, String)>,
}

fn pattern_in(dir: &Path, file_pattern: &str) -> Result<String> {
    let dir = dir
        .to_str()
        .ok_or_else(|| errors::invalid_argument(format!("not a UTF-8 path: {}", dir.display())))?;
    let pattern = Path::new(&Pattern::escape(dir)).join(file_pattern);
    Ok(pattern.to_string_lossy().into_owned())
}

/// Match files in `dir` matching any of `patterns`, sorted, without duplicates.
pub fn match_files(dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for p in patterns {
        for entry in glob::glob(&pattern_in(dir, p)?)? {
            let path = entry?;
            let combined = path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.ends_with(COMBINED_SUFFIX));
            if !combined {
                files.insert(path);
            }
        }
    }
    Ok(files.into_iter().collect_vec())
}

/// Concatenate match files in the given order.
pub fn combine(files: &[PathBuf]) -> Result<Vec<Delivery>> {
    let mut rows = vec![];
    for path in files {
        rows.extend(table::read_file(path)?);
    }
    debug!(target: "crease", "combined {} files, {} rows", files.len(), rows.len());
    Ok(rows)
}

fn combine_matching(dir: &Path, patterns: &[String]) -> Result<Option<Vec<Delivery>>> {
    let files = match_files(dir, patterns)?;
    if files.is_empty() {
        return Ok(None);
    }
    Ok(Some(combine(&files)?))
}

/// All matches between `team1` and `team2`, in either order of teams.
pub fn matches_between(dir: &Path, team1: &str, team2: &str) -> Result<Option<Vec<Delivery>>> {
    let (t1, t2) = (Pattern::escape(team1), Pattern::escape(team2));
    combine_matching(dir, &[format!("{t1}-{t2}-*.csv"), format!("{t2}-{t1}-*.csv")])
}

/// All matches of `team` against anyone.
pub fn matches_against_all(dir: &Path, team: &str) -> Result<Option<Vec<Delivery>>> {
    let t = Pattern::escape(team);
    combine_matching(dir, &[format!("{t}-*.csv"), format!("*-{t}-*.csv")])
}

pub fn combined_name(team1: &str, team2: &str) -> String {
    format!("{team1}-{team2}{COMBINED_SUFFIX}")
}

fn save_pair(dir: &Path, dest: &Path, team1: &str, team2: &str) -> Result<Option<PathBuf>> {
    match matches_between(dir, team1, team2)? {
        None => Ok(None),
        Some(rows) => {
            let path = dest.join(combined_name(team1, team2));
            table::write_file(&path, &rows)?;
            information::table_statistics(&rows);
            Ok(Some(path))
        }
    }
}

/// Save one combined table for each unordered pair of teams in `roster`.
///
/// Pairs that never met are skipped. A pair that fails is logged and
/// counted, and does not stop the others.
pub fn save_roster(dir: &Path, dest: &Path, roster: &[String], nthreads: usize) -> Result<RosterSummary> {
    let teams = roster.iter().unique().collect_vec();
    if teams.len() < 2 {
        return Err(errors::invalid_argument_ref("a roster needs at least two teams"));
    }
    if !dest.is_dir() {
        return Err(errors::invalid_argument(format!(
            "not a directory: {}",
            dest.display()
        )));
    }
    let pairs = teams.into_iter().tuple_combinations::<(_, _)>().collect_vec();
    info!(target: "crease", "roster: {} pairs of teams", pairs.len());
    let results = parallelism::run_jobs(pairs.clone(), nthreads, |(t1, t2)| {
        save_pair(dir, dest, t1, t2)
    });
    let mut summary = RosterSummary::default();
    for ((t1, t2), result) in pairs.into_iter().zip(results) {
        match result {
            Ok(Some(path)) => summary.written.push(path),
            Ok(None) => {
                debug!(target: "crease", "{t1} and {t2} never met");
                summary.skipped.push((t1.clone(), t2.clone()));
            }
            Err(e) => {
                warn!(target: "crease", "{t1} vs {t2}: {e}");
                summary.failed.push((t1.clone(), t2.clone(), e.to_string()));
            }
        }
    }
    info!(
        target: "crease",
        "roster: {} written, {} skipped, {} failed",
        summary.written.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::table::test::{ball, info};
    use std::fs;

    fn save_match(dir: &Path, team1: &str, team2: &str, date: &str) {
        let info = info(team1, team2, date);
        let rows = [
            ball(&info, team1, 0, "x", "y", 1),
            ball(&info, team2, 0, "y", "x", 2),
        ];
        let path = dir.join(format!("{team1}-{team2}-{date}.csv"));
        table::write_file(&path, &rows).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        save_match(dir.path(), "India", "Australia", "2019-03-02");
        save_match(dir.path(), "Australia", "India", "2019-03-05");
        save_match(dir.path(), "India", "England", "2019-07-01");
        save_match(dir.path(), "Sri Lanka", "England", "2019-07-04");
        dir
    }

    #[test]
    fn between_either_order() {
        let dir = fixture();
        let rows = matches_between(dir.path(), "India", "Australia")
            .unwrap()
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].date, "2019-03-05");
        assert!(matches_between(dir.path(), "India", "Sri Lanka")
            .unwrap()
            .is_none());
    }

    #[test]
    fn against_all() {
        let dir = fixture();
        let rows = matches_against_all(dir.path(), "India").unwrap().unwrap();
        assert_eq!(results_dates(&rows), ["2019-03-05", "2019-03-02", "2019-07-01"]);
        let rows = matches_against_all(dir.path(), "England").unwrap().unwrap();
        assert_eq!(rows.len(), 4);
    }

    fn results_dates(rows: &[Delivery]) -> Vec<&str> {
        rows.iter().map(|d| d.date.as_str()).unique().collect_vec()
    }

    #[test]
    fn roster() {
        let dir = fixture();
        let dest = tempfile::tempdir().unwrap();
        let roster = ["India", "Australia", "England", "India"].map(str::to_owned);
        let summary = save_roster(dir.path(), dest.path(), &roster, 2).unwrap();
        assert_eq!(
            summary.written,
            [
                dest.path().join("India-Australia-allMatches.csv"),
                dest.path().join("India-England-allMatches.csv"),
            ]
        );
        assert_eq!(
            summary.skipped,
            [("Australia".to_owned(), "England".to_owned())]
        );
        assert!(summary.failed.is_empty());
        let rows = table::read_file(&summary.written[0]).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(save_roster(dir.path(), dest.path(), &roster[..1], 2).is_err());
    }

    #[test]
    fn combined_files_are_not_inputs() {
        let dir = fixture();
        let rows = matches_between(dir.path(), "India", "Australia")
            .unwrap()
            .unwrap();
        let path = dir.path().join(combined_name("India", "Australia"));
        table::write_file(&path, &rows).unwrap();
        let again = matches_between(dir.path(), "India", "Australia")
            .unwrap()
            .unwrap();
        assert_eq!(again.len(), 4);
        assert!(fs::metadata(path).is_ok());
    }
}
