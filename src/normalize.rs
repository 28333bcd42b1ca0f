//! Flattening one raw match into the normalized delivery table.
//!
//! Every delivery of (at most) two innings becomes one [Delivery] row. The
//! optional parts of a delivery (`runs`, `extras`, `wicket`) and the optional
//! match metadata default independently of each other; only a malformed
//! top-level structure is an error, and then nothing is produced for the match.

use crate::errors::{self, Result};
use crate::information;
use crate::input::{self, Info, Outcome, RawDelivery, RawExtras, RawInnings, RawMatch};
use crate::table::{self, Delivery, MatchInfo};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use log::{debug, warn};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of innings that are normalized; later ones are super overs.
const MAX_INNINGS: usize = 2;

/// A normalized match.
pub struct Normalized {
    pub rows: Vec<Delivery>,
    /// `{team1}-{team2}-{date}.csv`
    pub file_name: String,
}

/// Normalize a parsed match, returning the table and its suggested file name.
pub fn normalize(raw: &RawMatch) -> Result<(Vec<Delivery>, String)> {
    let info = raw
        .info
        .as_ref()
        .ok_or_else(|| errors::invalid_input_ref("missing info"))?;
    let match_info = match_info(info)?;
    if raw.innings.is_empty() {
        return Err(errors::invalid_input_ref("no innings"));
    }
    let default_non_boundary = info.non_boundary.as_ref().is_some_and(input::flag);

    let mut rows = vec![];
    for (i, entry) in raw.innings.iter().enumerate() {
        let (name, innings) = single_innings(entry)?;
        if i >= MAX_INNINGS {
            debug!(target: "crease", "ignoring {name}");
            continue;
        }
        rows.extend(innings_rows(
            name,
            innings,
            &match_info,
            default_non_boundary,
        )?);
    }
    let file_name = format!(
        "{}-{}-{}.csv",
        match_info.team1, match_info.team2, match_info.date
    );
    Ok((rows, file_name))
}

/// Read, parse and normalize one match file.
pub fn normalize_file(path: &Path) -> Result<Normalized> {
    debug!(target: "crease", "read: {}", path.display());
    let text = fs::read_to_string(path)?;
    let raw = input::parse(&text)
        .map_err(|e| errors::invalid_input(format!("{}: {e}", path.display())))?;
    let (rows, file_name) =
        normalize(&raw).map_err(|e| errors::invalid_input(format!("{}: {e}", path.display())))?;
    information::statistics(&file_name, &rows);
    Ok(Normalized { rows, file_name })
}

/// Normalize one match file and write its table into `dest`.
///
/// Returns the path of the written table. `dest` must exist.
pub fn write_match(path: &Path, dest: &Path) -> Result<PathBuf> {
    if !dest.is_dir() {
        return Err(errors::invalid_argument(format!(
            "not a directory: {}",
            dest.display()
        )));
    }
    let normalized = normalize_file(path)?;
    let outfile = dest.join(&normalized.file_name);
    table::write_file(&outfile, &normalized.rows)?;
    Ok(outfile)
}

fn missing(what: &str) -> errors::Error {
    errors::invalid_input(format!("missing {what}"))
}

fn match_info(info: &Info) -> Result<MatchInfo> {
    let (team1, team2) = match info.teams.as_slice() {
        [a, b] => (a.clone(), b.clone()),
        teams => {
            return Err(errors::invalid_input(format!(
                "expected two teams, got {}",
                teams.len()
            )));
        }
    };
    let date = info
        .dates
        .first()
        .map(|d| format_date(d))
        .ok_or_else(|| missing("dates"))?;
    let toss = info.toss.as_ref().ok_or_else(|| missing("toss"))?;
    let outcome = info.outcome.as_ref();
    let (win_type, win_margin) = match outcome.and_then(|o| o.by.as_ref()).and_then(win_by) {
        Some((t, m)) => (Some(t), m),
        None => (None, None),
    };
    let (result_how, result_team) = tiebreak(outcome);
    Ok(MatchInfo {
        city: info.city.clone(),
        date,
        gender: info.gender.clone().ok_or_else(|| missing("gender"))?,
        match_type: info.match_type.clone().ok_or_else(|| missing("match_type"))?,
        neutral_venue: info.neutral_venue.as_ref().is_some_and(input::flag),
        winner: outcome.and_then(|o| o.winner.clone()),
        win_type,
        win_margin,
        result: outcome.and_then(|o| o.result.clone()),
        result_how,
        result_team,
        overs: info.overs.ok_or_else(|| missing("overs"))?,
        team1,
        team2,
        toss_winner: toss.winner.clone().ok_or_else(|| missing("toss winner"))?,
        toss_decision: toss
            .decision
            .clone()
            .ok_or_else(|| missing("toss decision"))?,
        venue: info.venue.clone().ok_or_else(|| missing("venue"))?,
        man_of_match: info.player_of_match.first().cloned(),
    })
}

/// How the match was won: `runs` or `wickets` and the margin.
///
/// Some matches list more than one key (an innings win has `innings` and
/// `runs`); runs take precedence, then wickets, then whatever key is there.
fn win_by(by: &Mapping) -> Option<(String, Option<u32>)> {
    let margin = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok());
    for key in ["runs", "wickets"] {
        if let Some(v) = by.get(key) {
            return Some((key.to_owned(), margin(v)));
        }
    }
    by.iter()
        .next()
        .and_then(|(k, v)| k.as_str().map(|k| (k.to_owned(), margin(v))))
}

/// How a tie was resolved and who went through.
fn tiebreak(outcome: Option<&Outcome>) -> (Option<String>, Option<String>) {
    match outcome {
        Some(Outcome {
            eliminator: Some(team),
            ..
        }) => (Some("eliminator".to_owned()), Some(team.clone())),
        Some(Outcome {
            bowl_out: Some(team),
            ..
        }) => (Some("bowl_out".to_owned()), Some(team.clone())),
        _ => (None, None),
    }
}

/// Format a match date as `YYYY-MM-DD`.
///
/// Accepts plain dates, datetimes and slash-separated dates; anything else is
/// kept verbatim.
pub fn format_date(raw: &str) -> String {
    const FORMAT: &str = "%Y-%m-%d";
    let s = raw.trim();
    let date = NaiveDate::parse_from_str(s, FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|d| d.date())
        });
    match date {
        Some(d) => d.format(FORMAT).to_string(),
        None => {
            warn!(target: "crease", "unrecognized date '{s}', using it as is");
            s.to_owned()
        }
    }
}

fn single_innings(entry: &BTreeMap<String, RawInnings>) -> Result<(&str, &RawInnings)> {
    match entry.iter().exactly_one() {
        Ok((name, innings)) => Ok((name, innings)),
        Err(_) => Err(errors::invalid_input(format!(
            "expected one innings per entry, got {}",
            entry.keys().join(", ")
        ))),
    }
}

fn innings_rows(
    name: &str,
    innings: &RawInnings,
    info: &MatchInfo,
    default_non_boundary: bool,
) -> Result<Vec<Delivery>> {
    let team = innings
        .team
        .as_deref()
        .ok_or_else(|| errors::invalid_input(format!("{name}: missing team")))?;
    let mut rows = Vec::with_capacity(innings.deliveries.len());
    for (i, entry) in innings.deliveries.iter().enumerate() {
        let (key, body) = entry.iter().exactly_one().map_err(|_| {
            errors::invalid_input(format!("{name}: delivery {i} is not a single ball"))
        })?;
        let label = input::ball_label(key);
        let raw: RawDelivery = serde_yaml::from_value(body.clone())
            .map_err(|e| errors::invalid_input(format!("{name}, ball {label}: {e}")))?;
        let delivery = u32::try_from(i)?;
        let row = delivery_row(&raw, delivery, team, info, default_non_boundary)
            .map_err(|e| errors::invalid_input(format!("{name}, ball {label}: {e}")))?;
        rows.push(row);
    }
    if !rows.iter().any(|d| d.is_wicket()) {
        debug!(target: "crease", "{name}: no wickets");
    }
    Ok(rows)
}

fn delivery_row(
    raw: &RawDelivery,
    delivery: u32,
    team: &str,
    info: &MatchInfo,
    default_non_boundary: bool,
) -> Result<Delivery> {
    let striker = raw.batsman.as_deref().ok_or_else(|| missing("batsman"))?;
    let bowler = raw.bowler.as_deref().ok_or_else(|| missing("bowler"))?;
    let non_striker = raw
        .non_striker
        .as_deref()
        .ok_or_else(|| missing("non_striker"))?;
    let mut row = Delivery::blank(info, team, delivery, striker, bowler, non_striker);

    let none = RawExtras::default();
    let breakdown = raw.extras.as_ref().unwrap_or(&none);
    row.wides = breakdown.wides;
    row.noballs = breakdown.noballs;
    row.legbyes = breakdown.legbyes;
    row.byes = breakdown.byes;
    row.penalty = breakdown.penalty;

    match &raw.runs {
        Some(runs) => {
            row.runs_off_bat = runs.batsman;
            row.extras = runs.extras;
        }
        None => row.extras = breakdown.sum(),
    }
    row.total = row.runs_off_bat + row.extras;
    if let Some(declared) = raw.runs.as_ref().and_then(|r| r.total) {
        if declared != row.total {
            warn!(
                target: "crease",
                "{team}, delivery {delivery}: total {declared} != {} + {}, using {}",
                row.runs_off_bat, row.extras, row.total
            );
        }
    }
    row.non_boundary = match raw.runs.as_ref().and_then(|r| r.non_boundary.as_ref()) {
        Some(v) => input::flag(v),
        None => default_non_boundary,
    };

    if let Some(wicket) = raw.wicket.as_ref().and_then(|w| w.first()) {
        row.kind = wicket.kind.clone();
        row.player_out = wicket.player_out.clone();
        let fielders = wicket.fielders.iter().map(|f| f.name()).join(", ");
        row.fielders = (!fielders.is_empty()).then_some(fielders);
    }
    Ok(row)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::table::COLUMNS;

    const HEADER: &str = "
info:
  city: Mumbai
  dates:
  - 2017-05-21
  gender: male
  match_type: T20
  outcome:
    by:
      runs: 1
    winner: A
  overs: 20
  player_of_match:
  - a1
  teams:
  - A
  - B
  toss:
    decision: bat
    winner: A
  venue: Rajiv Gandhi Stadium
";

    fn parse(deliveries: &str) -> RawMatch {
        input::parse(&format!("{HEADER}{deliveries}")).unwrap()
    }

    fn norm(deliveries: &str) -> Vec<Delivery> {
        normalize(&parse(deliveries)).unwrap().0
    }

    #[test]
    fn one_innings_of_dot_balls() {
        let balls = (1..=6)
            .map(|b| format!("    - 0.{b}: {{batsman: a1, bowler: b1, non_striker: a2, runs: {{batsman: 0, extras: 0, total: 0}}}}\n"))
            .join("");
        let rows = norm(&format!(
            "innings:\n- 1st innings:\n    team: A\n    deliveries:\n{balls}"
        ));
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|d| d.team == "A"));
        assert_eq!(rows.iter().map(|d| d.delivery).collect_vec(), [0, 1, 2, 3, 4, 5]);
        assert!(rows.iter().all(|d| d.total == 0 && !d.is_wicket()));
    }

    #[test]
    fn wides_without_runs() {
        let rows = norm(
            "innings:\n- 1st innings:\n    team: A\n    deliveries:\n    - 0.1: {batsman: a1, bowler: b1, non_striker: a2, extras: {wides: 1}}\n",
        );
        let d = &rows[0];
        assert_eq!(d.wides, 1);
        assert_eq!((d.byes, d.noballs, d.legbyes, d.penalty), (0, 0, 0, 0));
        assert_eq!(d.runs_off_bat, 0);
        assert_eq!(d.total, d.runs_off_bat + d.extras);
    }

    #[test]
    fn wicket_and_sentinels() {
        let rows = norm(
            "innings:
- 1st innings:
    team: A
    deliveries:
    - 0.1:
        batsman: a1
        bowler: b1
        non_striker: a2
        runs: {batsman: 0, extras: 0, total: 0}
        wicket: {kind: caught, player_out: a1, fielders: [b2, b3]}
    - 0.2:
        batsman: a3
        bowler: b1
        non_striker: a2
        runs: {batsman: 4, extras: 1, total: 5}
        extras: {legbyes: 1}
- 2nd innings:
    team: B
    deliveries:
    - 0.1: {batsman: b4, bowler: a5, non_striker: b5, runs: {batsman: 6, extras: 0, total: 6}}
",
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].kind.as_deref(), Some("caught"));
        assert_eq!(rows[0].player_out.as_deref(), Some("a1"));
        assert_eq!(rows[0].fielders.as_deref(), Some("b2, b3"));
        assert_eq!((rows[1].kind.as_ref(), rows[1].player_out.as_ref()), (None, None));
        assert_eq!(rows[1].fielders, None);
        assert_eq!((rows[1].legbyes, rows[1].extras, rows[1].total), (1, 1, 5));
        assert_eq!((rows[2].team.as_str(), rows[2].delivery), ("B", 0));
        assert!(rows.iter().all(|d| d.total == d.runs_off_bat + d.extras));
    }

    #[test]
    fn metadata_defaults() {
        let raw = input::parse(
            "
info:
  dates: [2010-03-12]
  gender: male
  match_type: T20
  outcome: {result: no result}
  overs: 20
  teams: [A, B]
  toss: {decision: field, winner: B}
  venue: Eden Gardens
innings:
- 1st innings:
    team: B
    deliveries: []
",
        )
        .unwrap();
        let info = match_info(raw.info.as_ref().unwrap()).unwrap();
        assert_eq!(info.city, None);
        assert!(!info.neutral_venue);
        assert_eq!(info.winner, None);
        assert_eq!((info.win_type, info.win_margin), (None, None));
        assert_eq!(info.result.as_deref(), Some("no result"));
        assert_eq!((info.result_how, info.result_team), (None, None));
        assert_eq!(info.man_of_match, None);
        let (rows, file_name) = normalize(&raw).unwrap();
        assert!(rows.is_empty());
        assert_eq!(file_name, "A-B-2010-03-12.csv");
    }

    #[test]
    fn tie_with_eliminator() {
        let raw = input::parse(
            "
info:
  dates: [2009-04-23]
  gender: male
  match_type: T20
  neutral_venue: 1
  outcome: {eliminator: B, result: tie}
  overs: 20
  teams: [A, B]
  toss: {decision: bat, winner: A}
  venue: Newlands
innings:
- 1st innings: {team: A, deliveries: []}
",
        )
        .unwrap();
        let info = match_info(raw.info.as_ref().unwrap()).unwrap();
        assert!(info.neutral_venue);
        assert_eq!(info.result.as_deref(), Some("tie"));
        assert_eq!(info.result_how.as_deref(), Some("eliminator"));
        assert_eq!(info.result_team.as_deref(), Some("B"));
    }

    #[test]
    fn win_by_wickets() {
        let by: Mapping = serde_yaml::from_str("{wickets: 7}").unwrap();
        assert_eq!(win_by(&by), Some(("wickets".to_owned(), Some(7))));
        let by: Mapping = serde_yaml::from_str("{innings: 1, runs: 20}").unwrap();
        assert_eq!(win_by(&by), Some(("runs".to_owned(), Some(20))));
    }

    #[test]
    fn dates() {
        assert_eq!(format_date("2008-04-18"), "2008-04-18");
        assert_eq!(format_date("2008-4-8"), "2008-04-08");
        assert_eq!(format_date("2008/04/18"), "2008-04-18");
        assert_eq!(format_date("2008-04-18 00:00:00"), "2008-04-18");
        assert_eq!(format_date("2008-04-18T10:00:00+05:30"), "2008-04-18");
        assert_eq!(format_date("April 2008"), "April 2008");
    }

    #[test]
    fn fatal_errors() {
        let no_innings = parse("innings: []\n");
        assert!(normalize(&no_innings).is_err());

        let no_team = parse("innings:\n- 1st innings:\n    deliveries: []\n");
        assert!(normalize(&no_team).is_err());

        let no_bowler = parse(
            "innings:\n- 1st innings:\n    team: A\n    deliveries:\n    - 0.1: {batsman: a1, non_striker: a2}\n",
        );
        assert!(normalize(&no_bowler).is_err());

        let no_toss = input::parse(
            "info: {dates: [2010-01-01], gender: male, match_type: T20, overs: 20, teams: [A, B], venue: V}\ninnings:\n- 1st innings: {team: A}\n",
        )
        .unwrap();
        let e = normalize(&no_toss).unwrap_err();
        assert_eq!(format!("{e}"), "invalid input: missing toss");
    }

    #[test]
    fn schema_is_fixed() {
        let rows = norm(
            "innings:\n- 1st innings:\n    team: A\n    deliveries:\n    - 0.1: {batsman: a1, bowler: b1, non_striker: a2}\n",
        );
        let mut buf = Vec::new();
        table::write_csv(&rows, &mut buf).unwrap();
        let header = String::from_utf8(buf).unwrap().lines().next().unwrap().to_owned();
        assert_eq!(header, COLUMNS.join(","));
    }

    #[test]
    fn non_boundary_flag() {
        let rows = norm(
            "innings:\n- 1st innings:\n    team: A\n    deliveries:\n    - 0.1: {batsman: a1, bowler: b1, non_striker: a2, runs: {batsman: 4, extras: 0, total: 4, non_boundary: true}}\n    - 0.2: {batsman: a1, bowler: b1, non_striker: a2, runs: {batsman: 4, extras: 0, total: 4}}\n",
        );
        assert!(rows[0].non_boundary);
        assert!(!rows[1].non_boundary);
    }

    #[test]
    fn super_overs_are_ignored() {
        let rows = norm(
            "innings:
- 1st innings: {team: A, deliveries: [{0.1: {batsman: a1, bowler: b1, non_striker: a2}}]}
- 2nd innings: {team: B, deliveries: [{0.1: {batsman: b1, bowler: a1, non_striker: b2}}]}
- 3rd innings: {team: A, deliveries: [{0.1: {batsman: a1, bowler: b1, non_striker: a2}}]}
",
        );
        assert_eq!(rows.len(), 2);
    }
}
