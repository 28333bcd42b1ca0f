//! The normalized delivery table and its CSV persistence.

use crate::errors::{self, Result};
use crate::sentinel;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Column names of a persisted table, in order.
pub const COLUMNS: [&str; 35] = [
    "delivery",
    "batsman",
    "bowler",
    "non_striker",
    "runs",
    "extras",
    "wides",
    "noballs",
    "legbyes",
    "byes",
    "penalty",
    "total",
    "kind",
    "player_out",
    "fielders",
    "non_boundary",
    "team",
    "city",
    "date",
    "gender",
    "match_type",
    "neutral_venue",
    "winner",
    "winType",
    "winMargin",
    "result",
    "resultHow",
    "resultTeam",
    "overs",
    "team1",
    "team2",
    "tossWinner",
    "tossDecision",
    "venue",
    "ManOfMatch",
];

/// Match-level fields, broadcast onto every [Delivery] of the match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchInfo {
    pub city: Option<String>,
    pub date: String,
    pub gender: String,
    pub match_type: String,
    pub neutral_venue: bool,
    pub winner: Option<String>,
    pub win_type: Option<String>,
    pub win_margin: Option<u32>,
    pub result: Option<String>,
    pub result_how: Option<String>,
    pub result_team: Option<String>,
    pub overs: u32,
    pub team1: String,
    pub team2: String,
    pub toss_winner: String,
    pub toss_decision: String,
    pub venue: String,
    pub man_of_match: Option<String>,
}

/// One row of the normalized table: one ball bowled.
///
/// The striker and the runs they scored are distinct fields; the wire names
/// are `batsman` and `runs`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Delivery {
    /// 0-based index within the innings. The second innings starts again at 0.
    pub delivery: u32,
    #[serde(rename = "batsman")]
    pub striker: String,
    pub bowler: String,
    pub non_striker: String,
    #[serde(rename = "runs")]
    pub runs_off_bat: u32,
    pub extras: u32,
    pub wides: u32,
    pub noballs: u32,
    pub legbyes: u32,
    pub byes: u32,
    pub penalty: u32,
    pub total: u32,
    #[serde(with = "sentinel::text")]
    pub kind: Option<String>,
    #[serde(with = "sentinel::text")]
    pub player_out: Option<String>,
    #[serde(with = "sentinel::text")]
    pub fielders: Option<String>,
    #[serde(with = "sentinel::flag")]
    pub non_boundary: bool,
    pub team: String,

    #[serde(with = "sentinel::text")]
    pub city: Option<String>,
    pub date: String,
    pub gender: String,
    pub match_type: String,
    #[serde(with = "sentinel::flag")]
    pub neutral_venue: bool,
    #[serde(with = "sentinel::text")]
    pub winner: Option<String>,
    #[serde(rename = "winType", with = "sentinel::text")]
    pub win_type: Option<String>,
    #[serde(rename = "winMargin", with = "sentinel::count")]
    pub win_margin: Option<u32>,
    #[serde(with = "sentinel::text")]
    pub result: Option<String>,
    #[serde(rename = "resultHow", with = "sentinel::text")]
    pub result_how: Option<String>,
    #[serde(rename = "resultTeam", with = "sentinel::text")]
    pub result_team: Option<String>,
    pub overs: u32,
    pub team1: String,
    pub team2: String,
    #[serde(rename = "tossWinner")]
    pub toss_winner: String,
    #[serde(rename = "tossDecision")]
    pub toss_decision: String,
    pub venue: String,
    #[serde(rename = "ManOfMatch", with = "sentinel::text")]
    pub man_of_match: Option<String>,
}

/// Identifies the match a row belongs to.
pub type MatchKey<'a> = (&'a str, &'a str, &'a str);

impl Delivery {
    /// A delivery of the match described by `info`, with no runs, extras or wicket.
    pub fn blank(
        info: &MatchInfo,
        team: &str,
        delivery: u32,
        striker: &str,
        bowler: &str,
        non_striker: &str,
    ) -> Delivery {
        Delivery {
            delivery,
            striker: striker.to_owned(),
            bowler: bowler.to_owned(),
            non_striker: non_striker.to_owned(),
            runs_off_bat: 0,
            extras: 0,
            wides: 0,
            noballs: 0,
            legbyes: 0,
            byes: 0,
            penalty: 0,
            total: 0,
            kind: None,
            player_out: None,
            fielders: None,
            non_boundary: false,
            team: team.to_owned(),
            city: info.city.clone(),
            date: info.date.clone(),
            gender: info.gender.clone(),
            match_type: info.match_type.clone(),
            neutral_venue: info.neutral_venue,
            winner: info.winner.clone(),
            win_type: info.win_type.clone(),
            win_margin: info.win_margin,
            result: info.result.clone(),
            result_how: info.result_how.clone(),
            result_team: info.result_team.clone(),
            overs: info.overs,
            team1: info.team1.clone(),
            team2: info.team2.clone(),
            toss_winner: info.toss_winner.clone(),
            toss_decision: info.toss_decision.clone(),
            venue: info.venue.clone(),
            man_of_match: info.man_of_match.clone(),
        }
    }

    pub fn is_wicket(&self) -> bool {
        self.player_out.is_some()
    }

    /// Runs charged to the bowler: byes and leg byes are not.
    pub fn conceded(&self) -> u32 {
        self.runs_off_bat + self.wides + self.noballs
    }

    pub fn match_key(&self) -> MatchKey {
        (&self.date, &self.team1, &self.team2)
    }

    pub fn played(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }
}

/// Rows where `team` was batting.
///
/// The bowling reports use the same rows: they are about the bowlers who
/// bowled to `team`.
pub fn batting<'a>(rows: &'a [Delivery], team: &str) -> Vec<&'a Delivery> {
    rows.iter().filter(|d| d.team == team).collect_vec()
}

pub fn write_csv<W: io::Write>(rows: &[Delivery], writer: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        w.write_record(COLUMNS)?;
    }
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<Delivery>> {
    let mut r = csv::Reader::from_reader(reader);
    let headers = r.headers()?.clone();
    if headers.iter().ne(COLUMNS) {
        return Err(errors::invalid_input(format!(
            "unexpected columns: {}",
            headers.iter().join(",")
        )));
    }
    let rows = r.deserialize().collect::<csv::Result<Vec<Delivery>>>()?;
    Ok(rows)
}

pub fn write_file(path: &Path, rows: &[Delivery]) -> Result<()> {
    debug!(target: "crease", "write: {}, {} rows", path.display(), rows.len());
    let file = fs::File::create(path)
        .map_err(|e| errors::invalid_argument(format!("cannot create {}: {e}", path.display())))?;
    write_csv(rows, io::BufWriter::new(file))
}

pub fn read_file(path: &Path) -> Result<Vec<Delivery>> {
    debug!(target: "crease", "read: {}", path.display());
    let file = fs::File::open(path)?;
    read_csv(io::BufReader::new(file))
        .map_err(|e| errors::invalid_input(format!("{}: {e}", path.display())))
}
