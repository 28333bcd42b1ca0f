//! Data structures for representing the input: one match in Cricsheet YAML.
//!
//! Everything that may be missing from a match file is an `Option` or a
//! defaulted collection here; the normalizer decides what is fatal.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct RawMatch {
    pub info: Option<Info>,
    #[serde(default)]
    pub innings: Vec<BTreeMap<String, RawInnings>>,
}

#[derive(Debug, Deserialize)]
pub struct Info {
    pub city: Option<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    pub gender: Option<String>,
    pub match_type: Option<String>,
    pub neutral_venue: Option<Value>,
    pub non_boundary: Option<Value>,
    pub outcome: Option<Outcome>,
    pub overs: Option<u32>,
    #[serde(default)]
    pub player_of_match: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    pub toss: Option<Toss>,
    pub venue: Option<String>,
}

/// Match outcome.
///
/// A decided match has `winner` and `by`; a tie has `result` and possibly a
/// tiebreak (`eliminator` or `bowl_out`) naming the team that went through.
#[derive(Debug, Deserialize)]
pub struct Outcome {
    pub winner: Option<String>,
    pub by: Option<Mapping>,
    pub result: Option<String>,
    pub eliminator: Option<String>,
    pub bowl_out: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Toss {
    pub winner: Option<String>,
    pub decision: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawInnings {
    pub team: Option<String>,
    /// Each entry maps a ball label such as `0.1` to a [RawDelivery].
    #[serde(default)]
    pub deliveries: Vec<Mapping>,
}

#[derive(Debug, Deserialize)]
pub struct RawDelivery {
    pub batsman: Option<String>,
    pub bowler: Option<String>,
    pub non_striker: Option<String>,
    pub runs: Option<RawRuns>,
    pub extras: Option<RawExtras>,
    #[serde(alias = "wickets")]
    pub wicket: Option<RawWickets>,
}

#[derive(Debug, Deserialize)]
pub struct RawRuns {
    #[serde(default)]
    pub batsman: u32,
    #[serde(default)]
    pub extras: u32,
    pub total: Option<u32>,
    pub non_boundary: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawExtras {
    #[serde(default)]
    pub wides: u32,
    #[serde(default)]
    pub noballs: u32,
    #[serde(default)]
    pub legbyes: u32,
    #[serde(default)]
    pub byes: u32,
    #[serde(default)]
    pub penalty: u32,
}

impl RawExtras {
    pub fn sum(&self) -> u32 {
        self.wides + self.noballs + self.legbyes + self.byes + self.penalty
    }
}

/// Older files have a single wicket mapping, newer ones a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawWickets {
    One(RawWicket),
    Many(Vec<RawWicket>),
}

impl RawWickets {
    pub fn first(&self) -> Option<&RawWicket> {
        match self {
            RawWickets::One(w) => Some(w),
            RawWickets::Many(ws) => ws.first(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawWicket {
    pub kind: Option<String>,
    pub player_out: Option<String>,
    #[serde(default)]
    pub fielders: Vec<Fielder>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Fielder {
    Name(String),
    Named { name: String },
}

impl Fielder {
    pub fn name(&self) -> &str {
        match self {
            Fielder::Name(name) => name,
            Fielder::Named { name } => name,
        }
    }
}

/// Interpret a YAML scalar used as a yes/no marker (`1`, `true`, `yes`).
pub fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "y"),
        _ => false,
    }
}

/// Render a ball label (a mapping key such as `0.1`) for log messages.
pub fn ball_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => format!("{other:?}"),
    }
}

pub fn parse(text: &str) -> serde_yaml::Result<RawMatch> {
    serde_yaml::from_str(text)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags() {
        assert!(flag(&Value::from(1)));
        assert!(flag(&Value::from(true)));
        assert!(flag(&Value::from("yes")));
        assert!(!flag(&Value::from(0)));
        assert!(!flag(&Value::from("no")));
        assert!(!flag(&Value::Null));
    }

    #[test]
    fn wicket_shapes() {
        let one: RawWickets =
            serde_yaml::from_str("{kind: caught, player_out: A, fielders: [B]}").unwrap();
        let w = one.first().unwrap();
        assert_eq!(w.kind.as_deref(), Some("caught"));
        assert_eq!(w.fielders[0].name(), "B");

        let many: RawWickets =
            serde_yaml::from_str("[{kind: caught, player_out: A, fielders: [{name: C}]}]")
                .unwrap();
        assert_eq!(many.first().unwrap().fielders[0].name(), "C");
    }

    #[test]
    fn parse_minimal() {
        let m = parse(
            "info:\n  teams: [A, B]\ninnings:\n- 1st innings:\n    team: A\n    deliveries:\n    - 0.1: {batsman: x, bowler: y, non_striker: z}\n",
        )
        .unwrap();
        assert_eq!(m.info.unwrap().teams, ["A", "B"]);
        let innings = &m.innings[0]["1st innings"];
        assert_eq!(innings.team.as_deref(), Some("A"));
        let (key, _) = innings.deliveries[0].iter().next().unwrap();
        assert_eq!(ball_label(key), "0.1");
    }
}
