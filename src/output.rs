//! Data structures for representing the output, and writing them.

use crate::errors::Result;
use crate::sentinel;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    PrettyJson,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Format::Csv => write!(f, "CSV"),
            Format::Json => write!(f, "JSON"),
            Format::PrettyJson => write!(f, "pretty JSON"),
        }
    }
}

/// One batsman's line of a batting scorecard.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BattingLine {
    pub batsman: String,
    pub runs: u32,
    pub balls: u32,
    #[serde(rename = "4s")]
    pub fours: u32,
    #[serde(rename = "6s")]
    pub sixes: u32,
    #[serde(rename = "SR")]
    pub strike_rate: f64,
}

/// One bowler's line of a bowling scorecard.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BowlingLine {
    pub bowler: String,
    pub overs: u32,
    pub runs: u32,
    pub maidens: u32,
    #[serde(rename = "wicket")]
    pub wickets: u32,
    #[serde(rename = "econrate")]
    pub economy_rate: f64,
}

/// Extras of an innings (or of any set of deliveries).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtrasSummary {
    pub total: u32,
    pub wides: u32,
    pub noballs: u32,
    pub legbyes: u32,
    pub byes: u32,
    pub penalty: u32,
    pub extras: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BattingScorecard {
    pub lines: Vec<BattingLine>,
    pub extras: ExtrasSummary,
}

/// A value attributed to a pair of players (or a player and a category).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PairTotal {
    pub player: String,
    pub versus: String,
    pub value: u32,
}

/// A value attributed to one player, summed over all pairs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlayerTotal {
    pub player: String,
    pub total: u32,
}

/// Number of matches per key: a winner, a win type, etc.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchCount {
    #[serde(with = "sentinel::text")]
    pub key: Option<String>,
    pub matches: u32,
}

/// Cumulative totals of both sides after the same delivery index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WormPoint {
    pub delivery: u32,
    pub first: u32,
    pub second: u32,
}

/// Outcome of the match a detail row belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchContext {
    pub date: String,
    pub venue: String,
    pub opposition: String,
    #[serde(with = "sentinel::text")]
    pub winner: Option<String>,
    #[serde(with = "sentinel::text")]
    pub result: Option<String>,
}

/// A batting scorecard line together with the match it is from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattingDetail {
    pub batsman: String,
    pub runs: u32,
    pub balls: u32,
    #[serde(rename = "4s")]
    pub fours: u32,
    #[serde(rename = "6s")]
    pub sixes: u32,
    #[serde(rename = "SR")]
    pub strike_rate: f64,
    pub date: String,
    pub venue: String,
    pub opposition: String,
    #[serde(with = "sentinel::text")]
    pub winner: Option<String>,
    #[serde(with = "sentinel::text")]
    pub result: Option<String>,
}

/// A bowling scorecard line together with the match it is from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BowlingDetail {
    pub bowler: String,
    pub overs: u32,
    pub runs: u32,
    pub maidens: u32,
    #[serde(rename = "wicket")]
    pub wickets: u32,
    #[serde(rename = "econrate")]
    pub economy_rate: f64,
    pub date: String,
    pub venue: String,
    pub opposition: String,
    #[serde(with = "sentinel::text")]
    pub winner: Option<String>,
    #[serde(with = "sentinel::text")]
    pub result: Option<String>,
}

impl BattingDetail {
    pub fn new(line: BattingLine, context: MatchContext) -> BattingDetail {
        BattingDetail {
            batsman: line.batsman,
            runs: line.runs,
            balls: line.balls,
            fours: line.fours,
            sixes: line.sixes,
            strike_rate: line.strike_rate,
            date: context.date,
            venue: context.venue,
            opposition: context.opposition,
            winner: context.winner,
            result: context.result,
        }
    }
}

impl BowlingDetail {
    pub fn new(line: BowlingLine, context: MatchContext) -> BowlingDetail {
        BowlingDetail {
            bowler: line.bowler,
            overs: line.overs,
            runs: line.runs,
            maidens: line.maidens,
            wickets: line.wickets,
            economy_rate: line.economy_rate,
            date: context.date,
            venue: context.venue,
            opposition: context.opposition,
            winner: context.winner,
            result: context.result,
        }
    }
}

#[derive(Serialize)]
pub struct OError {
    pub error: String,
}

/// Write report rows.
///
/// With `headers`, CSV output uses them instead of the field names.
pub fn write_rows<T, W>(rows: &[T], headers: Option<&[&str]>, format: Format, writer: W) -> Result<()>
where
    T: Serialize,
    W: io::Write,
{
    match format {
        Format::Csv => {
            let mut w = csv::WriterBuilder::new()
                .has_headers(headers.is_none())
                .from_writer(writer);
            if let Some(headers) = headers {
                w.write_record(headers)?;
            }
            for row in rows {
                w.serialize(row)?;
            }
            w.flush()?;
        }
        Format::Json => serde_json::to_writer(writer, rows)?,
        Format::PrettyJson => serde_json::to_writer_pretty(writer, rows)?,
    }
    Ok(())
}

/// Write `error` as a JSON object to `error_file`.
pub fn store_error(error_file: &Path, error: &str) -> Result<()> {
    let error = OError {
        error: error.to_owned(),
    };
    let file = fs::File::create(error_file)?;
    let writer = io::BufWriter::new(file);
    serde_json::to_writer(writer, &error)?;
    Ok(())
}

/// Report a fatal error of a tool: to `error_file` if given, else to the log.
pub fn report_error(error_file: Option<&Path>, error: &str) {
    match error_file {
        Some(filename) => match store_error(filename, error) {
            Ok(()) => {
                info!(target: "crease", "error reported: {error}");
            }
            Err(e) => {
                error!(target: "crease", "{error}");
                error!(target: "crease", "{e}");
            }
        },
        None => error!(target: "crease", "{error}"),
    }
}

pub fn pretty_extras(e: &ExtrasSummary) -> String {
    format!(
        "extras {} (w {}, nb {}, lb {}, b {}, p {}), total {}",
        e.extras, e.wides, e.noballs, e.legbyes, e.byes, e.penalty, e.total
    )
}
