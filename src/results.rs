//! Match outcomes: win/loss counts, worm charts and per-match player details.

use crate::errors::{self, Result};
use crate::output::{BattingDetail, BowlingDetail, MatchContext, MatchCount, WormPoint};
use crate::scorecard;
use crate::table::Delivery;
use itertools::Itertools;
use std::collections::HashMap;

/// The first row of each distinct match, in order of first appearance.
pub fn matches(rows: &[Delivery]) -> Vec<&Delivery> {
    rows.iter().unique_by(|d| d.match_key()).collect_vec()
}

fn count_by<'a, F>(matches: &[&'a Delivery], key: F) -> Option<Vec<MatchCount>>
where
    F: Fn(&'a Delivery) -> Option<&'a str>,
{
    if matches.is_empty() {
        return None;
    }
    let counts = scorecard::tally(matches, key, |_| 1)
        .into_iter()
        .map(|(key, matches)| MatchCount {
            key: key.map(str::to_owned),
            matches,
        })
        .collect_vec();
    Some(counts)
}

/// Matches won by each winner; a missing winner counts matches without a result.
pub fn win_loss(rows: &[Delivery]) -> Option<Vec<MatchCount>> {
    count_by(&matches(rows), |d| d.winner.as_deref())
}

/// Wins of `team` by win type (runs or wickets).
pub fn wins_by_type(rows: &[Delivery], team: &str) -> Option<Vec<MatchCount>> {
    let won = matches(rows)
        .into_iter()
        .filter(|d| d.winner.as_deref() == Some(team))
        .collect_vec();
    count_by(&won, |d| d.win_type.as_deref())
}

/// Winners of the matches in which `team` won the toss and chose `decision`.
pub fn wins_by_toss(rows: &[Delivery], team: &str, decision: &str) -> Option<Vec<MatchCount>> {
    let tossed = matches(rows)
        .into_iter()
        .filter(|d| d.toss_winner == team && d.toss_decision == decision)
        .collect_vec();
    count_by(&tossed, |d| d.winner.as_deref())
}

fn cumulative<'a>(rows: impl Iterator<Item = &'a Delivery>) -> Vec<(u32, u32)> {
    rows.scan(0, |total, d| {
        *total += d.total;
        Some((d.delivery, *total))
    })
    .collect_vec()
}

/// Cumulative totals of `first` and `second` by delivery index, for one match.
///
/// Only indices reached in both innings are included.
pub fn worm(rows: &[Delivery], first: &str, second: &str) -> Result<Option<Vec<WormPoint>>> {
    let n = matches(rows).len();
    if n > 1 {
        return Err(errors::invalid_argument(format!(
            "a worm chart needs a single match, got {n}"
        )));
    }
    let a = cumulative(rows.iter().filter(|d| d.team == first));
    let b: HashMap<u32, u32> = cumulative(rows.iter().filter(|d| d.team == second))
        .into_iter()
        .collect();
    let points = a
        .into_iter()
        .filter_map(|(delivery, x)| {
            b.get(&delivery).map(|&y| WormPoint {
                delivery,
                first: x,
                second: y,
            })
        })
        .collect_vec();
    Ok(if points.is_empty() { None } else { Some(points) })
}

fn context(d: &Delivery, team: &str) -> MatchContext {
    let opposition = if d.team1 == team { &d.team2 } else { &d.team1 };
    MatchContext {
        date: d.date.clone(),
        venue: d.venue.clone(),
        opposition: opposition.clone(),
        winner: d.winner.clone(),
        result: d.result.clone(),
    }
}

/// Rows of the match `first` belongs to.
fn match_rows<'a>(rows: &'a [Delivery], first: &Delivery) -> Vec<&'a Delivery> {
    let key = first.match_key();
    rows.iter().filter(|d| d.match_key() == key).collect_vec()
}

/// One row per batsman of `team` per match, with the match outcome.
pub fn batting_details(rows: &[Delivery], team: &str) -> Option<Vec<BattingDetail>> {
    let mut details = vec![];
    for first in matches(rows).into_iter().filter(|d| d.played(team)) {
        let innings = match_rows(rows, first)
            .into_iter()
            .filter(|d| d.team == team)
            .collect_vec();
        for line in scorecard::batting_lines(&innings) {
            details.push(BattingDetail::new(line, context(first, team)));
        }
    }
    if details.is_empty() { None } else { Some(details) }
}

/// One row per bowler who bowled to `team` per match, with the match outcome.
pub fn bowling_details(rows: &[Delivery], team: &str) -> Option<Vec<BowlingDetail>> {
    let mut details = vec![];
    for first in matches(rows).into_iter().filter(|d| d.played(team)) {
        let bowled = match_rows(rows, first)
            .into_iter()
            .filter(|d| d.team == team)
            .collect_vec();
        for line in scorecard::bowling_lines(&bowled) {
            details.push(BowlingDetail::new(line, context(first, team)));
        }
    }
    if details.is_empty() { None } else { Some(details) }
}

/// Teams that appear in `rows`, sorted.
pub fn teams(rows: &[Delivery]) -> Vec<&str> {
    rows.iter()
        .flat_map(|d| [d.team1.as_str(), d.team2.as_str()])
        .unique()
        .sorted()
        .collect_vec()
}

/// Check that `team` appears in `rows`.
pub fn check_team(rows: &[Delivery], team: &str) -> Result<()> {
    let teams = teams(rows);
    if teams.contains(&team) {
        Ok(())
    } else {
        Err(errors::invalid_argument(format!(
            "team '{team}' not found, teams are: {}",
            teams.join(", ")
        )))
    }
}
