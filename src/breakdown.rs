//! Breakdowns of runs and wickets by pairs of players.
//!
//! All breakdowns look at `team`'s innings: the batting ones at its batsmen,
//! the bowling ones at the bowlers who bowled to it. All of them return `None` when there is nothing
//! in scope, so that batch callers can skip such results.

use crate::errors::{self, Result};
use crate::output::{PairTotal, PlayerTotal};
use crate::scorecard;
use crate::sentinel;
use crate::table::{self, Delivery};
use itertools::Itertools;

/// Display filter for pair breakdowns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairFilter {
    /// Keep the players with the largest totals.
    pub top: usize,
    /// Drop pairs whose value is below this.
    pub min_value: u32,
}

impl PairFilter {
    pub fn new(top: usize, min_value: u32) -> Result<PairFilter> {
        if top == 0 {
            return Err(errors::invalid_argument_ref("top must be at least 1"));
        }
        Ok(PairFilter { top, min_value })
    }
}

fn pairs<'a, F1, F2, FV>(rows: &[&'a Delivery], first: F1, second: F2, value: FV) -> Vec<PairTotal>
where
    F1: Fn(&'a Delivery) -> &'a str,
    F2: Fn(&'a Delivery) -> &'a str,
    FV: Fn(&Delivery) -> u32,
{
    scorecard::tally(rows, |d| (first(d), second(d)), value)
        .into_iter()
        .map(|((player, versus), value)| PairTotal {
            player: player.to_owned(),
            versus: versus.to_owned(),
            value,
        })
        .collect_vec()
}

fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() { None } else { Some(v) }
}

/// Runs scored by each batsman of `team` with each partner at the other end.
pub fn partnerships(rows: &[Delivery], team: &str) -> Option<Vec<PairTotal>> {
    let rows = table::batting(rows, team);
    non_empty(pairs(
        &rows,
        |d| d.striker.as_str(),
        |d| d.non_striker.as_str(),
        |d| d.runs_off_bat,
    ))
}

/// Runs scored by each batsman of `team` off each bowler.
pub fn batsmen_vs_bowlers(rows: &[Delivery], team: &str) -> Option<Vec<PairTotal>> {
    let rows = table::batting(rows, team);
    non_empty(pairs(&rows, |d| d.striker.as_str(), |d| d.bowler.as_str(), |d| d.runs_off_bat))
}

/// Runs off the bat conceded to each batsman of `team`, per bowler.
pub fn bowlers_vs_batsmen(rows: &[Delivery], team: &str) -> Option<Vec<PairTotal>> {
    let rows = table::batting(rows, team);
    non_empty(pairs(&rows, |d| d.bowler.as_str(), |d| d.striker.as_str(), |d| d.runs_off_bat))
}

/// Dismissals of `team`'s batsmen by each bowler, per kind of dismissal.
pub fn wicket_kinds(rows: &[Delivery], team: &str) -> Option<Vec<PairTotal>> {
    let rows = table::batting(rows, team)
        .into_iter()
        .filter(|d| d.is_wicket())
        .collect_vec();
    non_empty(pairs(
        &rows,
        |d| d.bowler.as_str(),
        |d| sentinel::encode(&d.kind),
        |_| 1,
    ))
}

/// Dismissals of `team`'s batsmen by each bowler, per dismissed batsman.
pub fn wicket_victims(rows: &[Delivery], team: &str) -> Option<Vec<PairTotal>> {
    let rows = table::batting(rows, team)
        .into_iter()
        .filter(|d| d.is_wicket())
        .collect_vec();
    non_empty(pairs(
        &rows,
        |d| d.bowler.as_str(),
        |d| sentinel::encode(&d.player_out),
        |_| 1,
    ))
}

/// Totals per player over all pairs, largest first, at most `top` players.
pub fn top_totals(pairs: &[PairTotal], top: usize) -> Vec<PlayerTotal> {
    let mut totals: Vec<PlayerTotal> = vec![];
    for p in pairs {
        match totals.iter_mut().find(|t| t.player == p.player) {
            Some(t) => t.total += p.value,
            None => totals.push(PlayerTotal {
                player: p.player.clone(),
                total: p.value,
            }),
        }
    }
    // Stable: equal totals stay in order of first appearance.
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals.truncate(top);
    totals
}

/// Pairs of the `top` players, largest totals first, without pairs below `min_value`.
pub fn top_pairs(pairs: &[PairTotal], filter: PairFilter) -> Vec<PairTotal> {
    top_totals(pairs, filter.top)
        .iter()
        .flat_map(|t| {
            pairs
                .iter()
                .filter(|p| p.player == t.player && p.value >= filter.min_value)
                .cloned()
        })
        .collect_vec()
}
