//! Per-player statistics over normalized deliveries, and scorecards.
//!
//! Every primitive takes deliveries that are already restricted to one scope
//! (one team's innings, in one match or over many) and returns
//! one entry per player in order of first appearance.

use crate::output::{BattingLine, BattingScorecard, BowlingLine, ExtrasSummary};
use crate::table::{self, Delivery, MatchKey};
use itertools::Itertools;
use std::collections::HashMap;
use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::hash::Hash;

/// Balls per over.
const BALLS: u32 = 6;

/// A per-player value.
pub type Tally<'a> = Vec<(&'a str, u32)>;

/// Sum `value` over `rows` grouped by `key`, keys in order of first appearance.
pub fn tally<'a, K, FK, FV>(rows: &[&'a Delivery], key: FK, value: FV) -> Vec<(K, u32)>
where
    K: Eq + Hash + Clone,
    FK: Fn(&'a Delivery) -> K,
    FV: Fn(&Delivery) -> u32,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut out: Vec<(K, u32)> = vec![];
    for &d in rows {
        match index.entry(key(d)) {
            Occupied(e) => out[*e.get()].1 += value(d),
            Vacant(e) => {
                out.push((e.key().clone(), value(d)));
                e.insert(out.len() - 1);
            }
        }
    }
    out
}

fn lookup(tally: &Tally, player: &str) -> u32 {
    tally
        .iter()
        .find(|(p, _)| *p == player)
        .map_or(0, |(_, v)| *v)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatsmanRuns<'a> {
    pub batsman: &'a str,
    pub balls: u32,
    pub runs: u32,
}

/// Balls faced and runs scored off the bat per batsman.
pub fn batting_runs<'a>(rows: &[&'a Delivery]) -> Vec<BatsmanRuns<'a>> {
    let balls = tally(rows, |d| d.striker.as_str(), |_| 1);
    let runs = tally(rows, |d| d.striker.as_str(), |d| d.runs_off_bat);
    balls
        .into_iter()
        .zip(runs)
        .map(|((batsman, balls), (_, runs))| BatsmanRuns {
            batsman,
            balls,
            runs,
        })
        .collect_vec()
}

/// Fours per batsman: 4 or 5 runs off the bat that reached the boundary.
pub fn fours<'a>(rows: &[&'a Delivery]) -> Tally<'a> {
    let hits = rows
        .iter()
        .copied()
        .filter(|d| (4..6).contains(&d.runs_off_bat) && !d.non_boundary)
        .collect_vec();
    tally(&hits, |d| d.striker.as_str(), |_| 1)
}

/// Sixes per batsman.
pub fn sixes<'a>(rows: &[&'a Delivery]) -> Tally<'a> {
    // Unlike fours, non_boundary is not checked here. Existing tables and
    // reports count sixes this way, so keep it.
    let hits = rows
        .iter()
        .copied()
        .filter(|d| d.runs_off_bat == 6)
        .collect_vec();
    tally(&hits, |d| d.striker.as_str(), |_| 1)
}

/// Runs per 100 balls; NaN without balls.
pub fn strike_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        f64::NAN
    } else {
        f64::from(runs) / f64::from(balls) * 100.0
    }
}

/// Completed overs per bowler, counting every delivery including wides and no balls.
pub fn overs<'a>(rows: &[&'a Delivery]) -> Tally<'a> {
    tally(rows, |d| d.bowler.as_str(), |_| 1)
        .into_iter()
        .map(|(bowler, balls)| (bowler, balls / BALLS))
        .collect_vec()
}

/// Runs charged to each bowler.
pub fn runs_conceded<'a>(rows: &[&'a Delivery]) -> Tally<'a> {
    tally(rows, |d| d.bowler.as_str(), Delivery::conceded)
}

/// Maiden overs per bowler.
///
/// Each bowler's balls in an innings are cut into overs of six in the order
/// they were bowled, the same count [overs] uses. A maiden is a complete
/// over that conceded nothing, so there are never more maidens than overs.
pub fn maidens<'a>(rows: &[&'a Delivery]) -> Tally<'a> {
    let mut bowled: HashMap<(MatchKey<'a>, &'a str, &'a str), u32> = HashMap::new();
    let mut index: HashMap<(MatchKey<'a>, &'a str, &'a str, u32), usize> = HashMap::new();
    // (bowler, balls, conceded) per over
    let mut per_over: Vec<(&'a str, u32, u32)> = vec![];
    for &d in rows {
        let spell = (d.match_key(), d.team.as_str(), d.bowler.as_str());
        let n = bowled.entry(spell).or_default();
        let over = *n / BALLS;
        *n += 1;
        match index.entry((spell.0, spell.1, spell.2, over)) {
            Occupied(e) => {
                let o = &mut per_over[*e.get()];
                o.1 += 1;
                o.2 += d.conceded();
            }
            Vacant(e) => {
                e.insert(per_over.len());
                per_over.push((spell.2, 1, d.conceded()));
            }
        }
    }
    let mut out: Tally = vec![];
    for (bowler, balls, conceded) in per_over {
        let maiden = u32::from(balls == BALLS && conceded == 0);
        match out.iter_mut().find(|(b, _)| *b == bowler) {
            Some((_, n)) => *n += maiden,
            None => out.push((bowler, maiden)),
        }
    }
    out
}

/// Dismissals per bowler: every delivery with a player out.
pub fn wickets<'a>(rows: &[&'a Delivery]) -> Tally<'a> {
    let outs = rows.iter().copied().filter(|d| d.is_wicket()).collect_vec();
    tally(&outs, |d| d.bowler.as_str(), |_| 1)
}

/// Runs per over; NaN without overs.
pub fn economy_rate(runs: u32, overs: u32) -> f64 {
    if overs == 0 {
        f64::NAN
    } else {
        f64::from(runs) / f64::from(overs)
    }
}

pub fn extras_summary(rows: &[&Delivery]) -> ExtrasSummary {
    let mut e = ExtrasSummary::default();
    for d in rows {
        e.total += d.total;
        e.wides += d.wides;
        e.noballs += d.noballs;
        e.legbyes += d.legbyes;
        e.byes += d.byes;
        e.penalty += d.penalty;
        e.extras += d.extras;
    }
    e
}

/// Batting lines: runs and balls joined with fours and sixes.
pub fn batting_lines(rows: &[&Delivery]) -> Vec<BattingLine> {
    let fours = fours(rows);
    let sixes = sixes(rows);
    batting_runs(rows)
        .into_iter()
        .map(|r| BattingLine {
            batsman: r.batsman.to_owned(),
            runs: r.runs,
            balls: r.balls,
            fours: lookup(&fours, r.batsman),
            sixes: lookup(&sixes, r.batsman),
            strike_rate: strike_rate(r.runs, r.balls),
        })
        .collect_vec()
}

/// Bowling lines: overs, runs conceded, maidens and wickets joined per bowler.
pub fn bowling_lines(rows: &[&Delivery]) -> Vec<BowlingLine> {
    let runs = runs_conceded(rows);
    let maidens = maidens(rows);
    let wickets = wickets(rows);
    overs(rows)
        .into_iter()
        .map(|(bowler, overs)| {
            let runs = lookup(&runs, bowler);
            BowlingLine {
                bowler: bowler.to_owned(),
                overs,
                runs,
                maidens: lookup(&maidens, bowler),
                wickets: lookup(&wickets, bowler),
                economy_rate: economy_rate(runs, overs),
            }
        })
        .collect_vec()
}

/// Batting scorecard of `team`, with the extras of its innings.
///
/// The extras are those of the team's own innings only, not of the whole
/// match; call [extras_summary] on all rows for the match figure.
///
/// `None` if the team did not bat in `rows`.
pub fn batting_scorecard(rows: &[Delivery], team: &str) -> Option<BattingScorecard> {
    let rows = table::batting(rows, team);
    if rows.is_empty() {
        return None;
    }
    Some(BattingScorecard {
        lines: batting_lines(&rows),
        extras: extras_summary(&rows),
    })
}

/// Bowling scorecard of the bowlers who bowled to `team`.
///
/// `None` if the team did not bat in `rows`.
pub fn bowling_scorecard(rows: &[Delivery], team: &str) -> Option<Vec<BowlingLine>> {
    let rows = table::batting(rows, team);
    if rows.is_empty() {
        return None;
    }
    Some(bowling_lines(&rows))
}

/// Batting over many matches, most runs first.
pub fn batting_totals(rows: &[Delivery], team: &str) -> Option<Vec<BattingLine>> {
    let mut lines = batting_scorecard(rows, team)?.lines;
    lines.sort_by(|a, b| b.runs.cmp(&a.runs));
    Some(lines)
}

/// Bowling to `team` over many matches, most wickets first.
pub fn bowling_totals(rows: &[Delivery], team: &str) -> Option<Vec<BowlingLine>> {
    let mut lines = bowling_scorecard(rows, team)?;
    lines.sort_by(|a, b| b.wickets.cmp(&a.wickets));
    Some(lines)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::table::test::{ball, info};

    fn refs(rows: &[Delivery]) -> Vec<&Delivery> {
        rows.iter().collect_vec()
    }

    #[test]
    fn tally_keeps_first_appearance() {
        let info = info("A", "B", "2020-01-01");
        let rows = [
            ball(&info, "A", 0, "z", "b", 1),
            ball(&info, "A", 1, "a", "b", 2),
            ball(&info, "A", 2, "z", "b", 3),
        ];
        let t = tally(&refs(&rows), |d| d.striker.as_str(), |d| d.runs_off_bat);
        assert_eq!(t, [("z", 4), ("a", 2)]);
    }

    #[test]
    fn boundaries() {
        let info = info("A", "B", "2020-01-01");
        let mut run_four = ball(&info, "A", 1, "x", "b", 4);
        run_four.non_boundary = true;
        let mut run_six = ball(&info, "A", 3, "x", "b", 6);
        run_six.non_boundary = true;
        let rows = [
            ball(&info, "A", 0, "x", "b", 4),
            run_four,
            ball(&info, "A", 2, "x", "b", 5),
            run_six,
            ball(&info, "A", 4, "y", "b", 6),
        ];
        assert_eq!(fours(&refs(&rows)), [("x", 2)]);
        assert_eq!(sixes(&refs(&rows)), [("x", 1), ("y", 1)]);
    }

    #[test]
    fn rates() {
        assert!(strike_rate(10, 0).is_nan());
        assert_eq!(strike_rate(15, 10), 150.0);
        assert!(economy_rate(7, 0).is_nan());
        assert_eq!(economy_rate(24, 4), 6.0);
    }

    #[test]
    fn bowler_with_no_full_over() {
        let info = info("A", "B", "2020-01-01");
        let rows = [
            ball(&info, "A", 0, "x", "b", 1),
            ball(&info, "A", 1, "x", "b", 2),
        ];
        let lines = bowling_lines(&refs(&rows));
        assert_eq!(lines[0].overs, 0);
        assert_eq!(lines[0].runs, 3);
        assert!(lines[0].economy_rate.is_nan());
    }

    #[test]
    fn conceded_excludes_byes() {
        let info = info("A", "B", "2020-01-01");
        let mut wide = ball(&info, "A", 0, "x", "b", 0);
        wide.wides = 1;
        wide.extras = 1;
        wide.total = 1;
        let mut bye = ball(&info, "A", 1, "x", "b", 0);
        bye.byes = 4;
        bye.extras = 4;
        bye.total = 4;
        let mut noball = ball(&info, "A", 2, "x", "b", 2);
        noball.noballs = 1;
        noball.extras = 1;
        noball.total = 3;
        let rows = [wide, bye, noball];
        assert_eq!(runs_conceded(&refs(&rows)), [("b", 4)]);
        let e = extras_summary(&refs(&rows));
        assert_eq!((e.wides, e.byes, e.noballs, e.extras, e.total), (1, 4, 1, 6, 8));
    }

    #[test]
    fn maidens_and_wickets() {
        let info = info("A", "B", "2020-01-01");
        // b1 bowls deliveries 0-5 (a maiden with a wicket), b2 bowls 6-11 (one run).
        let mut rows = (0..12)
            .map(|i| {
                let bowler = if i < 6 { "b1" } else { "b2" };
                ball(&info, "A", i, "x", bowler, u32::from(i == 9))
            })
            .collect_vec();
        rows[3].kind = Some("bowled".to_owned());
        rows[3].player_out = Some("x".to_owned());
        let r = refs(&rows);
        assert_eq!(overs(&r), [("b1", 1), ("b2", 1)]);
        assert_eq!(maidens(&r), [("b1", 1), ("b2", 0)]);
        assert_eq!(wickets(&r), [("b1", 1)]);

        let lines = bowling_lines(&r);
        assert_eq!(lines[0].maidens, 1);
        assert_eq!(lines[0].wickets, 1);
        assert_eq!(lines[1].wickets, 0);
        assert_eq!(lines[1].economy_rate, 1.0);
    }

    #[test]
    fn maidens_do_not_mix_matches() {
        let first = info("A", "B", "2020-01-01");
        let second = info("A", "B", "2020-02-01");
        let mut rows = (0..6).map(|i| ball(&first, "B", i, "x", "a1", 0)).collect_vec();
        rows.extend((0..6).map(|i| ball(&second, "B", i, "x", "a1", 1)));
        assert_eq!(maidens(&refs(&rows)), [("a1", 1)]);
    }

    #[test]
    fn maidens_follow_the_bowlers_own_balls() {
        let info = info("A", "B", "2020-01-01");
        // b1: a wide and six dots (0-6), b2: six dots (7-12), b1: six dots (13-18).
        let mut rows = (0..19)
            .map(|i| {
                let bowler = if (7..13).contains(&i) { "b2" } else { "b1" };
                ball(&info, "A", i, "x", bowler, 0)
            })
            .collect_vec();
        rows[0].wides = 1;
        rows[0].extras = 1;
        rows[0].total = 1;
        let r = refs(&rows);
        assert_eq!(overs(&r), [("b1", 2), ("b2", 1)]);
        // b1's first over is the wide and five dots, its second is all dots.
        assert_eq!(maidens(&r), [("b1", 1), ("b2", 1)]);
        for line in bowling_lines(&r) {
            assert!(line.maidens <= line.overs, "{}", line.bowler);
        }
    }

    #[test]
    fn partial_over_is_not_a_maiden() {
        let info = info("A", "B", "2020-01-01");
        let rows = (0..3).map(|i| ball(&info, "A", i, "x", "b", 0)).collect_vec();
        assert_eq!(maidens(&refs(&rows)), [("b", 0)]);
    }

    #[test]
    fn empty_scope() {
        let info = info("A", "B", "2020-01-01");
        let rows = [ball(&info, "A", 0, "x", "b", 1)];
        assert!(batting_scorecard(&rows, "B").is_none());
        assert!(bowling_scorecard(&rows, "B").is_none());
        assert_eq!(bowling_scorecard(&rows, "A").unwrap()[0].bowler, "b");
        assert!(batting_scorecard(&rows, "C").is_none());
        assert!(bowling_totals(&rows, "C").is_none());
    }
}
