use crate::table::Delivery;
use itertools::Itertools;
use log::{debug, info};

fn explain_innings(team: &str, rows: &[&Delivery]) -> String {
    let runs: u32 = rows.iter().map(|d| d.total).sum();
    let wickets = rows.iter().filter(|d| d.is_wicket()).count();
    format!("{team} {runs}/{wickets} in {} deliveries", rows.len())
}

/// Log a one-line summary of a normalized match.
pub fn statistics(file_name: &str, rows: &[Delivery]) {
    let innings = rows
        .iter()
        .chunk_by(|d| d.team.clone())
        .into_iter()
        .map(|(team, group)| explain_innings(&team, &group.collect_vec()))
        .collect_vec();
    debug!(target: "crease", "{file_name}: {}", innings.join("; "));
}

/// Log what a combined table contains.
pub fn table_statistics(rows: &[Delivery]) {
    let matches = rows.iter().map(|d| d.match_key()).unique().count();
    let teams = rows
        .iter()
        .flat_map(|d| [d.team1.as_str(), d.team2.as_str()])
        .unique()
        .sorted()
        .collect_vec();
    info!(target: "crease", "deliveries: {}", rows.len());
    info!(target: "crease", "matches: {matches}");
    info!(target: "crease", "teams: {}", teams.join(", "));
}
