use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use crease::breakdown::{self, PairFilter};
use crease::information;
use crease::output::{self, Format, PairTotal};
use crease::results;
use crease::scorecard;
use crease::table::{self, Delivery};
use log::{info, warn};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io, process};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Report {
    /// Batting scorecard of the team
    Batting,
    /// Bowling scorecard of the bowlers who bowled to the team
    Bowling,
    /// Batting over all matches, most runs first
    BattingTotals,
    /// Bowling to the team over all matches, most wickets first
    BowlingTotals,
    /// Runs of each batsman with each partner
    Partnerships,
    /// Runs of each batsman off each bowler
    BatsmenVsBowlers,
    /// Runs conceded by each bowler to each batsman of the team
    BowlersVsBatsmen,
    /// Wickets taken against the team, per bowler and kind of dismissal
    WicketKinds,
    /// Wickets taken against the team, per bowler and dismissed batsman
    WicketVictims,
    /// Batting line of each batsman in each match
    BattingDetails,
    /// Bowling line of each bowler who bowled to the team in each match
    BowlingDetails,
    /// Matches won by each team
    WinLoss,
    /// Wins of the team by runs and by wickets
    WinTypes,
    /// Winners when the team won the toss and chose --decision
    Toss,
    /// Cumulative runs of the team and --opposition in one match
    Worm,
    /// Extras in the team's innings, not the whole match
    Extras,
}

/// Reports over a normalized table of one or more matches
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input file (CSV)
    infile: PathBuf,
    /// Report to produce
    #[arg(value_enum)]
    report: Report,
    /// Team the report is about
    #[arg(short, long)]
    team: Option<String>,
    /// Other team (worm chart)
    #[arg(long)]
    opposition: Option<String>,
    /// Toss decision: bat or field
    #[arg(long)]
    decision: Option<String>,
    /// Keep only the players with the largest totals (pair reports)
    #[arg(long)]
    top: Option<usize>,
    /// Drop pairs below this value (pair reports)
    #[arg(long, default_value_t = 0)]
    min: u32,
    /// Totals per player instead of pairs (pair reports)
    #[arg(long)]
    summary: bool,
    /// Output file [default: stdout]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Produce JSON instead of CSV
    #[arg(long)]
    json: bool,
    /// Produce pretty-printed JSON
    #[arg(long)]
    pretty: bool,
    /// Report errors as a JSON file
    #[arg(long)]
    error_file: Option<PathBuf>,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

impl Args {
    fn format(&self) -> Format {
        if self.pretty {
            Format::PrettyJson
        } else if self.json {
            Format::Json
        } else {
            Format::Csv
        }
    }

    fn team(&self) -> Result<&str> {
        self.team
            .as_deref()
            .with_context(|| format!("report {:?} needs --team", self.report))
    }
}

struct Sink {
    writer: Box<dyn Write>,
    format: Format,
}

impl Sink {
    fn open(output: Option<&Path>, format: Format) -> Result<Sink> {
        let writer: Box<dyn Write> = match output {
            Some(path) => {
                let file = fs::File::create(path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                Box::new(io::BufWriter::new(file))
            }
            None => Box::new(io::stdout().lock()),
        };
        info!(target: "crease", "output format: {format}");
        Ok(Sink { writer, format })
    }

    /// Write the rows, or an explicit marker for nothing in scope.
    fn emit<T: Serialize>(&mut self, rows: Option<Vec<T>>, headers: Option<&[&str]>) -> Result<()> {
        match rows {
            None => {
                warn!(target: "crease", "no data in scope");
                if self.format != Format::Csv {
                    writeln!(self.writer, "null")?;
                }
            }
            Some(rows) => {
                output::write_rows(&rows, headers, self.format, &mut self.writer)
                    .map_err(|e| anyhow!(e))?;
                if self.format != Format::Csv {
                    writeln!(self.writer)?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn pair_report(
    args: &Args,
    sink: &mut Sink,
    pairs: Option<Vec<PairTotal>>,
    headers: [&str; 3],
) -> Result<()> {
    let filter = PairFilter::new(args.top.unwrap_or(usize::MAX), args.min)
        .map_err(|e| anyhow!(e))?;
    let Some(pairs) = pairs else {
        return sink.emit::<PairTotal>(None, None);
    };
    if args.summary {
        let totals = breakdown::top_totals(&pairs, filter.top);
        return sink.emit(Some(totals), Some(&[headers[0], "total"]));
    }
    let pairs = if args.top.is_some() || args.min > 0 {
        breakdown::top_pairs(&pairs, filter)
    } else {
        pairs
    };
    sink.emit(Some(pairs), Some(&headers))
}

fn report(args: &Args, rows: &[Delivery], sink: &mut Sink) -> Result<()> {
    match args.report {
        Report::Batting => {
            let card = scorecard::batting_scorecard(rows, args.team()?);
            if let Some(card) = &card {
                info!(target: "crease", "{}", output::pretty_extras(&card.extras));
            }
            sink.emit(card.map(|c| c.lines), None)
        }
        Report::Bowling => sink.emit(scorecard::bowling_scorecard(rows, args.team()?), None),
        Report::BattingTotals => sink.emit(scorecard::batting_totals(rows, args.team()?), None),
        Report::BowlingTotals => sink.emit(scorecard::bowling_totals(rows, args.team()?), None),
        Report::Partnerships => pair_report(
            args,
            sink,
            breakdown::partnerships(rows, args.team()?),
            ["batsman", "non_striker", "partnershipRuns"],
        ),
        Report::BatsmenVsBowlers => pair_report(
            args,
            sink,
            breakdown::batsmen_vs_bowlers(rows, args.team()?),
            ["batsman", "bowler", "runs"],
        ),
        Report::BowlersVsBatsmen => pair_report(
            args,
            sink,
            breakdown::bowlers_vs_batsmen(rows, args.team()?),
            ["bowler", "batsman", "runsConceded"],
        ),
        Report::WicketKinds => pair_report(
            args,
            sink,
            breakdown::wicket_kinds(rows, args.team()?),
            ["bowler", "kind", "wickets"],
        ),
        Report::WicketVictims => pair_report(
            args,
            sink,
            breakdown::wicket_victims(rows, args.team()?),
            ["bowler", "player_out", "wickets"],
        ),
        Report::BattingDetails => sink.emit(results::batting_details(rows, args.team()?), None),
        Report::BowlingDetails => sink.emit(results::bowling_details(rows, args.team()?), None),
        Report::WinLoss => sink.emit(results::win_loss(rows), Some(&["winner", "matches"])),
        Report::WinTypes => sink.emit(
            results::wins_by_type(rows, args.team()?),
            Some(&["winType", "matches"]),
        ),
        Report::Toss => {
            let decision = args.decision.as_deref().context("report toss needs --decision")?;
            sink.emit(
                results::wins_by_toss(rows, args.team()?, decision),
                Some(&["winner", "matches"]),
            )
        }
        Report::Worm => {
            let team = args.team()?;
            let opposition = args
                .opposition
                .as_deref()
                .context("report worm needs --opposition")?;
            results::check_team(rows, opposition).map_err(|e| anyhow!(e))?;
            let points = results::worm(rows, team, opposition).map_err(|e| anyhow!(e))?;
            sink.emit(points, Some(&["delivery", team, opposition]))
        }
        Report::Extras => {
            let innings = table::batting(rows, args.team()?);
            let extras = (!innings.is_empty()).then(|| vec![scorecard::extras_summary(&innings)]);
            sink.emit(extras, None)
        }
    }
}

fn process(args: &Args) -> Result<()> {
    info!(target: "crease", "read: {}", args.infile.display());
    let rows = table::read_file(&args.infile)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("cannot read {}", args.infile.display()))?;
    information::table_statistics(&rows);
    if let Some(team) = &args.team {
        results::check_team(&rows, team).map_err(|e| anyhow!(e))?;
    }
    let mut sink = Sink::open(args.output.as_deref(), args.format())?;
    report(args, &rows, &mut sink)
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    if let Err(e) = process(&args) {
        output::report_error(args.error_file.as_deref(), &format!("{e:#}"));
        process::exit(1);
    }
}
