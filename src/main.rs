use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod config;

use config::{parse_location_arg, parse_metric, Command, Config, TeamArgs};
use rest_impact::analytics::{self, EntityKind, GameRecord, RestSplit};
use rest_impact::ingest::{self, GoalieFilter};
use rest_impact::report;

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    match config.command {
        Command::League { args, team } => run_league(&args, team.as_deref()),
        Command::Sensitivity { args, top } => run_sensitivity(&args, top),
        Command::Fatigue {
            goalies_csv,
            goalie,
            compare,
            season,
            situation,
            metric,
            json,
        } => run_fatigue(
            &goalies_csv,
            &goalie,
            compare.as_deref(),
            season,
            &situation,
            &metric,
            json,
        ),
    }
}

/// Load the team game log and apply the shared CLI filters.
fn load_filtered_team_games(args: &TeamArgs) -> Result<Vec<GameRecord>> {
    let (records, ingest_report) = ingest::load_team_games(&args.teams_csv)
        .with_context(|| format!("loading team game log from {}", args.teams_csv))?;
    info!(
        "Loaded {} team-level rows from {} ({} filtered out, {} unparsable dates)",
        ingest_report.rows_kept,
        args.teams_csv,
        ingest_report.filtered_out,
        ingest_report.unparsable_dates
    );

    let location = args
        .location
        .as_deref()
        .map(parse_location_arg)
        .transpose()?;

    Ok(records
        .into_iter()
        .filter(|r| location.map_or(true, |want| r.location == Some(want)))
        .filter(|r| !(args.regular_season_only && r.playoff))
        .filter(|r| {
            args.season
                .as_deref()
                .map_or(true, |s| r.season.as_deref() == Some(s))
        })
        .collect())
}

fn run_league(args: &TeamArgs, team: Option<&str>) -> Result<()> {
    let metric = parse_metric(&args.metric, EntityKind::Team)?;
    let records = load_filtered_team_games(args)?;

    let table = analytics::build_rest_table(&records, EntityKind::Team);
    if table.rows.is_empty() {
        println!("{}", report::INSUFFICIENT_DATA);
        return Ok(());
    }

    let league = analytics::summarize(&table.rows, metric);

    let team = team.map(ingest::canonical_team);
    let team_summary = team.map(|abbrev| {
        let rows: Vec<_> = table
            .rows
            .iter()
            .filter(|r| r.entity_id == abbrev)
            .cloned()
            .collect();
        (abbrev, analytics::summarize(&rows, metric))
    });

    if args.json {
        let payload = serde_json::json!({
            "league": league,
            "team": team_summary.as_ref().map(|(id, buckets)| {
                serde_json::json!({ "entity_id": id, "buckets": buckets })
            }),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "{}",
        report::render_bucket_table(
            &format!("League rest curve — {}", metric.label()),
            &league,
            metric
        )
    );

    let split = RestSplit::default();
    if let Some(line) = report::render_takeaway(&league, metric, &split.low, &split.high) {
        println!("{line}\n");
    }

    if let Some((abbrev, summary)) = &team_summary {
        if summary.iter().all(|s| s.sample_count == 0) {
            println!("{abbrev}: {}", report::INSUFFICIENT_DATA);
        } else {
            println!(
                "{}",
                report::render_bucket_table(
                    &format!("{abbrev} rest curve — {}", metric.label()),
                    summary,
                    metric
                )
            );
        }
    }

    if let Some(footer) = report::render_skip_footer(&table) {
        println!("{footer}");
    }
    Ok(())
}

fn run_sensitivity(args: &TeamArgs, top: usize) -> Result<()> {
    let metric = parse_metric(&args.metric, EntityKind::Team)?;
    let records = load_filtered_team_games(args)?;

    let table = analytics::build_rest_table(&records, EntityKind::Team);
    let ranking = analytics::rank(&table.rows, metric, &RestSplit::default());
    if ranking.is_empty() {
        // Not enough variety in rest days per team to contrast anything.
        println!("{}", report::INSUFFICIENT_DATA);
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    println!(
        "Rest sensitivity by team — {} (positive = better when rested)",
        metric.label()
    );
    print!("{}", report::render_ranking(&ranking, metric, top));
    if let Some(footer) = report::render_skip_footer(&table) {
        println!("{footer}");
    }
    Ok(())
}

fn run_fatigue(
    goalies_csv: &str,
    goalie: &str,
    compare: Option<&str>,
    season: Option<String>,
    situation: &str,
    metric_name: &str,
    json: bool,
) -> Result<()> {
    let metric = parse_metric(metric_name, EntityKind::Goalie)?;

    let mut names = vec![goalie.to_string()];
    if let Some(other) = compare {
        names.push(other.to_string());
    }

    let mut sections: Vec<(String, Vec<analytics::SegmentSummary>)> = Vec::new();
    for name in &names {
        let filter = GoalieFilter {
            name: Some(name.clone()),
            season: season.clone(),
            situation: Some(situation.to_string()),
        };
        let (records, ingest_report) = ingest::load_goalie_seasons(goalies_csv, &filter)
            .with_context(|| format!("loading goalie seasons from {goalies_csv}"))?;
        info!("Loaded {} rows for {name}", ingest_report.rows_kept);
        sections.push((name.clone(), analytics::goalie_workload_summary(&records, metric)));
    }

    if json {
        let payload: Vec<_> = sections
            .iter()
            .map(|(name, segments)| {
                serde_json::json!({ "entity_id": name, "segments": segments })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for (name, summary) in &sections {
        if summary.is_empty() {
            println!("{name}: {}", report::INSUFFICIENT_DATA);
        } else {
            println!("{}", report::render_segments(name, summary, metric));
        }
    }
    Ok(())
}
