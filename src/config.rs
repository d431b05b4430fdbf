use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};

use rest_impact::analytics::{EntityKind, Location, Metric};

/// NHL rest-day analytics over MoneyPuck game logs
#[derive(Parser, Debug, Clone)]
#[command(name = "rest-impact", version, about)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by the team-level analyses.
#[derive(Args, Debug, Clone)]
pub struct TeamArgs {
    /// Path to the MoneyPuck all-teams game log CSV
    #[arg(long, env = "TEAMS_CSV", default_value = "all_teams.csv")]
    pub teams_csv: String,

    /// Metric to analyze: win-pct, xg-share or goal-diff
    #[arg(long, default_value = "win-pct")]
    pub metric: String,

    /// Keep only home or away games
    #[arg(long)]
    pub location: Option<String>,

    /// Drop playoff games
    #[arg(long, default_value = "false")]
    pub regular_season_only: bool,

    /// Keep a single season label (e.g. 2023)
    #[arg(long)]
    pub season: Option<String>,

    /// Emit JSON instead of text tables
    #[arg(long, default_value = "false")]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// League-wide rest curve, optionally highlighting one team
    League {
        #[command(flatten)]
        args: TeamArgs,

        /// Highlight one team on top of the league curve (e.g. BOS)
        #[arg(long)]
        team: Option<String>,
    },

    /// Rank teams by how much their performance moves with rest
    Sensitivity {
        #[command(flatten)]
        args: TeamArgs,

        /// Number of teams to print
        #[arg(long, default_value = "15")]
        top: usize,
    },

    /// Goalie season-workload (fatigue) segments
    Fatigue {
        /// Path to the combined goalie season summary CSV
        #[arg(long, env = "GOALIES_CSV", default_value = "data/goalies_allseasons.csv")]
        goalies_csv: String,

        /// Goalie to profile, by full name
        #[arg(long)]
        goalie: String,

        /// Second goalie to show side by side
        #[arg(long)]
        compare: Option<String>,

        /// Keep a single season label
        #[arg(long)]
        season: Option<String>,

        /// Game situation rows to use (e.g. all, 5on5)
        #[arg(long, default_value = "all")]
        situation: String,

        /// Metric to segment: save-pct, gsax or hd-save-pct
        #[arg(long, default_value = "save-pct")]
        metric: String,

        /// Emit JSON instead of text tables
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::League { args, .. } => validate_team_args(args),
            Command::Sensitivity { args, top } => {
                validate_team_args(args)?;
                if *top == 0 {
                    anyhow::bail!("--top must be at least 1");
                }
                Ok(())
            }
            Command::Fatigue { metric, .. } => {
                parse_metric(metric, EntityKind::Goalie).map(|_| ())
            }
        }
    }
}

fn validate_team_args(args: &TeamArgs) -> Result<()> {
    parse_metric(&args.metric, EntityKind::Team)?;
    if let Some(location) = &args.location {
        parse_location_arg(location)?;
    }
    Ok(())
}

/// Resolve a CLI metric name, checking it fits the kind of log being
/// analyzed.
pub fn parse_metric(name: &str, kind: EntityKind) -> Result<Metric> {
    let expected = match kind {
        EntityKind::Team => "win-pct, xg-share, goal-diff",
        EntityKind::Goalie => "save-pct, gsax, hd-save-pct",
    };
    let metric = Metric::from_cli_name(name)
        .ok_or_else(|| anyhow!("unknown metric `{name}` (expected one of: {expected})"))?;
    if !metric.applies_to(kind) {
        anyhow::bail!("metric `{name}` does not fit this analysis (expected one of: {expected})");
    }
    Ok(metric)
}

pub fn parse_location_arg(name: &str) -> Result<Location> {
    match name.to_ascii_lowercase().as_str() {
        "home" => Ok(Location::Home),
        "away" => Ok(Location::Away),
        _ => Err(anyhow!("--location must be `home` or `away`, got `{name}`")),
    }
}
