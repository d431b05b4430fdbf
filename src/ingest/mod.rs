//! CSV ingestion for MoneyPuck-style exports.
//!
//! Two shapes are understood: the league-wide "all teams" game log (one
//! row per team per game) and the goalie season summary (one row per
//! goalie per season per situation). Column names are mapped with serde
//! renames, team abbreviations are canonicalized at load time, and rows
//! that fail the per-record date parse are kept with an empty date and
//! counted — the engine decides what to do with them.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::analytics::{DataError, GameRecord, Location};

/// Structural input problems: the file itself, or a shape the reader
/// cannot make sense of. Fatal for the whole batch, unlike the
/// per-record conditions in [`DataError`].
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
}

/// Bookkeeping for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Rows dropped by the shape's row filters (non team-level rows,
    /// non-matching goalie/season/situation selections).
    pub filtered_out: usize,
    /// Rows kept with an empty date because the source value would not
    /// parse.
    pub unparsable_dates: usize,
}

/// Standardize an NHL team abbreviation. Known aliases map explicitly;
/// anything else is stripped of dots and upper-cased.
pub fn canonical_team(raw: &str) -> String {
    let trimmed = raw.trim();
    let mapped = match trimmed {
        "T.B" | "T.B." | "TB" | "TAM" => "TBL",
        "S.J" | "S.J." | "SJ" | "SAN" => "SJS",
        "N.J" | "N.J." | "NJ" | "NJ DEVILS" => "NJD",
        "L.A" | "L.A." | "LA" | "LOS" => "LAK",
        "M.T.L" | "M.T.L." | "MTL." | "MON" => "MTL",
        "N.Y.I" | "N.Y.I." => "NYI",
        "N.Y.R" | "N.Y.R." | "NY" => "NYR",
        "W.P.G" | "W.P.G." => "WPG",
        "V.G.K" | "V.G.K." => "VGK",
        other => return other.replace('.', "").to_uppercase(),
    };
    mapped.to_string()
}

/// MoneyPuck game dates ship as `20230106`; hand-edited files sometimes
/// carry ISO dates instead.
fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn parse_location(raw: &str) -> Option<Location> {
    match raw.to_ascii_uppercase().as_str() {
        "HOME" => Some(Location::Home),
        "AWAY" => Some(Location::Away),
        _ => None,
    }
}

// ── Team game log ────────────────────────────────────────────────────────────

/// One row of the MoneyPuck "all teams" game log, as shipped.
#[derive(Debug, Deserialize)]
struct TeamGameRow {
    #[serde(rename = "playerTeam")]
    team: String,
    season: String,
    #[serde(rename = "gameDate")]
    game_date: String,
    #[serde(rename = "playoffGame", default)]
    playoff_game: Option<u8>,
    #[serde(rename = "home_or_away", default)]
    home_or_away: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    situation: Option<String>,
    #[serde(rename = "goalsFor", default)]
    goals_for: Option<f64>,
    #[serde(rename = "goalsAgainst", default)]
    goals_against: Option<f64>,
    #[serde(rename = "xGoalsFor", default)]
    x_goals_for: Option<f64>,
    #[serde(rename = "xGoalsAgainst", default)]
    x_goals_against: Option<f64>,
}

impl TeamGameRow {
    /// The export interleaves skater lines and strength splits with the
    /// team-level rows; only team-level, all-situations rows describe a
    /// whole game. Files without those columns pass through untouched.
    fn is_team_level(&self) -> bool {
        self.position.as_deref().map_or(true, |p| p == "Team Level")
            && self.situation.as_deref().map_or(true, |s| s == "all")
    }
}

/// Load the team game log from a CSV file.
pub fn load_team_games(
    path: impl AsRef<Path>,
) -> Result<(Vec<GameRecord>, IngestReport), IngestError> {
    read_team_games(File::open(path.as_ref())?)
}

/// Same as [`load_team_games`], from any reader (tests feed in-memory
/// CSV).
pub fn read_team_games<R: Read>(
    reader: R,
) -> Result<(Vec<GameRecord>, IngestReport), IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    let mut report = IngestReport::default();

    for row in csv_reader.deserialize::<TeamGameRow>() {
        let row = row?;
        report.rows_read += 1;

        if !row.is_team_level() {
            report.filtered_out += 1;
            continue;
        }

        let team = canonical_team(&row.team);
        let game_date = parse_game_date(&row.game_date);
        if game_date.is_none() {
            report.unparsable_dates += 1;
            warn!(
                "{}",
                DataError::UnparsableDate {
                    entity_id: team.clone(),
                    raw: row.game_date.clone(),
                }
            );
        }

        let mut record = GameRecord::new(team);
        record.game_date = game_date;
        record.season = Some(row.season);
        record.location = row.home_or_away.as_deref().and_then(parse_location);
        record.playoff = row.playoff_game.map(|v| v != 0).unwrap_or(false);
        record.stats.goals_for = row.goals_for;
        record.stats.goals_against = row.goals_against;
        record.stats.xg_for = row.x_goals_for;
        record.stats.xg_against = row.x_goals_against;

        records.push(record);
        report.rows_kept += 1;
    }

    Ok((records, report))
}

// ── Goalie season summary ────────────────────────────────────────────────────

/// Selection applied while loading goalie rows; `None` keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalieFilter {
    pub name: Option<String>,
    pub season: Option<String>,
    pub situation: Option<String>,
}

/// One row of the combined goalie season summary.
#[derive(Debug, Deserialize)]
struct GoalieSeasonRow {
    name: String,
    #[serde(default)]
    season: Option<String>,
    #[serde(default)]
    situation: Option<String>,
    #[serde(default)]
    games_played: Option<u32>,
    #[serde(rename = "gameDate", default)]
    game_date: Option<String>,
    #[serde(rename = "ongoal", default)]
    shots_faced: Option<f64>,
    #[serde(rename = "goals", default)]
    goals_allowed: Option<f64>,
    #[serde(rename = "xGoals", default)]
    x_goals: Option<f64>,
    #[serde(rename = "lowDangerShots", default)]
    low_danger_shots: Option<f64>,
    #[serde(rename = "lowDangerGoals", default)]
    low_danger_goals: Option<f64>,
    #[serde(rename = "mediumDangerShots", default)]
    medium_danger_shots: Option<f64>,
    #[serde(rename = "mediumDangerGoals", default)]
    medium_danger_goals: Option<f64>,
    #[serde(rename = "highDangerShots", default)]
    high_danger_shots: Option<f64>,
    #[serde(rename = "highDangerGoals", default)]
    high_danger_goals: Option<f64>,
}

impl GoalieSeasonRow {
    fn matches(&self, filter: &GoalieFilter) -> bool {
        let name_ok = filter.name.as_deref().map_or(true, |n| n == self.name);
        let season_ok = filter
            .season
            .as_deref()
            .map_or(true, |s| Some(s) == self.season.as_deref());
        let situation_ok = filter
            .situation
            .as_deref()
            .map_or(true, |s| Some(s) == self.situation.as_deref());
        name_ok && season_ok && situation_ok
    }
}

/// Load goalie season rows from a CSV file, applying the selection.
pub fn load_goalie_seasons(
    path: impl AsRef<Path>,
    filter: &GoalieFilter,
) -> Result<(Vec<GameRecord>, IngestReport), IngestError> {
    read_goalie_seasons(File::open(path.as_ref())?, filter)
}

pub fn read_goalie_seasons<R: Read>(
    reader: R,
    filter: &GoalieFilter,
) -> Result<(Vec<GameRecord>, IngestReport), IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    let mut report = IngestReport::default();

    for row in csv_reader.deserialize::<GoalieSeasonRow>() {
        let row = row?;
        report.rows_read += 1;

        if !row.matches(filter) {
            report.filtered_out += 1;
            continue;
        }

        // Season summaries usually have no per-game date; absence is
        // fine, only a present-but-broken value counts as unparsable.
        let game_date = match row.game_date.as_deref() {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_game_date(raw);
                if parsed.is_none() {
                    report.unparsable_dates += 1;
                    warn!(
                        "{}",
                        DataError::UnparsableDate {
                            entity_id: row.name.clone(),
                            raw: raw.to_string(),
                        }
                    );
                }
                parsed
            }
        };

        let mut record = GameRecord::new(row.name);
        record.game_date = game_date;
        record.season = row.season;
        record.stats.games_played = row.games_played;
        record.stats.shots_faced = row.shots_faced;
        record.stats.goals_allowed = row.goals_allowed;
        record.stats.xg_faced = row.x_goals;
        record.stats.low_danger_shots = row.low_danger_shots;
        record.stats.low_danger_goals = row.low_danger_goals;
        record.stats.medium_danger_shots = row.medium_danger_shots;
        record.stats.medium_danger_goals = row.medium_danger_goals;
        record.stats.high_danger_shots = row.high_danger_shots;
        record.stats.high_danger_goals = row.high_danger_goals;

        records.push(record);
        report.rows_kept += 1;
    }

    Ok((records, report))
}
