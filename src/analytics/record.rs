use chrono::NaiveDate;
use serde::Serialize;

use super::bucket::RestBucket;
use super::metrics::DerivedMetrics;

/// Which flavour of game log a record belongs to. Team game logs carry
/// goals-for/against style stats; goalie lines carry shots faced and
/// goals allowed. The distinction decides which raw fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Team,
    Goalie,
}

/// Home/away indicator. Only used for filtering upstream of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Location {
    Home,
    Away,
}

/// Raw counting stats as shipped by the data source. Absent values stay
/// `None` — they are missing, not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RawStats {
    pub goals_for: Option<f64>,
    pub goals_against: Option<f64>,
    /// Expected goals for / against, team perspective
    pub xg_for: Option<f64>,
    pub xg_against: Option<f64>,
    /// Shots on goal faced by a goalie
    pub shots_faced: Option<f64>,
    pub goals_allowed: Option<f64>,
    /// Expected goals against the goalie, given the shots faced
    pub xg_faced: Option<f64>,
    /// Cumulative games-played counter within a season (workload ordering)
    pub games_played: Option<u32>,
    pub low_danger_shots: Option<f64>,
    pub low_danger_goals: Option<f64>,
    pub medium_danger_shots: Option<f64>,
    pub medium_danger_goals: Option<f64>,
    pub high_danger_shots: Option<f64>,
    pub high_danger_goals: Option<f64>,
}

/// One row of the input table: a single game (or season slice) for one
/// team or goalie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    /// Stable grouping key: canonical team abbreviation or goalie name
    pub entity_id: String,
    /// `None` when the source date was absent or did not parse; such
    /// records sit out rest-interval ordering and are counted as skipped
    pub game_date: Option<NaiveDate>,
    pub season: Option<String>,
    pub location: Option<Location>,
    pub playoff: bool,
    pub stats: RawStats,
}

impl GameRecord {
    pub fn new(entity_id: impl Into<String>) -> Self {
        GameRecord {
            entity_id: entity_id.into(),
            game_date: None,
            season: None,
            location: None,
            playoff: false,
            stats: RawStats::default(),
        }
    }
}

/// A [`GameRecord`] joined with everything the engine derives from it.
/// This is the row type of every derived table; inputs are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredGame {
    pub entity_id: String,
    pub game_date: Option<NaiveDate>,
    pub season: Option<String>,
    pub games_played: Option<u32>,
    /// Whole days since this entity's previous game. `None` for the first
    /// chronological game of the group — never coerced to 0.
    pub days_rest: Option<i64>,
    pub rest_bucket: Option<RestBucket>,
    pub metrics: DerivedMetrics,
}
