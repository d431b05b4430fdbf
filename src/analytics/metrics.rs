//! Per-record outcome metrics.
//!
//! Each derivation is a pure function of the raw counting stats: nothing
//! here mutates the input record, and the same record always produces the
//! same metrics. Every ratio passes through a zero-denominator guard — a
//! non-positive denominator yields `None`, never 0, NaN or infinity, so a
//! shutout on zero shots cannot masquerade as a perfect save percentage.

use serde::Serialize;
use tracing::debug;

use super::error::DataError;
use super::record::{EntityKind, GameRecord};

/// Derived scalar metrics, attached alongside a record. A `None` metric
/// means "not computable for this record" and is excluded from downstream
/// means rather than polluting them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Goals-for strictly greater than goals-against. Ties are losses.
    pub win: Option<bool>,
    pub goal_diff: Option<f64>,
    /// xGF / (xGF + xGA), as a 0–1 fraction
    pub xg_share: Option<f64>,
    /// 1 − goals allowed / shots faced
    pub save_pct: Option<f64>,
    /// Goals saved above expected: xGA − actual goals allowed
    pub gsax: Option<f64>,
    /// Save percentage on high-danger shots only
    pub high_danger_save_pct: Option<f64>,
}

/// Selects which derived scalar the aggregation stages track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    WinPct,
    GoalDiff,
    XgShare,
    SavePct,
    Gsax,
    HighDangerSavePct,
}

impl Metric {
    /// Pull this metric's value out of a derived row. Wins map to 1.0/0.0
    /// so that their mean is a win rate in [0, 1].
    pub fn extract(&self, metrics: &DerivedMetrics) -> Option<f64> {
        match self {
            Metric::WinPct => metrics.win.map(|w| if w { 1.0 } else { 0.0 }),
            Metric::GoalDiff => metrics.goal_diff,
            Metric::XgShare => metrics.xg_share,
            Metric::SavePct => metrics.save_pct,
            Metric::Gsax => metrics.gsax,
            Metric::HighDangerSavePct => metrics.high_danger_save_pct,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::WinPct => "Win %",
            Metric::GoalDiff => "Goal Diff",
            Metric::XgShare => "xG %",
            Metric::SavePct => "Save %",
            Metric::Gsax => "GSAx",
            Metric::HighDangerSavePct => "HD Save %",
        }
    }

    pub fn from_cli_name(name: &str) -> Option<Metric> {
        match name {
            "win-pct" => Some(Metric::WinPct),
            "goal-diff" => Some(Metric::GoalDiff),
            "xg-share" => Some(Metric::XgShare),
            "save-pct" => Some(Metric::SavePct),
            "gsax" => Some(Metric::Gsax),
            "hd-save-pct" => Some(Metric::HighDangerSavePct),
            _ => None,
        }
    }

    /// Whether this metric is derivable from the given kind of game log.
    pub fn applies_to(&self, kind: EntityKind) -> bool {
        matches!(
            (kind, self),
            (
                EntityKind::Team,
                Metric::WinPct | Metric::GoalDiff | Metric::XgShare
            ) | (
                EntityKind::Goalie,
                Metric::SavePct | Metric::Gsax | Metric::HighDangerSavePct
            )
        )
    }
}

/// Safe ratio: `None` when either side is missing or the denominator is
/// non-positive. Guard hits are logged at debug level, not raised.
fn guarded_ratio(numer: Option<f64>, denom: Option<f64>, what: &str) -> Option<f64> {
    let n = numer?;
    let d = denom?;
    if d <= 0.0 {
        debug!("{what}: non-positive denominator ({d}), leaving metric empty");
        return None;
    }
    Some(n / d)
}

fn require(value: Option<f64>, entity_id: &str, field: &'static str) -> Result<f64, DataError> {
    value.ok_or_else(|| DataError::MissingField {
        entity_id: entity_id.to_string(),
        field,
    })
}

/// Compute the derived metrics for one record. Fails only when a field
/// that the record kind cannot do without is absent; optional fields
/// degrade their specific metric to `None` instead.
pub fn derive_metrics(record: &GameRecord, kind: EntityKind) -> Result<DerivedMetrics, DataError> {
    match kind {
        EntityKind::Team => derive_team(record),
        EntityKind::Goalie => derive_goalie(record),
    }
}

fn derive_team(record: &GameRecord) -> Result<DerivedMetrics, DataError> {
    let gf = require(record.stats.goals_for, &record.entity_id, "goals_for")?;
    let ga = require(record.stats.goals_against, &record.entity_id, "goals_against")?;

    let total_xg = match (record.stats.xg_for, record.stats.xg_against) {
        (Some(xf), Some(xa)) => Some(xf + xa),
        _ => None,
    };

    Ok(DerivedMetrics {
        win: Some(gf > ga),
        goal_diff: Some(gf - ga),
        xg_share: guarded_ratio(record.stats.xg_for, total_xg, "xg_share"),
        ..DerivedMetrics::default()
    })
}

fn derive_goalie(record: &GameRecord) -> Result<DerivedMetrics, DataError> {
    let shots = require(record.stats.shots_faced, &record.entity_id, "shots_faced")?;
    let allowed = require(record.stats.goals_allowed, &record.entity_id, "goals_allowed")?;

    let save_pct = guarded_ratio(Some(allowed), Some(shots), "save_pct").map(|r| 1.0 - r);
    let high_danger_save_pct = guarded_ratio(
        record.stats.high_danger_goals,
        record.stats.high_danger_shots,
        "high_danger_save_pct",
    )
    .map(|r| 1.0 - r);

    Ok(DerivedMetrics {
        save_pct,
        gsax: record.stats.xg_faced.map(|xga| xga - allowed),
        high_danger_save_pct,
        ..DerivedMetrics::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::record::RawStats;
    use approx::assert_relative_eq;

    fn team_record(gf: f64, ga: f64) -> GameRecord {
        let mut record = GameRecord::new("BOS");
        record.stats.goals_for = Some(gf);
        record.stats.goals_against = Some(ga);
        record
    }

    fn goalie_record(shots: f64, allowed: f64) -> GameRecord {
        let mut record = GameRecord::new("Ilya Sorokin");
        record.stats.shots_faced = Some(shots);
        record.stats.goals_allowed = Some(allowed);
        record
    }

    #[test]
    fn test_team_win_and_goal_diff() {
        let m = derive_metrics(&team_record(4.0, 2.0), EntityKind::Team).unwrap();
        assert_eq!(m.win, Some(true));
        assert_relative_eq!(m.goal_diff.unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn tie_is_not_a_win() {
        let m = derive_metrics(&team_record(3.0, 3.0), EntityKind::Team).unwrap();
        assert_eq!(m.win, Some(false));
        assert_relative_eq!(m.goal_diff.unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_xg_share() {
        let mut record = team_record(1.0, 0.0);
        record.stats.xg_for = Some(3.0);
        record.stats.xg_against = Some(1.0);
        let m = derive_metrics(&record, EntityKind::Team).unwrap();
        assert_relative_eq!(m.xg_share.unwrap(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn xg_share_guard_on_zero_denominator() {
        let mut record = team_record(1.0, 0.0);
        record.stats.xg_for = Some(0.0);
        record.stats.xg_against = Some(0.0);
        let m = derive_metrics(&record, EntityKind::Team).unwrap();
        assert_eq!(m.xg_share, None);
    }

    #[test]
    fn xg_share_missing_when_one_side_absent() {
        let mut record = team_record(1.0, 0.0);
        record.stats.xg_for = Some(2.5);
        let m = derive_metrics(&record, EntityKind::Team).unwrap();
        assert_eq!(m.xg_share, None);
    }

    #[test]
    fn test_missing_required_field_names_the_field() {
        let mut record = GameRecord::new("BOS");
        record.stats.goals_against = Some(2.0);
        let err = derive_metrics(&record, EntityKind::Team).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingField {
                entity_id: "BOS".into(),
                field: "goals_for",
            }
        );
    }

    #[test]
    fn test_save_pct() {
        let m = derive_metrics(&goalie_record(30.0, 3.0), EntityKind::Goalie).unwrap();
        assert_relative_eq!(m.save_pct.unwrap(), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn zero_shot_shutout_has_no_save_pct() {
        // 0 shots, 0 goals must not read as a 1.000 save percentage.
        let m = derive_metrics(&goalie_record(0.0, 0.0), EntityKind::Goalie).unwrap();
        assert_eq!(m.save_pct, None);
    }

    #[test]
    fn test_gsax_expected_minus_actual() {
        let mut record = goalie_record(28.0, 2.0);
        record.stats.xg_faced = Some(3.4);
        let m = derive_metrics(&record, EntityKind::Goalie).unwrap();
        assert_relative_eq!(m.gsax.unwrap(), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn gsax_degrades_without_expected_goals() {
        let m = derive_metrics(&goalie_record(28.0, 2.0), EntityKind::Goalie).unwrap();
        assert_eq!(m.gsax, None);
        assert!(m.save_pct.is_some());
    }

    #[test]
    fn high_danger_save_pct_needs_tier_counts() {
        let mut record = goalie_record(25.0, 2.0);
        let m = derive_metrics(&record, EntityKind::Goalie).unwrap();
        assert_eq!(m.high_danger_save_pct, None);

        record.stats.high_danger_shots = Some(8.0);
        record.stats.high_danger_goals = Some(2.0);
        let m = derive_metrics(&record, EntityKind::Goalie).unwrap();
        assert_relative_eq!(m.high_danger_save_pct.unwrap(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn win_extracts_as_fraction() {
        let m = derive_metrics(&team_record(2.0, 1.0), EntityKind::Team).unwrap();
        assert_relative_eq!(Metric::WinPct.extract(&m).unwrap(), 1.0, epsilon = 1e-12);
        let m = derive_metrics(&team_record(1.0, 2.0), EntityKind::Team).unwrap();
        assert_relative_eq!(Metric::WinPct.extract(&m).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn raw_stats_never_mutated() {
        let record = team_record(4.0, 2.0);
        let before = RawStats {
            goals_for: Some(4.0),
            goals_against: Some(2.0),
            ..RawStats::default()
        };
        derive_metrics(&record, EntityKind::Team).unwrap();
        assert_eq!(record.stats, before);
    }
}
