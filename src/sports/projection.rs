//! Score projections from raw team stats.
//!
//! These are deliberately simple models; the decision sets only consume the
//! projected scores and a completeness-based confidence.

use serde::Serialize;

use crate::calculations::{mean_present, round_to, round3};
use crate::domain::RawStats;

/// NHL home-ice advantage in goals
pub const NHL_HOME_ICE_GOALS: f64 = 0.15;

/// NBA home-court advantage in points
pub const NBA_HOME_COURT_POINTS: f64 = 2.5;

/// Confidence ceiling for the NBA points-average fallback
const NBA_FALLBACK_CONFIDENCE: f64 = 0.6;

/// Projected final score with a confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub home_projected: f64,
    pub away_projected: f64,
    pub confidence: f64,
}

impl Projection {
    pub fn total(&self) -> f64 {
        self.home_projected + self.away_projected
    }

    /// Home minus away
    pub fn margin(&self) -> f64 {
        self.home_projected - self.away_projected
    }
}

fn present_share(values: &[Option<f64>]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| v.is_some()).count() as f64 / values.len() as f64
}

/// Goals-for/against blend with a home-ice bump
///
/// Needs at least one attack or defence figure per team. Goalie save
/// percentages only feed the confidence.
pub fn project_nhl(raw: &RawStats) -> Option<Projection> {
    let home_gf = raw.number("home_goals_for_pg");
    let home_ga = raw.number("home_goals_against_pg");
    let away_gf = raw.number("away_goals_for_pg");
    let away_ga = raw.number("away_goals_against_pg");

    let home_base = mean_present(&[home_gf, away_ga])?;
    let away_base = mean_present(&[away_gf, home_ga])?;

    let confidence = present_share(&[
        home_gf,
        home_ga,
        away_gf,
        away_ga,
        raw.number("goalie_home_save_pct"),
        raw.number("goalie_away_save_pct"),
    ]);

    Some(Projection {
        home_projected: round_to(home_base + NHL_HOME_ICE_GOALS / 2.0, 2),
        away_projected: round_to(away_base - NHL_HOME_ICE_GOALS / 2.0, 2),
        confidence: round3(confidence),
    })
}

/// Possessions times matchup efficiency, falling back to points averages
pub fn project_nba(raw: &RawStats) -> Option<Projection> {
    project_nba_ratings(raw).or_else(|| project_nba_averages(raw))
}

fn project_nba_ratings(raw: &RawStats) -> Option<Projection> {
    let home_off = raw.number("home_off_rtg")?;
    let home_def = raw.number("home_def_rtg")?;
    let away_off = raw.number("away_off_rtg")?;
    let away_def = raw.number("away_def_rtg")?;
    let home_pace = raw.number("home_pace");
    let away_pace = raw.number("away_pace");
    let pace = mean_present(&[home_pace, away_pace])?;

    let home_pts = pace * (home_off + away_def) / 200.0;
    let away_pts = pace * (away_off + home_def) / 200.0;

    let confidence = present_share(&[
        home_pace,
        away_pace,
        raw.number("home_efg_pct"),
        raw.number("away_efg_pct"),
    ]) * 0.5
        + 0.5;

    Some(Projection {
        home_projected: round_to(home_pts + NBA_HOME_COURT_POINTS / 2.0, 1),
        away_projected: round_to(away_pts - NBA_HOME_COURT_POINTS / 2.0, 1),
        confidence: round3(confidence),
    })
}

fn project_nba_averages(raw: &RawStats) -> Option<Projection> {
    let home_pts = raw.number("home_avg_points");
    let home_allowed = raw.number("home_avg_allowed");
    let away_pts = raw.number("away_avg_points");
    let away_allowed = raw.number("away_avg_allowed");

    let home_base = mean_present(&[home_pts, away_allowed])?;
    let away_base = mean_present(&[away_pts, home_allowed])?;
    let confidence = present_share(&[home_pts, home_allowed, away_pts, away_allowed])
        * NBA_FALLBACK_CONFIDENCE;

    Some(Projection {
        home_projected: round_to(home_base + NBA_HOME_COURT_POINTS / 2.0, 1),
        away_projected: round_to(away_base - NBA_HOME_COURT_POINTS / 2.0, 1),
        confidence: round3(confidence),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawStats {
        RawStats::from_value(value)
    }

    #[test]
    fn test_project_nhl_full_inputs() {
        let p = project_nhl(&raw(json!({
            "home_goals_for_pg": 3.41,
            "home_goals_against_pg": 2.6,
            "away_goals_for_pg": 2.91,
            "away_goals_against_pg": 3.2,
            "goalie_home_save_pct": 0.915,
            "goalie_away_save_pct": 0.901
        })))
        .unwrap();

        // home (3.41 + 3.2) / 2 + 0.075, away (2.91 + 2.6) / 2 - 0.075
        assert_eq!(p.home_projected, 3.38);
        assert_eq!(p.away_projected, 2.68);
        assert_eq!(p.confidence, 1.0);
        assert!(p.margin() > 0.0);
    }

    #[test]
    fn test_project_nhl_partial_lowers_confidence() {
        let p = project_nhl(&raw(json!({
            "home_goals_for_pg": 3.0,
            "away_goals_for_pg": 3.0
        })))
        .unwrap();
        assert!(p.confidence < 0.5);
        assert!((p.margin() - NHL_HOME_ICE_GOALS).abs() < 0.011);
    }

    #[test]
    fn test_project_nhl_missing_core() {
        assert!(project_nhl(&RawStats::default()).is_none());
        assert!(project_nhl(&raw(json!({ "home_goals_for_pg": 3.0 }))).is_none());
    }

    #[test]
    fn test_project_nba_ratings() {
        let p = project_nba(&raw(json!({
            "home_pace": 100.0,
            "away_pace": 100.0,
            "home_off_rtg": 116.0,
            "home_def_rtg": 112.0,
            "away_off_rtg": 114.0,
            "away_def_rtg": 114.0
        })))
        .unwrap();

        // home 100 * 230 / 200 + 1.25, away 100 * 226 / 200 - 1.25
        assert_eq!(p.home_projected, 116.3);
        assert_eq!(p.away_projected, 111.8);
        assert_eq!(p.confidence, 0.75);
    }

    #[test]
    fn test_project_nba_falls_back_to_averages() {
        let p = project_nba(&raw(json!({
            "home_avg_points": 112.0,
            "home_avg_allowed": 110.0,
            "away_avg_points": 108.0,
            "away_avg_allowed": 114.0
        })))
        .unwrap();

        assert_eq!(p.home_projected, 114.3);
        assert_eq!(p.away_projected, 107.8);
        assert_eq!(p.confidence, NBA_FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_project_nba_none_without_inputs() {
        assert!(project_nba(&RawStats::default()).is_none());
    }
}
