//! Per-sport calibration: driver weights, status thresholds, model sigmas and
//! the bands behind the risk flags.
//!
//! Every struct deserializes with defaults so a config file only needs the
//! values it overrides.

use serde::{Deserialize, Serialize};

use crate::decision::Thresholds;

/// Tolerance for the weight-sum check
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

fn check_weights(scope: &str, weights: &[(&str, f64)], errors: &mut Vec<String>) {
    for (name, weight) in weights {
        if !(0.0..=1.0).contains(weight) {
            errors.push(format!("{scope}.{name} weight must be in [0, 1], got {weight}"));
        }
    }
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if sum > 1.0 + WEIGHT_SUM_EPSILON {
        errors.push(format!("{scope} weights sum to {sum:.3}, must not exceed 1"));
    }
}

fn check_thresholds(scope: &str, t: &Thresholds, errors: &mut Vec<String>) {
    if t.t_watch > t.t_fire {
        errors.push(format!(
            "{scope}: t_watch ({}) must not exceed t_fire ({})",
            t.t_watch, t.t_fire
        ));
    }
    for (name, floor) in [
        ("min_coverage_fire", t.min_coverage_fire),
        ("min_coverage_watch", t.min_coverage_watch),
    ] {
        if !(0.0..=1.0).contains(&floor) {
            errors.push(format!("{scope}.{name} must be in [0, 1], got {floor}"));
        }
    }
    if t.t_dir < 0.0 || t.conflict_cap < 0.0 {
        errors.push(format!("{scope}: t_dir and conflict_cap must be non-negative"));
    }
}

fn check_positive(scope: &str, name: &str, value: f64, errors: &mut Vec<String>) {
    if !(value > 0.0 && value.is_finite()) {
        errors.push(format!("{scope}.{name} must be positive, got {value}"));
    }
}

fn check_non_negative(scope: &str, name: &str, value: f64, errors: &mut Vec<String>) {
    if !(value >= 0.0 && value.is_finite()) {
        errors.push(format!("{scope}.{name} must be non-negative, got {value}"));
    }
}

// ---------------------------------------------------------------------------
// NHL
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NhlTotalWeights {
    pub goalie_quality: f64,
    pub projection_vs_line: f64,
    pub pace: f64,
    pub special_teams: f64,
    pub rest: f64,
}

impl Default for NhlTotalWeights {
    fn default() -> Self {
        Self {
            goalie_quality: 0.30,
            projection_vs_line: 0.25,
            pace: 0.15,
            special_teams: 0.15,
            rest: 0.10,
        }
    }
}

impl NhlTotalWeights {
    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("goalie_quality", self.goalie_quality),
            ("projection_vs_line", self.projection_vs_line),
            ("pace", self.pace),
            ("special_teams", self.special_teams),
            ("rest", self.rest),
        ]
    }
}

/// Side-market weights, shared by SPREAD and ML
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NhlSideWeights {
    pub goalie_delta: f64,
    pub shot_quality: f64,
    pub projection_margin: f64,
    pub special_teams_delta: f64,
    pub rest_delta: f64,
}

impl Default for NhlSideWeights {
    fn default() -> Self {
        Self {
            goalie_delta: 0.30,
            shot_quality: 0.25,
            projection_margin: 0.20,
            special_teams_delta: 0.15,
            rest_delta: 0.10,
        }
    }
}

impl NhlSideWeights {
    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("goalie_delta", self.goalie_delta),
            ("shot_quality", self.shot_quality),
            ("projection_margin", self.projection_margin),
            ("special_teams_delta", self.special_teams_delta),
            ("rest_delta", self.rest_delta),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NhlCalibration {
    pub version: String,
    pub total_weights: NhlTotalWeights,
    pub side_weights: NhlSideWeights,
    pub total_thresholds: Thresholds,
    pub spread_thresholds: Thresholds,
    pub ml_thresholds: Thresholds,
    /// Goals; spread of the game total around the projection
    pub total_sigma: f64,
    /// Goals; spread of the final margin around the projection
    pub margin_sigma: f64,
    /// Totals the market clusters on
    pub key_totals: Vec<f64>,
    pub total_bad_number_band: f64,
    pub spread_bad_number_band: f64,
    /// Distance from 0.5 inside which the moneyline is a coinflip
    pub coinflip_band: f64,
    pub goalie_unconfirmed_penalty: f64,
    pub low_confidence_penalty: f64,
    /// Projection confidence below this draws `low_confidence_penalty`
    pub min_projection_confidence: f64,
}

impl Default for NhlCalibration {
    fn default() -> Self {
        Self {
            version: "nhl-2025.1".to_string(),
            total_weights: NhlTotalWeights::default(),
            side_weights: NhlSideWeights::default(),
            total_thresholds: Thresholds::default(),
            spread_thresholds: Thresholds {
                t_dir: 0.12,
                t_fire: 0.40,
                t_watch: 0.22,
                conflict_cap: 0.20,
                min_coverage_fire: 0.70,
                min_coverage_watch: 0.50,
            },
            ml_thresholds: Thresholds {
                t_dir: 0.10,
                t_fire: 0.35,
                t_watch: 0.20,
                conflict_cap: 0.25,
                min_coverage_fire: 0.65,
                min_coverage_watch: 0.45,
            },
            total_sigma: 2.2,
            margin_sigma: 2.4,
            key_totals: vec![5.5, 6.0],
            total_bad_number_band: 0.25,
            spread_bad_number_band: 0.25,
            coinflip_band: 0.05,
            goalie_unconfirmed_penalty: 0.05,
            low_confidence_penalty: 0.03,
            min_projection_confidence: 0.5,
        }
    }
}

impl NhlCalibration {
    /// Append every violation to `errors`
    pub fn collect_errors(&self, errors: &mut Vec<String>) {
        check_weights("nhl.total_weights", &self.total_weights.entries(), errors);
        check_weights("nhl.side_weights", &self.side_weights.entries(), errors);
        check_thresholds("nhl.total_thresholds", &self.total_thresholds, errors);
        check_thresholds("nhl.spread_thresholds", &self.spread_thresholds, errors);
        check_thresholds("nhl.ml_thresholds", &self.ml_thresholds, errors);
        check_positive("nhl", "total_sigma", self.total_sigma, errors);
        check_positive("nhl", "margin_sigma", self.margin_sigma, errors);
        check_non_negative("nhl", "total_bad_number_band", self.total_bad_number_band, errors);
        check_non_negative("nhl", "spread_bad_number_band", self.spread_bad_number_band, errors);
        check_non_negative("nhl", "coinflip_band", self.coinflip_band, errors);
        check_non_negative("nhl", "goalie_unconfirmed_penalty", self.goalie_unconfirmed_penalty, errors);
        check_non_negative("nhl", "low_confidence_penalty", self.low_confidence_penalty, errors);
    }
}

// ---------------------------------------------------------------------------
// NBA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NbaTotalWeights {
    pub projection_vs_line: f64,
    pub pace: f64,
    pub efficiency: f64,
    pub shooting: f64,
    pub rest: f64,
}

impl Default for NbaTotalWeights {
    fn default() -> Self {
        Self {
            projection_vs_line: 0.30,
            pace: 0.25,
            efficiency: 0.20,
            shooting: 0.15,
            rest: 0.10,
        }
    }
}

impl NbaTotalWeights {
    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("projection_vs_line", self.projection_vs_line),
            ("pace", self.pace),
            ("efficiency", self.efficiency),
            ("shooting", self.shooting),
            ("rest", self.rest),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NbaSpreadWeights {
    pub projection_margin: f64,
    pub net_rating_delta: f64,
    pub injury_delta: f64,
    pub rest_delta: f64,
    pub shooting_delta: f64,
}

impl Default for NbaSpreadWeights {
    fn default() -> Self {
        Self {
            projection_margin: 0.30,
            net_rating_delta: 0.30,
            injury_delta: 0.15,
            rest_delta: 0.15,
            shooting_delta: 0.10,
        }
    }
}

impl NbaSpreadWeights {
    fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("projection_margin", self.projection_margin),
            ("net_rating_delta", self.net_rating_delta),
            ("injury_delta", self.injury_delta),
            ("rest_delta", self.rest_delta),
            ("shooting_delta", self.shooting_delta),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NbaCalibration {
    pub version: String,
    pub total_weights: NbaTotalWeights,
    pub spread_weights: NbaSpreadWeights,
    pub total_thresholds: Thresholds,
    pub spread_thresholds: Thresholds,
    /// Points
    pub total_sigma: f64,
    /// Points
    pub margin_sigma: f64,
    /// Final margins the spread market clusters on
    pub key_margins: Vec<f64>,
    pub total_bad_number_band: f64,
    pub spread_bad_number_band: f64,
    pub injury_report_missing_penalty: f64,
}

impl Default for NbaCalibration {
    fn default() -> Self {
        Self {
            version: "nba-2025.1".to_string(),
            total_weights: NbaTotalWeights::default(),
            spread_weights: NbaSpreadWeights::default(),
            total_thresholds: Thresholds::default(),
            spread_thresholds: Thresholds {
                t_dir: 0.12,
                t_fire: 0.40,
                t_watch: 0.22,
                conflict_cap: 0.20,
                min_coverage_fire: 0.70,
                min_coverage_watch: 0.50,
            },
            total_sigma: 18.0,
            margin_sigma: 12.0,
            key_margins: vec![3.0, 5.0, 7.0],
            total_bad_number_band: 1.5,
            spread_bad_number_band: 1.0,
            injury_report_missing_penalty: 0.03,
        }
    }
}

impl NbaCalibration {
    pub fn collect_errors(&self, errors: &mut Vec<String>) {
        check_weights("nba.total_weights", &self.total_weights.entries(), errors);
        check_weights("nba.spread_weights", &self.spread_weights.entries(), errors);
        check_thresholds("nba.total_thresholds", &self.total_thresholds, errors);
        check_thresholds("nba.spread_thresholds", &self.spread_thresholds, errors);
        check_positive("nba", "total_sigma", self.total_sigma, errors);
        check_positive("nba", "margin_sigma", self.margin_sigma, errors);
        check_non_negative("nba", "total_bad_number_band", self.total_bad_number_band, errors);
        check_non_negative("nba", "spread_bad_number_band", self.spread_bad_number_band, errors);
        check_non_negative(
            "nba",
            "injury_report_missing_penalty",
            self.injury_report_missing_penalty,
            errors,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let mut errors = Vec::new();
        NhlCalibration::default().collect_errors(&mut errors);
        NbaCalibration::default().collect_errors(&mut errors);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_weight_sum_over_one_rejected() {
        let mut cal = NhlCalibration::default();
        cal.total_weights.pace = 0.30;
        let mut errors = Vec::new();
        cal.collect_errors(&mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("nhl.total_weights"));
    }

    #[test]
    fn test_out_of_range_weight_and_sigma() {
        let mut cal = NbaCalibration::default();
        cal.spread_weights.rest_delta = -0.1;
        cal.margin_sigma = 0.0;
        let mut errors = Vec::new();
        cal.collect_errors(&mut errors);
        assert!(errors.iter().any(|e| e.contains("rest_delta")));
        assert!(errors.iter().any(|e| e.contains("margin_sigma")));
    }

    #[test]
    fn test_thresholds_order_checked() {
        let mut cal = NhlCalibration::default();
        cal.ml_thresholds.t_watch = 0.5;
        let mut errors = Vec::new();
        cal.collect_errors(&mut errors);
        assert!(errors.iter().any(|e| e.contains("nhl.ml_thresholds")));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let cal: NhlCalibration = serde_json::from_str(
            r#"{ "version": "test", "total_weights": { "pace": 0.05 } }"#,
        )
        .unwrap();
        assert_eq!(cal.version, "test");
        assert_eq!(cal.total_weights.pace, 0.05);
        assert_eq!(cal.total_weights.goalie_quality, 0.30);
        assert_eq!(cal.margin_sigma, 2.4);
    }
}
