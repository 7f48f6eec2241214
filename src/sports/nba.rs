//! NBA decision set: TOTAL and SPREAD. No moneyline market is evaluated.

use tracing::debug;

use super::calibration::NbaCalibration;
use super::projection::{project_nba, Projection};
use super::resolvers::{SpreadResolvers, TotalResolvers};
use super::{delta, min_present, on_key_number};
use crate::calculations::mean_present;
use crate::decision::{
    build_market_decision, driver_from_value, DecisionSet, DriverSignal, MarketDecisionInput,
    Penalty, SignalTransform,
};
use crate::domain::{Market, OddsSnapshot, RawStats, RiskFlag, Side};

const PROJECTION_VS_LINE: SignalTransform = SignalTransform::new(0.0, 6.0);
const PACE: SignalTransform = SignalTransform::new(99.5, 3.5);
const EFFICIENCY: SignalTransform = SignalTransform::new(114.0, 4.0);
const SHOOTING: SignalTransform = SignalTransform::new(0.545, 0.025);
// Tired legs push toward UNDER
const REST: SignalTransform = SignalTransform::new(1.0, 2.0);
const PROJECTION_MARGIN: SignalTransform = SignalTransform::new(0.0, 4.0);
const NET_RATING_DELTA: SignalTransform = SignalTransform::new(0.0, 10.0);
const INJURY_DELTA: SignalTransform = SignalTransform::new(0.0, 6.0);
const REST_DELTA: SignalTransform = SignalTransform::new(0.0, 2.0);
const SHOOTING_DELTA: SignalTransform = SignalTransform::new(0.0, 0.04);

#[derive(Debug, Clone, Copy, Default)]
struct NbaStats {
    home_pace: Option<f64>,
    away_pace: Option<f64>,
    home_off: Option<f64>,
    home_def: Option<f64>,
    away_off: Option<f64>,
    away_def: Option<f64>,
    home_efg: Option<f64>,
    away_efg: Option<f64>,
    /// Projected points lost to injuries
    home_injury: Option<f64>,
    away_injury: Option<f64>,
    home_rest: Option<f64>,
    away_rest: Option<f64>,
}

impl NbaStats {
    fn read(raw: &RawStats) -> Self {
        Self {
            home_pace: raw.number("home_pace"),
            away_pace: raw.number("away_pace"),
            home_off: raw.number("home_off_rtg"),
            home_def: raw.number("home_def_rtg"),
            away_off: raw.number("away_off_rtg"),
            away_def: raw.number("away_def_rtg"),
            home_efg: raw.number("home_efg_pct"),
            away_efg: raw.number("away_efg_pct"),
            home_injury: raw.number("home_injury_impact"),
            away_injury: raw.number("away_injury_impact"),
            home_rest: raw.number("home_rest_days"),
            away_rest: raw.number("away_rest_days"),
        }
    }

    fn net_rating(off: Option<f64>, def: Option<f64>) -> Option<f64> {
        Some(off? - def?)
    }
}

fn total_drivers(
    stats: &NbaStats,
    projection: Option<&Projection>,
    line: Option<f64>,
    cal: &NbaCalibration,
) -> Vec<DriverSignal> {
    let w = &cal.total_weights;
    let projected_total = projection.map(Projection::total);
    let ratings = [stats.home_off, stats.away_def, stats.away_off, stats.home_def];
    vec![
        driver_from_value(
            "projection_vs_line",
            w.projection_vs_line,
            delta(projected_total, line),
            PROJECTION_VS_LINE,
            &[projected_total, line],
            "projected total minus line",
        ),
        driver_from_value(
            "pace",
            w.pace,
            mean_present(&[stats.home_pace, stats.away_pace]),
            PACE,
            &[stats.home_pace, stats.away_pace],
            "mean possessions per 48",
        ),
        driver_from_value(
            "efficiency",
            w.efficiency,
            mean_present(&ratings),
            EFFICIENCY,
            &ratings,
            "matchup offensive vs defensive rating",
        ),
        driver_from_value(
            "shooting",
            w.shooting,
            mean_present(&[stats.home_efg, stats.away_efg]),
            SHOOTING,
            &[stats.home_efg, stats.away_efg],
            "mean eFG%",
        ),
        driver_from_value(
            "rest",
            w.rest,
            min_present(stats.home_rest, stats.away_rest),
            REST,
            &[stats.home_rest, stats.away_rest],
            "fewest rest days",
        ),
    ]
}

fn spread_drivers(
    stats: &NbaStats,
    projection: Option<&Projection>,
    spread_home: Option<f64>,
    cal: &NbaCalibration,
) -> Vec<DriverSignal> {
    let w = &cal.spread_weights;
    let margin = projection.map(Projection::margin);
    vec![
        driver_from_value(
            "projection_margin",
            w.projection_margin,
            margin.map(|m| m + spread_home.unwrap_or(0.0)),
            PROJECTION_MARGIN,
            &[margin, spread_home],
            "projected margin against the spread",
        ),
        driver_from_value(
            "net_rating_delta",
            w.net_rating_delta,
            delta(
                NbaStats::net_rating(stats.home_off, stats.home_def),
                NbaStats::net_rating(stats.away_off, stats.away_def),
            ),
            NET_RATING_DELTA,
            &[stats.home_off, stats.home_def, stats.away_off, stats.away_def],
            "home minus away net rating",
        ),
        driver_from_value(
            "injury_delta",
            w.injury_delta,
            delta(stats.away_injury, stats.home_injury),
            INJURY_DELTA,
            &[stats.home_injury, stats.away_injury],
            "away minus home injury impact",
        ),
        driver_from_value(
            "rest_delta",
            w.rest_delta,
            delta(stats.home_rest, stats.away_rest),
            REST_DELTA,
            &[stats.home_rest, stats.away_rest],
            "rest days delta",
        ),
        driver_from_value(
            "shooting_delta",
            w.shooting_delta,
            delta(stats.home_efg, stats.away_efg),
            SHOOTING_DELTA,
            &[stats.home_efg, stats.away_efg],
            "eFG% delta",
        ),
    ]
}

fn total_flags(
    projection: Option<&Projection>,
    line: Option<f64>,
    cal: &NbaCalibration,
) -> Vec<RiskFlag> {
    match (projection, line) {
        (Some(p), Some(l)) if (p.total() - l).abs() < cal.total_bad_number_band => {
            vec![RiskFlag::BadNumber]
        }
        (None, _) => vec![RiskFlag::NoProjection],
        _ => vec![],
    }
}

fn spread_flags(
    projection: Option<&Projection>,
    spread_home: Option<f64>,
    cal: &NbaCalibration,
) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    if spread_home.is_some_and(|s| on_key_number(s.abs(), &cal.key_margins)) {
        flags.push(RiskFlag::KeyNumber);
    }
    match (projection, spread_home) {
        (Some(p), Some(s)) if (p.margin() + s).abs() < cal.spread_bad_number_band => {
            flags.push(RiskFlag::BadNumber);
        }
        (None, _) => flags.push(RiskFlag::NoProjection),
        _ => {}
    }
    flags
}

/// Evaluate TOTAL and SPREAD for one NBA game
pub fn compute_nba_market_decisions(snapshot: &OddsSnapshot, cal: &NbaCalibration) -> DecisionSet {
    let stats = NbaStats::read(&snapshot.raw_data);
    let projection = project_nba(&snapshot.raw_data);
    let projection = projection.as_ref();

    if projection.is_none() {
        debug!(
            "NBA {}: no projection, line-based drivers ineligible",
            snapshot.game_id.as_deref().unwrap_or("-")
        );
    }

    let total = build_market_decision(
        MarketDecisionInput {
            market: Market::Total,
            default_side: Side::Over,
            drivers: total_drivers(&stats, projection, snapshot.total, cal),
            penalties: vec![],
            thresholds: cal.total_thresholds,
            risk_flags: total_flags(projection, snapshot.total, cal),
        },
        &TotalResolvers {
            projected_total: projection.map(Projection::total),
            line: snapshot.total,
            over_price: snapshot.total_over_price,
            under_price: snapshot.total_under_price,
            sigma: cal.total_sigma,
        },
    );

    let mut spread_penalties = Vec::new();
    if stats.home_injury.is_none() && stats.away_injury.is_none() {
        spread_penalties.push(Penalty::new(
            "injury_report_missing",
            cal.injury_report_missing_penalty,
        ));
    }

    let spread = build_market_decision(
        MarketDecisionInput {
            market: Market::Spread,
            default_side: Side::Home,
            drivers: spread_drivers(&stats, projection, snapshot.spread_home, cal),
            penalties: spread_penalties,
            thresholds: cal.spread_thresholds,
            risk_flags: spread_flags(projection, snapshot.spread_home, cal),
        },
        &SpreadResolvers {
            projected_margin: projection.map(Projection::margin),
            spread_home: snapshot.spread_home,
            home_price: snapshot.spread_home_price,
            away_price: snapshot.spread_away_price,
            sigma: cal.margin_sigma,
        },
    );

    [total, spread].into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DataStatus;
    use crate::domain::DecisionStatus;
    use serde_json::json;

    fn snapshot(raw: serde_json::Value) -> OddsSnapshot {
        OddsSnapshot {
            home_team: Some("Boston Celtics".to_string()),
            away_team: Some("Miami Heat".to_string()),
            total: Some(221.5),
            spread_home: Some(-7.0),
            spread_home_price: Some(-110.0),
            spread_away_price: Some(-110.0),
            h2h_home: Some(-300.0),
            h2h_away: Some(240.0),
            raw_data: RawStats::from_value(raw),
            ..Default::default()
        }
    }

    fn slow_raw() -> serde_json::Value {
        json!({
            "home_pace": 96.0,
            "away_pace": 95.0,
            "home_off_rtg": 110.0,
            "home_def_rtg": 108.0,
            "away_off_rtg": 109.0,
            "away_def_rtg": 111.0,
            "home_efg_pct": 0.52,
            "away_efg_pct": 0.515,
            "home_injury_impact": 0.0,
            "away_injury_impact": 3.0,
            "home_rest_days": 0.0,
            "away_rest_days": 1.0
        })
    }

    #[test]
    fn test_no_moneyline_market() {
        let set = compute_nba_market_decisions(&snapshot(slow_raw()), &NbaCalibration::default());
        assert_eq!(set.len(), 2);
        assert!(set.get(Market::Ml).is_none());
    }

    #[test]
    fn test_slow_low_efficiency_game_goes_under() {
        let set = compute_nba_market_decisions(&snapshot(slow_raw()), &NbaCalibration::default());
        let total = set.get(Market::Total).unwrap();
        assert_eq!(total.best_candidate.side, Side::Under);
        assert_eq!(total.status, DecisionStatus::Fire);
        assert_eq!(total.conflict, 0.0);
        assert_eq!(total.best_candidate.line, Some(221.5));
        assert!(total.edge.unwrap() > 0.0);
    }

    #[test]
    fn test_spread_key_number_and_projection() {
        let set = compute_nba_market_decisions(&snapshot(slow_raw()), &NbaCalibration::default());
        let spread = set.get(Market::Spread).unwrap();
        assert!(spread.has_flag(RiskFlag::KeyNumber));
        assert!(!spread.has_flag(RiskFlag::NoProjection));
        let projection_margin = spread
            .drivers
            .iter()
            .find(|d| d.key() == "projection_margin")
            .unwrap();
        assert!(projection_margin.is_eligible());
        assert_eq!(projection_margin.status(), DataStatus::Ok);
    }

    #[test]
    fn test_injury_report_missing_penalty() {
        let mut raw = slow_raw();
        raw.as_object_mut().unwrap().remove("home_injury_impact");
        raw.as_object_mut().unwrap().remove("away_injury_impact");
        let without_injuries =
            compute_nba_market_decisions(&snapshot(raw), &NbaCalibration::default());
        let spread = without_injuries.get(Market::Spread).unwrap();
        assert!((spread.score - (spread.net - 0.03)).abs() < 1e-9);

        let total = without_injuries.get(Market::Total).unwrap();
        assert_eq!(total.score, total.net);
    }

    #[test]
    fn test_invalid_raw_data_passes() {
        let mut snap = snapshot(json!({}));
        snap.raw_data = RawStats::parse("{invalid json");
        let set = compute_nba_market_decisions(&snap, &NbaCalibration::default());
        for decision in set.iter() {
            assert_eq!(decision.status, DecisionStatus::Pass);
            assert!(decision.has_flag(RiskFlag::NoProjection));
        }
    }
}
